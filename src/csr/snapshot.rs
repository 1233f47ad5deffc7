//! CsrSnapshot: an immutable, point-in-time Compressed Sparse Row projection
//! of a [`crate::graph::Graph`]. Four parallel arrays plus a bidirectional
//! id<->index map. `weights` aliases a `Tensor`-compatible `Storage<f32>` so
//! the same buffer a differentiable computation mutates is the buffer the
//! snapshot reads — the storage-aliasing contract the tensor engine and the
//! graph store share by design.

use crate::shape::{Shape, Strides};
use crate::storage::Storage;
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct CsrSnapshot {
    row_ptr: Vec<i32>,
    col_idx: Vec<i32>,
    weights: Rc<RefCell<Storage<f32>>>,
    last_modified: Vec<i64>,
    index_to_id: Vec<String>,
    id_to_index: HashMap<String, usize>,
}

impl CsrSnapshot {
    pub fn new(
        row_ptr: Vec<i32>,
        col_idx: Vec<i32>,
        weights: Vec<f32>,
        last_modified: Vec<i64>,
        index_to_id: Vec<String>,
    ) -> Self {
        debug_assert_eq!(col_idx.len(), weights.len());
        debug_assert_eq!(col_idx.len(), last_modified.len());
        debug_assert_eq!(row_ptr.len(), index_to_id.len() + 1);
        let id_to_index = index_to_id
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        CsrSnapshot {
            row_ptr,
            col_idx,
            weights: Rc::new(RefCell::new(Storage::from_data(weights))),
            last_modified,
            index_to_id,
            id_to_index,
        }
    }

    pub fn node_count(&self) -> usize {
        self.index_to_id.len()
    }

    pub fn edge_count(&self) -> usize {
        self.col_idx.len()
    }

    pub fn row_ptr(&self) -> &[i32] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[i32] {
        &self.col_idx
    }

    pub fn last_modified(&self) -> &[i64] {
        &self.last_modified
    }

    pub fn index_to_id(&self) -> &[String] {
        &self.index_to_id
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    /// Read a single weight. Borrows the aliased storage briefly.
    pub fn weight_at(&self, edge_index: usize) -> f32 {
        self.weights.borrow().data()[edge_index]
    }

    pub fn set_weight_at(&self, edge_index: usize, value: f32) {
        self.weights.borrow_mut().data_mut()[edge_index] = value;
    }

    /// Materialize a plain, `Send`-safe snapshot of the weights buffer. Used
    /// by the parallel algorithms (which need `Sync` data to fan out over)
    /// and by persistence.
    pub fn weights_vec(&self) -> Vec<f32> {
        self.weights.borrow().data().to_vec()
    }

    /// A rank-2 `[1, edge_count]` tensor view aliasing the weights buffer
    /// directly: writes through the tensor are visible via `weight_at` and
    /// vice versa. The tensor is a leaf (no autograd parents) — only
    /// defined here, on the snapshot, not on the live graph, per the design
    /// decision to keep the live graph's layout free of aliasing contracts.
    pub fn weights_as_tensor(&self) -> Tensor<f32> {
        let n = self.edge_count();
        Tensor::from_view(
            Rc::clone(&self.weights),
            Shape::new(1, n),
            Strides::row_major(n),
            0,
            Vec::new(),
        )
    }
}
