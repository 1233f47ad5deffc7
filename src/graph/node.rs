//! Node: a unique string id, an opaque data payload, and its neighbor edge
//! map. The edge map is protected by the node's own monitor (`NodeInner`
//! lives behind a `parking_lot::Mutex`); `NodeRef` is the stable handle
//! `get_or_add_node` hands back, cheap to clone (an `Arc` bump).

use crate::graph::edge::Edge;
use crate::scalar::Scalar;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct NodeInner<T: Scalar, D> {
    pub(crate) id: String,
    pub(crate) data: D,
    pub(crate) edges: HashMap<String, Edge<T>>,
}

/// A stable reference to a node. Concurrent `get_or_add_node` calls for the
/// same id return `NodeRef`s that share the same underlying monitor.
#[derive(Clone)]
pub struct NodeRef<T: Scalar, D>(pub(crate) Arc<Mutex<NodeInner<T, D>>>);

impl<T: Scalar, D: Clone> NodeRef<T, D> {
    pub fn id(&self) -> String {
        self.0.lock().id.clone()
    }

    pub fn data(&self) -> D {
        self.0.lock().data.clone()
    }

    pub fn set_data(&self, data: D) {
        self.0.lock().data = data;
    }

    /// Number of distinct neighbors (out-degree in the undirected sense).
    pub fn degree(&self) -> usize {
        self.0.lock().edges.len()
    }

    /// Snapshot of `(neighbor_id, weight, last_modified)` for every edge,
    /// sorted by neighbor id for determinism.
    pub fn edges_snapshot(&self) -> Vec<(String, T, i64)> {
        let inner = self.0.lock();
        let mut out: Vec<(String, T, i64)> = inner
            .edges
            .iter()
            .map(|(id, e)| (id.clone(), e.weight, e.last_modified))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
