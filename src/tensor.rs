//! Tensor: a strided view over a shared Storage, plus an autograd record
//! (input tensors + a deferred backward closure). No backend trait, no device
//! abstraction — this engine targets a single CPU path, so the ops below
//! compute directly instead of dispatching through a trait object.

use crate::decay::decay_multiplier;
use crate::scalar::Scalar;
use crate::shape::{Shape, ShapeError, Strides};
use crate::storage::Storage;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("broadcast incompatible: {0}")]
    BroadcastIncompatible(String),
}

impl From<ShapeError> for TensorError {
    fn from(e: ShapeError) -> Self {
        TensorError::BroadcastIncompatible(e.0)
    }
}

pub type TensorResult<T> = Result<T, TensorError>;

type BackwardFn = Rc<dyn Fn()>;

struct TensorData<T: Scalar> {
    storage: Rc<RefCell<Storage<T>>>,
    shape: Shape,
    strides: Strides,
    offset: usize,
    inputs: Vec<Tensor<T>>,
    backward_fn: RefCell<Option<BackwardFn>>,
}

/// A 2-D strided view over shared storage, carrying its own autograd record.
/// Cloning a Tensor is cheap (Rc clone of the view, not of the underlying data).
pub struct Tensor<T: Scalar = f32>(Rc<TensorData<T>>);

impl<T: Scalar> Clone for Tensor<T> {
    fn clone(&self) -> Self {
        Tensor(Rc::clone(&self.0))
    }
}

impl<T: Scalar> Tensor<T> {
    /// Owning constructor: leaf tensor over a fresh row-major Storage.
    /// Empty input list, no-op backward closure (per the autograd data model).
    pub fn leaf(data: Vec<T>, shape: Shape) -> TensorResult<Tensor<T>> {
        if data.len() != shape.numel() {
            return Err(TensorError::ShapeMismatch(format!(
                "data len {} != shape numel {}",
                data.len(),
                shape.numel()
            )));
        }
        let strides = Strides::row_major(shape.cols);
        Ok(Tensor(Rc::new(TensorData {
            storage: Rc::new(RefCell::new(Storage::from_data(data))),
            shape,
            strides,
            offset: 0,
            inputs: Vec::new(),
            backward_fn: RefCell::new(None),
        })))
    }

    /// Leaf tensor of zeros.
    pub fn zeros(shape: Shape) -> Tensor<T> {
        let strides = Strides::row_major(shape.cols);
        Tensor(Rc::new(TensorData {
            storage: Rc::new(RefCell::new(Storage::zeros(shape.numel()))),
            shape,
            strides,
            offset: 0,
            inputs: Vec::new(),
            backward_fn: RefCell::new(None),
        }))
    }

    /// Crate-internal: allocate a fresh row-major Storage for an op's output
    /// and attach `inputs` up front; the op then calls `set_backward` once its
    /// closure (which captures this same tensor) is built.
    pub(crate) fn op_output(data: Vec<T>, shape: Shape, inputs: Vec<Tensor<T>>) -> TensorResult<Tensor<T>> {
        if data.len() != shape.numel() {
            return Err(TensorError::ShapeMismatch(format!(
                "op output data len {} != shape numel {}",
                data.len(),
                shape.numel()
            )));
        }
        let strides = Strides::row_major(shape.cols);
        Ok(Tensor(Rc::new(TensorData {
            storage: Rc::new(RefCell::new(Storage::from_data(data))),
            shape,
            strides,
            offset: 0,
            inputs,
            backward_fn: RefCell::new(None),
        })))
    }

    /// Crate-internal: a view that shares `storage` under an arbitrary
    /// shape/strides/offset, optionally an op output (non-empty `inputs`,
    /// with the backward closure attached afterwards via `set_backward`).
    pub(crate) fn from_view(
        storage: Rc<RefCell<Storage<T>>>,
        shape: Shape,
        strides: Strides,
        offset: usize,
        inputs: Vec<Tensor<T>>,
    ) -> Tensor<T> {
        Tensor(Rc::new(TensorData {
            storage,
            shape,
            strides,
            offset,
            inputs,
            backward_fn: RefCell::new(None),
        }))
    }

    pub(crate) fn set_backward(&self, f: BackwardFn) {
        *self.0.backward_fn.borrow_mut() = Some(f);
    }

    pub(crate) fn inputs(&self) -> &[Tensor<T>] {
        &self.0.inputs
    }

    pub(crate) fn run_backward(&self) {
        if let Some(f) = self.0.backward_fn.borrow().as_ref() {
            f();
        }
    }

    /// Identity key for the autograd DFS visited-set: two clones of the same
    /// Tensor share this key, distinct tensors never collide.
    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn shape(&self) -> Shape {
        self.0.shape
    }

    pub fn strides(&self) -> Strides {
        self.0.strides
    }

    pub fn rows(&self) -> usize {
        self.0.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.0.shape.cols
    }

    pub fn numel(&self) -> usize {
        self.0.shape.numel()
    }

    fn addr(&self, i: usize, j: usize) -> usize {
        self.0.offset + i * self.0.strides.row + j * self.0.strides.col
    }

    pub fn get(&self, i: usize, j: usize) -> T {
        self.0.storage.borrow().data()[self.addr(i, j)]
    }

    pub fn set(&self, i: usize, j: usize, value: T) {
        let a = self.addr(i, j);
        self.0.storage.borrow_mut().data_mut()[a] = value;
    }

    pub fn grad_get(&self, i: usize, j: usize) -> T {
        self.0.storage.borrow().grad()[self.addr(i, j)]
    }

    /// Row-major materialization of this view's values (handles aliasing/strides).
    pub fn to_vec(&self) -> Vec<T> {
        let (r, c) = (self.rows(), self.cols());
        let mut out = Vec::with_capacity(r * c);
        let storage = self.0.storage.borrow();
        let data = storage.data();
        for i in 0..r {
            for j in 0..c {
                out.push(data[self.addr(i, j)]);
            }
        }
        out
    }

    /// Row-major materialization of this view's gradient.
    pub fn grad_to_vec(&self) -> Vec<T> {
        let (r, c) = (self.rows(), self.cols());
        let mut out = Vec::with_capacity(r * c);
        let storage = self.0.storage.borrow();
        let grad = storage.grad();
        for i in 0..r {
            for j in 0..c {
                out.push(grad[self.addr(i, j)]);
            }
        }
        out
    }

    /// Additively accumulate `deltas` (row-major, same shape as self) into
    /// this view's gradient region. Never overwrites; the engine only adds.
    pub(crate) fn accumulate_grad(&self, deltas: &[T]) {
        let (r, c) = (self.rows(), self.cols());
        debug_assert_eq!(deltas.len(), r * c);
        let mut storage = self.0.storage.borrow_mut();
        let grad = storage.grad_mut();
        let mut k = 0;
        for i in 0..r {
            for j in 0..c {
                let a = self.0.offset + i * self.0.strides.row + j * self.0.strides.col;
                grad[a] = grad[a] + deltas[k];
                k += 1;
            }
        }
    }

    /// Zero this view's visible gradient region. Callers must call this
    /// explicitly between training iterations; the engine never does.
    pub fn zero_grad(&self) {
        let (r, c) = (self.rows(), self.cols());
        let mut storage = self.0.storage.borrow_mut();
        let grad = storage.grad_mut();
        for i in 0..r {
            for j in 0..c {
                let a = self.0.offset + i * self.0.strides.row + j * self.0.strides.col;
                grad[a] = T::zero();
            }
        }
    }

    /// Zero-copy transpose: swaps shape and strides, shares storage. This is
    /// a structural view, not a differentiable op (empty inputs, no backward) —
    /// it is used internally to build matmul's backward closures, where the
    /// real autograd edges run through the matmul op itself.
    pub fn transpose(&self) -> Tensor<T> {
        Tensor::from_view(
            Rc::clone(&self.0.storage),
            Shape::new(self.0.shape.cols, self.0.shape.rows),
            self.0.strides.transposed(),
            self.0.offset,
            Vec::new(),
        )
    }

    /// In-place, non-autograd exponential decay: `x <- x * exp(-lambda * max(0, delta_t))`,
    /// clamped to zero when the multiplier underflows `Scalar::decay_epsilon()`.
    pub fn apply_decay(&self, lambda: T, delta_t: T) {
        let mult = decay_multiplier(lambda, delta_t);
        let (r, c) = (self.rows(), self.cols());
        let mut storage = self.0.storage.borrow_mut();
        let data = storage.data_mut();
        for i in 0..r {
            for j in 0..c {
                let a = self.0.offset + i * self.0.strides.row + j * self.0.strides.col;
                data[a] = data[a] * mult;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_rejects_mismatched_data_len() {
        let err = Tensor::<f32>::leaf(vec![1.0, 2.0], Shape::new(2, 2)).unwrap_err();
        assert!(matches!(err, TensorError::ShapeMismatch(_)));
    }

    #[test]
    fn transpose_aliases_storage() {
        let t = Tensor::<f32>::leaf(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Shape::new(2, 3)).unwrap();
        let tt = t.transpose();
        assert_eq!(tt.shape(), Shape::new(3, 2));
        assert_eq!(tt.get(0, 1), t.get(1, 0));
        t.set(1, 0, 99.0);
        assert_eq!(tt.get(0, 1), 99.0);
    }

    #[test]
    fn apply_decay_clamps_below_epsilon() {
        let t = Tensor::<f32>::leaf(vec![10.0], Shape::new(1, 1)).unwrap();
        t.apply_decay(10.0, 100.0);
        assert_eq!(t.get(0, 0), 0.0);
    }

    #[test]
    fn apply_decay_zero_age_is_identity() {
        let t = Tensor::<f32>::leaf(vec![10.0], Shape::new(1, 1)).unwrap();
        t.apply_decay(0.005, 0.0);
        assert_eq!(t.get(0, 0), 10.0);
    }
}
