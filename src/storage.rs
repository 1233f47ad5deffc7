//! Storage: the flat buffer pair (data, grad) a Tensor addresses via shape/strides.
//! Two or more Tensor views may share one Storage (transpose, weight aliasing);
//! that sharing is the whole point of this layer.

use crate::scalar::Scalar;

/// Owns one contiguous value buffer and one contiguous gradient buffer of
/// identical length. Never reasons about shape; Tensor does that.
pub struct Storage<T: Scalar> {
    data: Vec<T>,
    grad: Vec<T>,
}

impl<T: Scalar> Storage<T> {
    /// Zero-filled data and grad of length `len`.
    pub fn zeros(len: usize) -> Self {
        Storage {
            data: vec![T::zero(); len],
            grad: vec![T::zero(); len],
        }
    }

    /// Adopt a caller-provided data buffer; grad is zero-filled to match.
    pub fn from_data(data: Vec<T>) -> Self {
        let len = data.len();
        Storage {
            data,
            grad: vec![T::zero(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn grad(&self) -> &[T] {
        &self.grad
    }

    pub fn grad_mut(&mut self) -> &mut [T] {
        &mut self.grad
    }
}
