//! Scalar: the floating-point element type tensors and graph weights are built over.
//! `f32` is the default (and the only type the persisted CSR format supports);
//! `f64` is available for call sites that want scientific precision, using the
//! exact same generic code.

use num_traits::Float;
use std::fmt::Debug;
use std::iter::Sum;

/// Bound satisfied by any scalar this crate can build a Storage/Tensor over.
pub trait Scalar: Float + Sum + Debug + Send + Sync + 'static {
    /// Small multiplier threshold below which decay clamps to zero.
    fn decay_epsilon() -> Self;
}

impl Scalar for f32 {
    fn decay_epsilon() -> Self {
        1e-7
    }
}

impl Scalar for f64 {
    fn decay_epsilon() -> Self {
        1e-7
    }
}
