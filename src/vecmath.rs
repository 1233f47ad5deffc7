//! Small flat-vector math utilities shared by callers that need a distance
//! or similarity measure (e.g. embedding comparisons) without pulling in a
//! full tensor. Kept separate from `Tensor` because these operate on plain
//! `&[T]` with no autograd record. Degenerate magnitudes are handled in-band
//! (return 0.0) rather than failing, per the error-handling policy of
//! surfacing only caller-actionable failures.

use crate::scalar::Scalar;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("dimension mismatch: {0}")]
pub struct DimensionMismatch(pub String);

pub type VecResult<T> = Result<T, DimensionMismatch>;

fn check_len<T>(a: &[T], b: &[T]) -> VecResult<()> {
    if a.len() != b.len() {
        return Err(DimensionMismatch(format!(
            "lengths differ: {} != {}",
            a.len(),
            b.len()
        )));
    }
    Ok(())
}

/// Dot product of two equal-length vectors.
pub fn dot<T: Scalar>(a: &[T], b: &[T]) -> VecResult<T> {
    check_len(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(&x, &y)| x * y).sum())
}

/// Euclidean (L2) norm.
pub fn l2_norm<T: Scalar>(a: &[T]) -> T {
    a.iter().map(|&x| x * x).sum::<T>().sqrt()
}

/// Cosine similarity; returns 0.0 rather than NaN when either vector has
/// zero magnitude.
pub fn cosine_similarity<T: Scalar>(a: &[T], b: &[T]) -> VecResult<T> {
    let num = dot(a, b)?;
    let denom = l2_norm(a) * l2_norm(b);
    if denom == T::zero() {
        return Ok(T::zero());
    }
    Ok(num / denom)
}
