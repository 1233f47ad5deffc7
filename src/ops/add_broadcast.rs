//! AddBroadcast: a + b where either operand may have a singleton dimension
//! that broadcasts against the other. Backward sums gradient back down along
//! any dimension that was expanded, so operand and gradient shapes always match.

use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::tensor::{Tensor, TensorResult};
use std::rc::Rc;

pub fn add_broadcast<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> TensorResult<Tensor<T>> {
    let out_shape = a.shape().broadcast_with(&b.shape())?;

    let mut out = Vec::with_capacity(out_shape.numel());
    for i in 0..out_shape.rows {
        for j in 0..out_shape.cols {
            let ai = if a.rows() == 1 { 0 } else { i };
            let aj = if a.cols() == 1 { 0 } else { j };
            let bi = if b.rows() == 1 { 0 } else { i };
            let bj = if b.cols() == 1 { 0 } else { j };
            out.push(a.get(ai, aj) + b.get(bi, bj));
        }
    }
    let out_t = Tensor::op_output(out, out_shape, vec![a.clone(), b.clone()])?;

    let a_c = a.clone();
    let b_c = b.clone();
    let out_c = out_t.clone();
    let a_shape = a.shape();
    let b_shape = b.shape();
    out_t.set_backward(Rc::new(move || {
        let grad_out = out_c.grad_to_vec();
        a_c.accumulate_grad(&reduce_to_shape(&grad_out, out_shape, a_shape));
        b_c.accumulate_grad(&reduce_to_shape(&grad_out, out_shape, b_shape));
    }));
    Ok(out_t)
}

/// Sum-reduce a row-major `out_shape` gradient down to `target_shape`, summing
/// over any dimension where `target_shape` was 1 (i.e. was broadcast-expanded).
fn reduce_to_shape<T: Scalar>(grad_out: &[T], out_shape: Shape, target_shape: Shape) -> Vec<T> {
    if out_shape.same_as(&target_shape) {
        return grad_out.to_vec();
    }
    let mut acc = vec![T::zero(); target_shape.numel()];
    for i in 0..out_shape.rows {
        let ti = if target_shape.rows == 1 { 0 } else { i };
        for j in 0..out_shape.cols {
            let tj = if target_shape.cols == 1 { 0 } else { j };
            let idx = ti * target_shape.cols + tj;
            acc[idx] = acc[idx] + grad_out[i * out_shape.cols + j];
        }
    }
    acc
}
