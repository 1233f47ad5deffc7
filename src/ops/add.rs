//! Add: element-wise a + b (exact shape match required; see add_broadcast for
//! the broadcasting variant). Backward: each input gets the output gradient
//! unchanged.

use crate::scalar::Scalar;
use crate::tensor::{Tensor, TensorError, TensorResult};
use std::rc::Rc;

pub fn add<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> TensorResult<Tensor<T>> {
    if !a.shape().same_as(&b.shape()) {
        return Err(TensorError::ShapeMismatch(format!(
            "add: {} != {}",
            a.shape(),
            b.shape()
        )));
    }
    let av = a.to_vec();
    let bv = b.to_vec();
    let out: Vec<T> = av.iter().zip(bv.iter()).map(|(&x, &y)| x + y).collect();
    let out_t = Tensor::op_output(out, a.shape(), vec![a.clone(), b.clone()])?;

    let a_c = a.clone();
    let b_c = b.clone();
    let out_c = out_t.clone();
    out_t.set_backward(Rc::new(move || {
        let grad_out = out_c.grad_to_vec();
        a_c.accumulate_grad(&grad_out);
        b_c.accumulate_grad(&grad_out);
    }));
    Ok(out_t)
}
