//! ReLU: element-wise max(0, x). Backward reads the forward *output* (not the
//! input) to decide where gradient flows — the two agree everywhere except at
//! zero, where the gradient is defined as 0.

use crate::scalar::Scalar;
use crate::tensor::{Tensor, TensorResult};
use std::rc::Rc;

pub fn relu<T: Scalar>(a: &Tensor<T>) -> TensorResult<Tensor<T>> {
    let out: Vec<T> = a
        .to_vec()
        .into_iter()
        .map(|x| if x > T::zero() { x } else { T::zero() })
        .collect();
    let out_t = Tensor::op_output(out, a.shape(), vec![a.clone()])?;

    let a_c = a.clone();
    let out_c = out_t.clone();
    out_t.set_backward(Rc::new(move || {
        let grad_out = out_c.grad_to_vec();
        let fwd = out_c.to_vec();
        let grad_in: Vec<T> = grad_out
            .iter()
            .zip(fwd.iter())
            .map(|(&g, &y)| if y > T::zero() { g } else { T::zero() })
            .collect();
        a_c.accumulate_grad(&grad_in);
    }));
    Ok(out_t)
}
