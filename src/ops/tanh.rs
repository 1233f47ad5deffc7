//! Tanh: element-wise hyperbolic tangent. Backward: local_grad = 1 - t^2
//! where t is the forward output.

use crate::scalar::Scalar;
use crate::tensor::{Tensor, TensorResult};
use std::rc::Rc;

pub fn tanh<T: Scalar>(a: &Tensor<T>) -> TensorResult<Tensor<T>> {
    let out: Vec<T> = a.to_vec().into_iter().map(|x| x.tanh()).collect();
    let out_t = Tensor::op_output(out, a.shape(), vec![a.clone()])?;

    let a_c = a.clone();
    let out_c = out_t.clone();
    out_t.set_backward(Rc::new(move || {
        let grad_out = out_c.grad_to_vec();
        let fwd = out_c.to_vec();
        let one = T::one();
        let grad_in: Vec<T> = grad_out
            .iter()
            .zip(fwd.iter())
            .map(|(&g, &t)| g * (one - t * t))
            .collect();
        a_c.accumulate_grad(&grad_in);
    }));
    Ok(out_t)
}
