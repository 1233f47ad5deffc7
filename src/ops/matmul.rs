//! MatMul: A(n,m) . B(m,p) -> C(n,p). Backward: grad_a = grad_out . B^T,
//! grad_b = A^T . grad_out, both computed via the same strided multiply,
//! with the transposes taken as zero-copy views (see Tensor::transpose).

use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::tensor::{Tensor, TensorError, TensorResult};
use std::rc::Rc;

/// Strided reference matmul: out[i,j] = sum_k a[i,k] * b[k,j].
fn strided_matmul<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> TensorResult<(Vec<T>, Shape)> {
    if a.cols() != b.rows() {
        return Err(TensorError::ShapeMismatch(format!(
            "matmul: a.cols {} != b.rows {}",
            a.cols(),
            b.rows()
        )));
    }
    let (n, m, p) = (a.rows(), a.cols(), b.cols());
    let mut out = vec![T::zero(); n * p];
    for i in 0..n {
        for k in 0..m {
            let aik = a.get(i, k);
            if aik == T::zero() {
                continue;
            }
            for j in 0..p {
                out[i * p + j] = out[i * p + j] + aik * b.get(k, j);
            }
        }
    }
    Ok((out, Shape::new(n, p)))
}

pub fn matmul<T: Scalar>(a: &Tensor<T>, b: &Tensor<T>) -> TensorResult<Tensor<T>> {
    let (data, shape) = strided_matmul(a, b)?;
    let out_t = Tensor::op_output(data, shape, vec![a.clone(), b.clone()])?;

    let a_c = a.clone();
    let b_c = b.clone();
    let out_c = out_t.clone();
    out_t.set_backward(Rc::new(move || {
        let grad_out_shape = out_c.shape();
        let grad_out = Tensor::leaf(out_c.grad_to_vec(), grad_out_shape)
            .expect("grad_out shape matches out shape by construction");
        let b_t = b_c.transpose();
        let a_t = a_c.transpose();
        let (grad_a, _) = strided_matmul(&grad_out, &b_t).expect("grad_a shapes conform by construction");
        let (grad_b, _) = strided_matmul(&a_t, &grad_out).expect("grad_b shapes conform by construction");
        a_c.accumulate_grad(&grad_a);
        b_c.accumulate_grad(&grad_b);
    }));
    Ok(out_t)
}
