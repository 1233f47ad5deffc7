//! Numerical gradient check: central-difference finite differences compared
//! against autograd, used by the tests in `tests/` to confirm that backward
//! gradients agree with a numerical approximation within tolerance.

use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::tensor::Tensor;

/// Central-difference epsilon.
pub const DEFAULT_EPS: f32 = 1e-4;

/// Numerical gradient of a scalar function `f` at `x`, via central
/// difference: `(f(x+eps) - f(x-eps)) / (2*eps)` applied to each element.
pub fn numerical_grad<T: Scalar>(x: &Tensor<T>, f: impl Fn(&Tensor<T>) -> T, eps: T) -> Vec<T> {
    let base = x.to_vec();
    let shape = x.shape();
    let mut grad = vec![T::zero(); base.len()];
    for i in 0..base.len() {
        let mut plus = base.clone();
        let mut minus = base.clone();
        plus[i] = plus[i] + eps;
        minus[i] = minus[i] - eps;
        let t_plus = Tensor::leaf(plus, shape).expect("same shape as x by construction");
        let t_minus = Tensor::leaf(minus, shape).expect("same shape as x by construction");
        grad[i] = (f(&t_plus) - f(&t_minus)) / (eps + eps);
    }
    grad
}

/// Build a loss from `inputs` via `build`, run autograd backward, and assert
/// every input's accumulated gradient matches its numerical gradient within
/// `rtol`/`atol`. `build` is re-invoked once per perturbed input element, so
/// it must be a pure function of its input tensors.
pub fn check_gradients<T: Scalar>(
    build: &impl Fn(&[Tensor<T>]) -> Tensor<T>,
    inputs: &[Tensor<T>],
    eps: T,
    rtol: T,
    atol: T,
) -> Result<(), String> {
    let loss = build(inputs);
    if loss.numel() != 1 {
        return Err(format!("loss must be scalar, got shape {}", loss.shape()));
    }
    crate::autograd::backward_default(&loss);

    for (idx, input) in inputs.iter().enumerate() {
        let autograd_grad = input.grad_to_vec();

        let num_grad = numerical_grad(
            input,
            |perturbed: &Tensor<T>| {
                let substituted: Vec<Tensor<T>> = inputs
                    .iter()
                    .enumerate()
                    .map(|(i, t)| if i == idx { perturbed.clone() } else { t.clone() })
                    .collect();
                let l = build(&substituted);
                l.get(0, 0)
            },
            eps,
        );

        if autograd_grad.len() != num_grad.len() {
            return Err(format!(
                "grad len mismatch at input {}: {} vs {}",
                idx,
                autograd_grad.len(),
                num_grad.len()
            ));
        }
        for (j, (&a, &n)) in autograd_grad.iter().zip(num_grad.iter()).enumerate() {
            let diff = (a - n).abs();
            let tol = atol + rtol * n.abs();
            if diff > tol {
                return Err(format!(
                    "input {} elem {}: autograd {:?} vs numerical {:?} (diff {:?} > tol {:?})",
                    idx, j, a, n, diff, tol
                ));
            }
        }
    }
    Ok(())
}

/// Convenience: a fresh leaf tensor, used by callers building ad hoc small DAGs.
pub fn leaf<T: Scalar>(data: Vec<T>, shape: Shape) -> Tensor<T> {
    Tensor::leaf(data, shape).expect("data length matches shape by construction in test helper")
}
