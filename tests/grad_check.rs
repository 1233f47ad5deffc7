//! Numerical gradient check tests: compare autograd with finite difference
//! across small DAGs mixing matmul, broadcasting add, and activations.

use forge_core::autograd::{check_gradients, numerical_grad, DEFAULT_EPS};
use forge_core::ops::{add, add_broadcast, matmul, relu, tanh};
use forge_core::{Shape, Tensor};

fn leaf(data: Vec<f32>, shape: Shape) -> Tensor<f32> {
    Tensor::leaf(data, shape).unwrap()
}

fn sum_to_scalar(t: &Tensor<f32>) -> Tensor<f32> {
    let ones_row = leaf(vec![1.0; t.rows()], Shape::new(1, t.rows()));
    let ones_col = leaf(vec![1.0; t.cols()], Shape::new(t.cols(), 1));
    let row_sum = matmul(&ones_row, t).unwrap();
    matmul(&row_sum, &ones_col).unwrap()
}

#[test]
fn numerical_grad_of_plain_sum_is_all_ones() {
    use approx::assert_abs_diff_eq;
    let x = leaf(vec![1.0, 2.0], Shape::new(1, 2));
    let f = |t: &Tensor<f32>| t.to_vec().iter().sum::<f32>();
    let g = numerical_grad(&x, f, DEFAULT_EPS);
    assert_eq!(g.len(), 2);
    assert_abs_diff_eq!(g[0], 1.0, epsilon = 1e-2);
    assert_abs_diff_eq!(g[1], 1.0, epsilon = 1e-2);
}

#[test]
fn matmul_then_add_matches_numerical_gradient() {
    let a = leaf(vec![2.0, 3.0], Shape::new(1, 2));
    let b = leaf(vec![4.0, 5.0], Shape::new(2, 1));
    let c = leaf(vec![1.0], Shape::new(1, 1));
    let build = |t: &[Tensor<f32>]| {
        let mm = matmul(&t[0], &t[1]).unwrap();
        add(&mm, &t[2]).unwrap()
    };
    check_gradients(&build, &[a, b, c], DEFAULT_EPS, 1e-2, 1e-2).unwrap();
}

#[test]
fn broadcast_add_gradient_sums_across_expanded_dimension() {
    let row = leaf(vec![1.0, 2.0, 3.0], Shape::new(1, 3));
    let mat = leaf(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0], Shape::new(2, 3));
    let build = |t: &[Tensor<f32>]| sum_to_scalar(&add_broadcast(&t[0], &t[1]).unwrap());
    check_gradients(&build, &[row, mat], DEFAULT_EPS, 1e-2, 1e-2).unwrap();
}

#[test]
fn relu_then_tanh_chain_matches_numerical_gradient() {
    let x = leaf(vec![-0.5, 0.3, 1.2, -1.0], Shape::new(1, 4));
    let build = |t: &[Tensor<f32>]| {
        let r = relu(&t[0]).unwrap();
        sum_to_scalar(&tanh(&r).unwrap())
    };
    check_gradients(&build, &[x], DEFAULT_EPS, 1e-2, 1e-2).unwrap();
}

#[test]
fn scalar_matmul_then_add_backprop_matches_hand_computed_gradients() {
    let a = leaf(vec![2.0], Shape::new(1, 1));
    let b = leaf(vec![-3.0], Shape::new(1, 1));
    let c = leaf(vec![10.0], Shape::new(1, 1));
    let e = add(&matmul(&a, &b).unwrap(), &c).unwrap();
    assert_eq!(e.to_vec(), vec![4.0]);
    forge_core::backward_default(&e);
    assert_eq!(a.grad_to_vec(), vec![-3.0]);
    assert_eq!(b.grad_to_vec(), vec![2.0]);
    assert_eq!(c.grad_to_vec(), vec![1.0]);
}
