//! Backward pass: reverse-topological DFS over the input-list relation,
//! then each tensor's captured closure runs in that order, accumulating
//! gradients additively into its inputs.

use crate::scalar::Scalar;
use crate::tensor::Tensor;
use std::collections::HashSet;

/// Run backward from `root` with an explicit `seed` gradient (same shape as
/// `root`). Never inspects the existing gradient buffer; `backward_default`
/// covers the common scalar-loss case by seeding all-ones.
pub fn backward<T: Scalar>(root: &Tensor<T>, seed: &Tensor<T>) {
    let order = reverse_topo_order(root);
    root.accumulate_grad(&seed.to_vec());
    for t in order {
        t.run_backward();
    }
}

/// Convenience wrapper: seeds `root` with all-ones (dL/dL = 1 for a scalar loss).
pub fn backward_default<T: Scalar>(root: &Tensor<T>) {
    let seed = Tensor::leaf(vec![T::one(); root.numel()], root.shape())
        .expect("seed shape matches root shape by construction");
    backward(root, &seed);
}

/// Reverse post-order of a DFS over the input-tensor relation, starting at
/// `root`. Visited set is keyed by Tensor identity (Rc pointer), not value.
fn reverse_topo_order<T: Scalar>(root: &Tensor<T>) -> Vec<Tensor<T>> {
    let mut visited = HashSet::new();
    let mut post_order = Vec::new();
    dfs(root, &mut visited, &mut post_order);
    post_order.reverse();
    post_order
}

fn dfs<T: Scalar>(t: &Tensor<T>, visited: &mut HashSet<usize>, post_order: &mut Vec<Tensor<T>>) {
    if !visited.insert(t.identity()) {
        return;
    }
    for input in t.inputs() {
        dfs(input, visited, post_order);
    }
    post_order.push(t.clone());
}
