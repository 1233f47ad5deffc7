//! The storage-aliasing bridge between the tensor engine and the CSR
//! snapshot: `weights_as_tensor` shares its buffer with the snapshot's own
//! weight array, so differentiable computation over the weights is
//! observable through the graph and vice versa, and the live graph's decay
//! independently exercises the per-edge `Graph::apply_decay` path over a
//! whole graph rather than a single aliased tensor.

use forge_core::ops::relu;
use forge_core::{Graph, Shape, Tensor, WorkerPool};

#[test]
fn writes_through_the_aliased_tensor_are_visible_on_the_csr_snapshot() {
    let g: Graph<f32> = Graph::new();
    g.get_or_add_node("a", ()).unwrap();
    g.get_or_add_node("b", ()).unwrap();
    g.accumulate_edge("a", "b", -1.0, 0).unwrap();

    let csr = g.compile_csr();
    let weights = csr.weights_as_tensor();
    assert_eq!(weights.shape().rows, 1);
    assert_eq!(weights.shape().cols, 2); // a->b and b->a

    // Run the weights through ReLU (clamps the negative edge weight to 0)
    // and write the result back into the same aliased buffer.
    let activated = relu(&weights).unwrap();
    for i in 0..activated.cols() {
        weights.set(0, i, activated.get(0, i));
    }

    assert_eq!(csr.weight_at(0), 0.0);
    assert_eq!(csr.weight_at(1), 0.0);
}

#[test]
fn weights_as_tensor_is_a_leaf_with_no_autograd_parents() {
    let g: Graph<f32> = Graph::new();
    g.get_or_add_node("a", ()).unwrap();
    g.accumulate_edge("a", "a", 3.0, 0).unwrap();
    let csr = g.compile_csr();
    let w = csr.weights_as_tensor();
    // A leaf has no inputs and no backward closure; seeding it with a zero
    // gradient and running the engine must leave its gradient at zero.
    let seed = Tensor::zeros(w.shape());
    forge_core::backward(&w, &seed);
    assert_eq!(w.grad_to_vec(), vec![0.0]);
}

#[test]
fn graph_apply_decay_reaches_half_weight_after_one_half_life() {
    let g: Graph<f64> = Graph::new();
    g.get_or_add_node("x", ()).unwrap();
    g.get_or_add_node("y", ()).unwrap();
    g.accumulate_edge("x", "y", 10.0, 0).unwrap();

    let half_life_days = (2.0f64).ln() / 0.005;
    let now = (half_life_days * 86_400.0).round() as i64;
    g.apply_decay(&WorkerPool::serial(), 0.005, now);

    let x = g.get_node("x").unwrap();
    let (_, weight, _) = x.edges_snapshot()[0].clone();
    approx::assert_abs_diff_eq!(weight, 5.0, epsilon = 0.1);
}

#[test]
fn parallel_scan_and_project_cover_every_node() {
    let g: Graph<f32> = Graph::new();
    for id in ["a", "b", "c"] {
        g.get_or_add_node(id, ()).unwrap();
    }
    let pool = WorkerPool::serial();

    let ids = g.parallel_project(&pool, |n| n.id());
    let mut sorted_ids = ids;
    sorted_ids.sort();
    assert_eq!(sorted_ids, vec!["a".to_string(), "b".to_string(), "c".to_string()]);

    use std::sync::atomic::{AtomicUsize, Ordering};
    let count = AtomicUsize::new(0);
    g.parallel_scan(&pool, |_| {
        count.fetch_add(1, Ordering::Relaxed);
    });
    assert_eq!(count.load(Ordering::Relaxed), 3);
}
