//! forge_core: a differentiable tensor engine and a concurrent weighted
//! graph store that compiles into a read-optimized CSR snapshot.
//!
//! Layers, leaves-first: storage/shape (flat buffers + stride metadata) ->
//! tensor engine (autograd DAG, matmul, broadcasting, activations, decay) ->
//! graph store (concurrent nodes/edges) -> CSR snapshot & algorithms
//! (compiled projection, parallel connected components, persistence). The
//! graph store and the tensor engine meet at one seam: a CSR snapshot's
//! weight buffer aliases a `Tensor`'s storage, so graph weights can
//! participate in differentiable computation.
//!
//! Determinism: `compile_csr` is deterministic for structurally identical
//! graphs (same sorted ids, same sorted per-node edges), so its topology
//! hash (`csr::topology_hash`) is a stable fingerprint across runs.

pub mod autograd;
pub mod csr;
pub mod decay;
pub mod graph;
pub mod ops;
pub mod runtime;
pub mod scalar;
pub mod shape;
pub mod state;
pub mod storage;
pub mod tensor;
pub mod vecmath;

pub use autograd::{backward, backward_default, check_gradients, numerical_grad, DEFAULT_EPS};
pub use csr::{
    connected_components_bfs, connected_components_parallel, hash_buffers, hash_bytes,
    to_hex_upper, topology_hash, CsrError, CsrResult, CsrSnapshot, EdgePredicate,
};
pub use graph::{Graph, GraphError, GraphResult, NodeRef};
pub use ops::{add, add_broadcast, matmul, relu, tanh};
pub use runtime::{default_pool, WorkerPool};
pub use scalar::Scalar;
pub use shape::{Shape, ShapeError, Strides};
pub use state::{load_state_dict, save_state_dict, TensorState};
pub use storage::Storage;
pub use tensor::{Tensor, TensorError, TensorResult};
