//! CSR Snapshot & Algorithms: an immutable, compiled projection of a
//! [`crate::graph::Graph`] into four parallel arrays, plus the parallel
//! union-find connected-components algorithm (and a sequential BFS
//! reference variant), the byte-exact persistence format, and the topology
//! hash.

pub mod cc;
pub mod dsu;
pub mod error;
pub mod hash;
pub mod io;
pub mod snapshot;

pub use cc::{connected_components_bfs, connected_components_parallel, EdgePredicate};
pub use dsu::Dsu;
pub use error::{CsrError, CsrResult};
pub use hash::{hash_buffers, hash_bytes, to_hex_upper, topology_hash};
pub use io::{load, load_file, save, save_file};
pub use snapshot::CsrSnapshot;
