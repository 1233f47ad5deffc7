//! Graph Store: a concurrent, mutable, keyed multigraph of string-identified
//! nodes and weighted, timestamped, undirected edges. Compiles into an
//! immutable [`crate::csr::CsrSnapshot`] via [`Graph::compile_csr`].

pub mod edge;
pub mod error;
pub mod node;
pub mod store;

pub use edge::Edge;
pub use error::{GraphError, GraphResult};
pub use node::NodeRef;
pub use store::Graph;
