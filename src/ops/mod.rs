//! Differentiable operations over Tensor, one op per file. Each op builds
//! its output tensor and attaches a backward closure directly, rather than
//! registering into an op-id dispatch table.

pub mod add;
pub mod add_broadcast;
pub mod matmul;
pub mod relu;
pub mod tanh;

pub use add::add;
pub use add_broadcast::add_broadcast;
pub use matmul::matmul;
pub use relu::relu;
pub use tanh::tanh;
