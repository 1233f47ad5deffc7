//! Error taxonomy for the Graph Store subsystem boundary.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("node missing: {0}")]
    NodeMissing(String),
    #[error("invalid id: {0:?} (must be non-empty, non-whitespace)")]
    InvalidId(String),
}

pub type GraphResult<T> = Result<T, GraphError>;
