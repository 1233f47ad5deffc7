//! Error taxonomy for CSR (de)serialization.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrError {
    #[error("invalid magic: expected 0x{expected:08X}, got 0x{found:08X}")]
    InvalidMagic { expected: u32, found: u32 },
    #[error("unsupported schema version: {0}")]
    UnsupportedVersion(u32),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CsrResult<T> = Result<T, CsrError>;
