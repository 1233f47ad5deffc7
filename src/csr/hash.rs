//! Topology hash: a SHA-256 fingerprint of a CSR's structure and weights.
//! Two structurally identical graphs produce byte-identical hashes; any
//! change (including a `+0.0001` weight delta) diverges via SHA-256's
//! avalanche property.

use crate::csr::snapshot::CsrSnapshot;
use sha2::{Digest, Sha256};

/// SHA-256 digest of a single byte buffer.
pub fn hash_bytes(buf: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(buf);
    hasher.finalize().into()
}

/// SHA-256 digest of several buffers hashed in sequence, as a single digest
/// (used for the three-array CSR topology hash).
pub fn hash_buffers(buffers: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for buf in buffers {
        hasher.update(buf);
    }
    hasher.finalize().into()
}

/// Uppercase hex encoding of a digest.
pub fn to_hex_upper(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{:02X}", b)).collect()
}

fn le_bytes_i32(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn le_bytes_f32(values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// SHA-256 over the concatenation of the raw little-endian bytes of
/// `row_ptr`, `col_idx`, `weights` (in that order).
pub fn topology_hash(snapshot: &CsrSnapshot) -> [u8; 32] {
    let row_ptr_bytes = le_bytes_i32(snapshot.row_ptr());
    let col_idx_bytes = le_bytes_i32(snapshot.col_idx());
    let weights_bytes = le_bytes_f32(&snapshot.weights_vec());
    hash_buffers(&[&row_ptr_bytes, &col_idx_bytes, &weights_bytes])
}
