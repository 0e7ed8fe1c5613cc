//! Hashing used for block identifiers.

use crate::types::BlockId;

/// Compute the SHA-256 hash of the input data.
pub fn hash_sha256(data: &[u8]) -> [u8; 32] {
    use sha2::Digest;
    let result = sha2::Sha256::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Derive a block identifier from its encoded bytes.
pub fn block_id(encoded: &[u8]) -> BlockId {
    hash_sha256(encoded)
}
