//! Cache key derivation.

use sha2::{Digest, Sha256};

/// Length of every generated key (hex-encoded SHA-256).
pub const KEY_LENGTH: usize = 64;

/// Derives the cache key for a render request.
///
/// SHA-256 of `"{format}\0{output_format}\0{code}"`, hex encoded. The digest
/// is kept at full length so distinct requests never share a key in practice.
pub fn generate_key(code: &str, format: &str, output_format: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format.as_bytes());
    hasher.update([0u8]);
    hasher.update(output_format.as_bytes());
    hasher.update([0u8]);
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}
