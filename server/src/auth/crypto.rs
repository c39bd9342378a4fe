use sha2::{Digest, Sha256};

/// Session tokens are only ever stored and compared as their SHA-256 hex digest.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
