//! Hashing helpers

use sha2::{Digest, Sha256};

/// SHA-256 digest of `data` as lowercase hex
pub fn sha256_hex(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex("CREATE TABLE t (id TEXT)").len(), 64);
    }

    #[test]
    fn test_sha256_hex_differs_per_input() {
        assert_ne!(sha256_hex("v1"), sha256_hex("v2"));
    }
}
