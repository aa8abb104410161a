//! One-way digest of the master passphrase.
//!
//! The digest is persisted as lowercase hex so the master-hash file stays
//! human-inspectable.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of the hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LENGTH: usize = 64;

/// Compute the hex-encoded SHA-256 digest of a passphrase.
pub fn digest_passphrase(passphrase: &str) -> String {
    hex::encode(Sha256::digest(passphrase.as_bytes()))
}

/// Check a passphrase against a stored hex digest in constant time.
///
/// A stored digest that is not well-formed hex never matches.
pub fn verify_passphrase(passphrase: &str, stored_hex: &str) -> bool {
    let stored = match hex::decode(stored_hex.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let candidate = Sha256::digest(passphrase.as_bytes());

    stored.len() == candidate.len() && bool::from(stored.as_slice().ct_eq(candidate.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_hex_sha256() {
        // SHA-256("abc")
        assert_eq!(
            digest_passphrase("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest_passphrase("pw1").len(), DIGEST_HEX_LENGTH);
    }

    #[test]
    fn test_verify_passphrase() {
        let stored = digest_passphrase("pw1");

        assert!(verify_passphrase("pw1", &stored));
        assert!(!verify_passphrase("wrong", &stored));
        assert!(!verify_passphrase("pw1 ", &stored));
    }

    #[test]
    fn test_verify_tolerates_trailing_newline() {
        let stored = format!("{}\n", digest_passphrase("pw1"));
        assert!(verify_passphrase("pw1", &stored));
    }

    #[test]
    fn test_malformed_digest_never_matches() {
        assert!(!verify_passphrase("pw1", ""));
        assert!(!verify_passphrase("pw1", "zz"));
        assert!(!verify_passphrase("pw1", &digest_passphrase("pw1")[..32]));
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let stored = digest_passphrase("pw1").to_uppercase();
        assert!(verify_passphrase("pw1", &stored));
    }
}
