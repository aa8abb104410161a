//! Cryptographic primitives for Lockbox.
//!
//! This module provides:
//! - Password encryption for vault entries (XChaCha20-Poly1305)
//! - SHA-256 digests of the master passphrase
//! - Random password generation with character-class minimums
//!
//! # Security Guarantees
//! - Key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Digest comparison is constant-time

pub mod cipher;
pub mod digest;
pub mod generator;
pub mod keys;

pub use cipher::CredentialCipher;
pub use digest::{digest_passphrase, verify_passphrase};
pub use generator::{generate, generate_password, PasswordPolicy};
pub use keys::{EncryptionKey, KEY_LENGTH};
