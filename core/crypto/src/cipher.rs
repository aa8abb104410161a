//! Password encryption for vault entries.
//!
//! A stored password is a single string: URL-safe base64 (padded) of
//! `nonce || ciphertext || tag` under XChaCha20-Poly1305. The 24-byte nonce
//! is drawn at random for every encryption.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng},
    XChaCha20Poly1305, XNonce,
};
use zeroize::Zeroizing;

use crate::keys::EncryptionKey;
use lockbox_common::{Error, Result};

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Smallest sealed value: an empty password still carries nonce and tag.
const MIN_SEALED_LEN: usize = NONCE_SIZE + TAG_SIZE;

/// Encrypts and decrypts password strings under the vault key.
#[derive(Clone)]
pub struct CredentialCipher {
    key: EncryptionKey,
}

impl CredentialCipher {
    /// Create a cipher bound to `key`.
    pub fn new(key: EncryptionKey) -> Self {
        Self { key }
    }

    fn aead(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(GenericArray::from_slice(self.key.as_bytes()))
    }

    /// Encrypt a plaintext password into its stored text form.
    ///
    /// Encrypting the same plaintext twice yields different text.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let sealed = self
            .aead()
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(URL_SAFE.encode(out))
    }

    /// Decrypt a stored text form back into the plaintext password.
    ///
    /// The tag is checked before anything is returned.
    ///
    /// # Errors
    /// - `Crypto` on bad base64, short input, failed authentication (tampering
    ///   or wrong key), or a plaintext that is not UTF-8
    pub fn decrypt(&self, text: &str) -> Result<Zeroizing<String>> {
        let raw = URL_SAFE
            .decode(text.trim())
            .map_err(|e| Error::Crypto(format!("Malformed ciphertext encoding: {}", e)))?;

        if raw.len() < MIN_SEALED_LEN {
            return Err(Error::Crypto(format!(
                "Ciphertext too short: {} bytes, need at least {}",
                raw.len(),
                MIN_SEALED_LEN
            )));
        }

        let (nonce, sealed) = raw.split_at(NONCE_SIZE);
        let opened = Zeroizing::new(
            self.aead()
                .decrypt(XNonce::from_slice(nonce), sealed)
                .map_err(|_| Error::Crypto("Ciphertext failed authentication".to_string()))?,
        );

        let password = std::str::from_utf8(&opened)
            .map_err(|_| Error::Crypto("Decrypted password is not valid UTF-8".to_string()))?;

        Ok(Zeroizing::new(password.to_owned()))
    }
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher")
            .field("key", &self.key)
            .finish()
    }
}
