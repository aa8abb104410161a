//! Persistence of the vault encryption key.

use std::sync::Arc;
use tracing::{debug, info};

use lockbox_common::Result;
use lockbox_crypto::EncryptionKey;
use lockbox_storage::Store;

/// Loads the vault key, creating it on first use.
pub struct KeyStore {
    store: Arc<dyn Store>,
    file_name: String,
}

impl KeyStore {
    pub fn new(store: Arc<dyn Store>, file_name: impl Into<String>) -> Self {
        Self {
            store,
            file_name: file_name.into(),
        }
    }

    /// Load the persisted key, or generate and persist a new one.
    ///
    /// # Errors
    /// - I/O errors reading or writing the key blob
    /// - `Crypto` if the persisted blob has the wrong length
    pub fn load_or_create(&self) -> Result<EncryptionKey> {
        match self.store.read(&self.file_name)? {
            Some(bytes) => {
                debug!(file = %self.file_name, "Loaded encryption key");
                EncryptionKey::from_slice(&bytes)
            }
            None => {
                let key = EncryptionKey::generate();
                self.store.write(&self.file_name, key.as_bytes())?;
                info!(file = %self.file_name, "Generated new encryption key");
                Ok(key)
            }
        }
    }
}
