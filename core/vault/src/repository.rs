//! Credential storage with encryption/decryption of passwords.

use std::sync::Arc;
use tracing::{debug, info};

use crate::gate::AccessGrant;
use crate::model::{Vault, VaultEntry};
use lockbox_common::{Credential, Error, Result, ServiceName};
use lockbox_crypto::CredentialCipher;
use lockbox_storage::Store;

/// Repository of credential records.
///
/// Every operation reads the whole vault document and every mutation writes
/// it back in full. There is no cross-process locking: two processes mutating
/// the same vault concurrently can lose one of the updates. A vault directory
/// must have a single writer at a time.
pub struct VaultRepository {
    store: Arc<dyn Store>,
    cipher: CredentialCipher,
    file_name: String,
}

impl VaultRepository {
    /// Create a repository. Requires proof of master passphrase verification.
    pub fn new(
        _grant: &AccessGrant,
        store: Arc<dyn Store>,
        cipher: CredentialCipher,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cipher,
            file_name: file_name.into(),
        }
    }

    /// Read the vault. A missing document is an empty vault.
    ///
    /// # Errors
    /// - `Serialization` if the document is malformed
    /// - I/O errors
    pub fn load(&self) -> Result<Vault> {
        match self.store.read(&self.file_name)? {
            Some(bytes) => Vault::from_json(&bytes),
            None => Ok(Vault::new()),
        }
    }

    /// Replace the persisted vault with `vault`.
    pub fn save(&self, vault: &Vault) -> Result<()> {
        let bytes = vault.to_json()?;
        self.store.write(&self.file_name, &bytes)?;
        debug!(entries = vault.len(), "Vault saved");
        Ok(())
    }

    /// Store a credential, replacing any existing one for the service.
    ///
    /// A blank service name is stored under the empty key.
    pub fn add(&self, service: &str, username: &str, password: &str) -> Result<()> {
        let service = ServiceName::new(service);
        let entry = VaultEntry {
            username: username.to_string(),
            password: self.cipher.encrypt(password)?,
        };

        let mut vault = self.load()?;
        if vault.insert(service.clone(), entry).is_some() {
            debug!(service = %service, "Replacing existing entry");
        }
        self.save(&vault)?;

        info!(service = %service, "Account saved");
        Ok(())
    }

    /// Fetch and decrypt a credential.
    ///
    /// # Errors
    /// - `NotFound` if the service has no entry
    /// - `Crypto` if the stored ciphertext fails authentication
    pub fn get(&self, service: &str) -> Result<Credential> {
        let service = ServiceName::new(service);
        let vault = self.load()?;

        let entry = vault.get(&service).ok_or_else(|| not_found(&service))?;
        let password = self.cipher.decrypt(&entry.password)?;

        debug!(service = %service, "Account read");
        Ok(Credential::new(entry.username.clone(), password))
    }

    /// All service names in insertion order.
    pub fn list(&self) -> Result<Vec<ServiceName>> {
        Ok(self.load()?.services().cloned().collect())
    }

    /// Whether the service has an entry.
    pub fn contains(&self, service: &str) -> Result<bool> {
        let service = ServiceName::new(service);
        Ok(self.load()?.contains(&service))
    }

    /// Remove a credential.
    ///
    /// # Errors
    /// - `NotFound` if the service has no entry
    pub fn delete(&self, service: &str) -> Result<()> {
        let service = ServiceName::new(service);
        let mut vault = self.load()?;

        vault.remove(&service).ok_or_else(|| not_found(&service))?;
        self.save(&vault)?;

        info!(service = %service, "Account deleted");
        Ok(())
    }

    /// Re-encrypt the password of an existing entry, leaving the username.
    ///
    /// # Errors
    /// - `NotFound` if the service has no entry
    pub fn update_password(&self, service: &str, password: &str) -> Result<()> {
        let service = ServiceName::new(service);
        let mut vault = self.load()?;

        let entry = vault.get_mut(&service).ok_or_else(|| not_found(&service))?;
        entry.password = self.cipher.encrypt(password)?;
        self.save(&vault)?;

        info!(service = %service, "Password updated");
        Ok(())
    }

}

fn not_found(service: &ServiceName) -> Error {
    Error::NotFound(format!("No account for '{}'", service))
}
