//! Vault manager: wires storage, key, gate and repository together.

use std::sync::Arc;
use tracing::info;

use crate::config::VaultConfig;
use crate::gate::{AccessGrant, MasterGate, MasterPrompt};
use crate::keystore::KeyStore;
use crate::repository::VaultRepository;
use lockbox_common::Result;
use lockbox_crypto::{CredentialCipher, EncryptionKey};
use lockbox_storage::{LocalStore, Store};

/// Entry point for opening a vault.
///
/// Loads (or creates) the encryption key once on open and hands it to every
/// repository it creates. Repositories are only handed out after the master
/// passphrase has been verified.
pub struct VaultManager {
    config: VaultConfig,
    store: Arc<dyn Store>,
    gate: MasterGate,
    key: EncryptionKey,
}

impl VaultManager {
    /// Open the vault directory described by `config`.
    ///
    /// # Postconditions
    /// - The directory exists
    /// - The encryption key exists on disk
    ///
    /// # Errors
    /// - I/O errors creating the directory or key
    /// - `Crypto` if the persisted key is corrupt
    pub fn open(config: VaultConfig) -> Result<Self> {
        let store = Arc::new(LocalStore::new(&config.dir)?);
        info!(dir = %config.dir.display(), "Opening vault");
        Self::with_store(config, store)
    }

    /// Open a vault on an arbitrary store.
    pub fn with_store(config: VaultConfig, store: Arc<dyn Store>) -> Result<Self> {
        let key = KeyStore::new(store.clone(), config.key_file.clone()).load_or_create()?;
        let gate = MasterGate::new(store.clone(), config.master_file.clone());

        Ok(Self {
            config,
            store,
            gate,
            key,
        })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Whether the master passphrase has been set up.
    pub fn is_initialized(&self) -> Result<bool> {
        self.gate.is_initialized()
    }

    /// Set the master passphrase. See [`MasterGate::setup`].
    pub fn setup_master(&self, passphrase: &str, confirmation: &str) -> Result<()> {
        self.gate.setup(passphrase, confirmation)
    }

    /// Set the master passphrase by asking `prompt` until it succeeds.
    /// See [`MasterGate::setup_with`].
    pub fn setup_interactive(&self, prompt: &mut dyn MasterPrompt) -> Result<()> {
        self.gate.setup_with(prompt)
    }

    /// Verify the master passphrase and open the credential repository.
    ///
    /// # Errors
    /// - `Auth` on mismatch; callers must not grant any vault access
    pub fn verify_master(&self, passphrase: &str) -> Result<VaultRepository> {
        let grant = self.gate.verify(passphrase)?;
        Ok(self.repository(&grant))
    }

    /// Interactive variant of [`Self::verify_master`] that runs first-time
    /// setup when needed.
    pub fn unlock(&self, prompt: &mut dyn MasterPrompt) -> Result<VaultRepository> {
        let grant = self.gate.unlock(prompt)?;
        Ok(self.repository(&grant))
    }

    fn repository(&self, grant: &AccessGrant) -> VaultRepository {
        VaultRepository::new(
            grant,
            self.store.clone(),
            CredentialCipher::new(self.key.clone()),
            self.config.vault_file.clone(),
        )
    }

    /// Generate a password. Needs no vault access.
    pub fn generate_password(
        min_upper: usize,
        min_lower: usize,
        min_digits: usize,
        min_symbols: usize,
        length: usize,
    ) -> Result<String> {
        lockbox_crypto::generate_password(min_upper, min_lower, min_digits, min_symbols, length)
    }
}
