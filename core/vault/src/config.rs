//! Vault location and file layout.

use std::path::{Path, PathBuf};

/// Key file name in the vault directory.
pub const KEY_FILENAME: &str = "secret.key";

/// Vault document file name.
pub const VAULT_FILENAME: &str = "vault.json";

/// Master digest file name.
pub const MASTER_FILENAME: &str = "master.hash";

/// Directory name under the platform data directory.
pub const APP_DIRNAME: &str = "lockbox";

/// Where a vault lives and what its files are called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultConfig {
    /// Directory holding all vault files.
    pub dir: PathBuf,
    /// Name of the raw key blob.
    pub key_file: String,
    /// Name of the JSON vault document.
    pub vault_file: String,
    /// Name of the master digest file.
    pub master_file: String,
}

impl VaultConfig {
    /// Configuration for a vault in `dir` with the default file names.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            key_file: KEY_FILENAME.to_string(),
            vault_file: VAULT_FILENAME.to_string(),
            master_file: MASTER_FILENAME.to_string(),
        }
    }

    /// Default vault directory: `<data_local_dir>/lockbox`, or the current
    /// directory when the platform has no data directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIRNAME))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}
