//! Local filesystem store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::provider::{validate_name, Store};
use lockbox_common::{Error, Result};

/// File mode for everything the store writes.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Local filesystem store.
///
/// Keeps each object as a file directly under `root`. Writes go to a
/// uniquely named temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous file intact.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a new local store with the given root directory.
    ///
    /// # Postconditions
    /// - Root directory is created if it doesn't exist
    ///
    /// # Errors
    /// - Permission denied
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            fs::create_dir_all(&root)?;
        }

        Ok(Self { root })
    }

    fn to_fs_path(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }

    fn write_temp(&self, target: &Path, data: &[u8]) -> Result<PathBuf> {
        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput("Invalid target path".to_string()))?;
        let temp_path = self
            .root
            .join(format!(".{}.tmp.{}", file_name, Uuid::new_v4()));

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(FILE_MODE);
        }

        let mut file = options.open(&temp_path)?;
        let written = file.write_all(data).and_then(|_| file.sync_all());
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(temp_path)
    }

    /// Flush the directory entry so the rename survives a crash. Best effort.
    fn sync_root(&self) {
        #[cfg(unix)]
        {
            let synced = fs::File::open(&self.root).and_then(|dir| dir.sync_all());
            if let Err(e) = synced {
                debug!("Directory sync failed for {}: {}", self.root.display(), e);
            }
        }
    }
}

impl Store for LocalStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let fs_path = self.to_fs_path(name)?;

        match fs::read(&fs_path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let fs_path = self.to_fs_path(name)?;
        let temp_path = self.write_temp(&fs_path, data)?;

        if let Err(e) = fs::rename(&temp_path, &fs_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        self.sync_root();

        debug!("Wrote {} ({} bytes)", name, data.len());
        Ok(())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.to_fs_path(name)?.exists())
    }
}
