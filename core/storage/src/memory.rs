//! In-memory store for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::provider::{validate_name, Store};
use lockbox_common::{Error, Result};

/// In-memory store.
///
/// Useful for testing. All data is stored in memory and lost on drop.
/// Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    storage: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> Error {
        Error::Io(std::io::Error::other("memory store lock poisoned"))
    }
}

impl Store for MemoryStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        validate_name(name)?;
        let storage = self.storage.read().map_err(|_| Self::poisoned())?;
        Ok(storage.get(name).cloned())
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        validate_name(name)?;
        let mut storage = self.storage.write().map_err(|_| Self::poisoned())?;
        storage.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, name: &str) -> Result<bool> {
        validate_name(name)?;
        let storage = self.storage.read().map_err(|_| Self::poisoned())?;
        Ok(storage.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_write_read() {
        let store = MemoryStore::new();

        store.write("vault.json", b"{}").unwrap();

        assert_eq!(store.read("vault.json").unwrap(), Some(b"{}".to_vec()));
        assert_eq!(store.read("other.json").unwrap(), None);
    }

    #[test]
    fn test_memory_clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();

        store.write("secret.key", &[1, 2, 3]).unwrap();

        assert!(clone.exists("secret.key").unwrap());
    }
}
