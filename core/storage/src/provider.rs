//! Storage trait definition.

use lockbox_common::{Error, Result};

/// Blob store holding the vault's persisted artifacts.
///
/// Objects are addressed by a flat file name (e.g. "vault.json"). All
/// operations are synchronous and block until the underlying I/O completes.
pub trait Store: Send + Sync {
    /// Read an object.
    ///
    /// # Returns
    /// - `Ok(None)` if the object does not exist
    ///
    /// # Errors
    /// - Invalid object name
    /// - I/O errors
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Write an object, replacing any previous content.
    ///
    /// # Postconditions
    /// - Readers observe either the old or the new content, never a mix
    ///
    /// # Errors
    /// - Invalid object name
    /// - I/O errors (permission denied, disk full)
    fn write(&self, name: &str, data: &[u8]) -> Result<()>;

    /// Check if an object exists.
    fn exists(&self, name: &str) -> Result<bool>;
}

/// Reject names that would escape the store root.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput("Object name cannot be empty".to_string()));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(Error::InvalidInput(format!("Invalid object name: {}", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("vault.json").is_ok());
        assert!(validate_name("secret.key").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("../vault.json").is_err());
        assert!(validate_name("dir\\file").is_err());
    }
}
