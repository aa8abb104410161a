//! Master passphrase gate.
//!
//! The gate stores a one-way digest of the master passphrase and checks
//! candidates against it. A successful check yields an [`AccessGrant`],
//! which is the only way to obtain a [`crate::VaultRepository`].

use std::sync::Arc;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use lockbox_common::{Error, Result};
use lockbox_crypto::{digest_passphrase, verify_passphrase};
use lockbox_storage::Store;

/// Proof that the master passphrase was verified in this process.
///
/// Cannot be constructed outside this crate.
#[derive(Debug)]
pub struct AccessGrant {
    _private: (),
}

/// Source of passphrases for [`MasterGate::unlock`].
///
/// Implemented by the interactive front end.
pub trait MasterPrompt {
    /// Ask for a new master passphrase and its confirmation.
    fn new_passphrase(&mut self) -> Result<(Zeroizing<String>, Zeroizing<String>)>;

    /// Ask for the master passphrase.
    fn passphrase(&mut self) -> Result<Zeroizing<String>>;

    /// Called after a new passphrase was rejected, before asking again.
    fn rejected(&mut self, _reason: &Error) {}

    /// Called once a new master passphrase has been stored.
    fn setup_complete(&mut self) {}
}

/// Hashes, persists and verifies the master passphrase.
pub struct MasterGate {
    store: Arc<dyn Store>,
    file_name: String,
}

impl MasterGate {
    pub fn new(store: Arc<dyn Store>, file_name: impl Into<String>) -> Self {
        Self {
            store,
            file_name: file_name.into(),
        }
    }

    /// Whether a master passphrase has been set up.
    pub fn is_initialized(&self) -> Result<bool> {
        self.store.exists(&self.file_name)
    }

    /// Set the master passphrase.
    ///
    /// # Errors
    /// - `AlreadyExists` if a master passphrase is already stored
    /// - `Validation` if the confirmation differs or the passphrase is empty
    /// - I/O errors writing the digest
    pub fn setup(&self, passphrase: &str, confirmation: &str) -> Result<()> {
        if self.is_initialized()? {
            return Err(Error::AlreadyExists(
                "Master passphrase is already set".to_string(),
            ));
        }

        if passphrase != confirmation {
            return Err(Error::Validation("Passphrases do not match".to_string()));
        }

        if passphrase.is_empty() {
            return Err(Error::Validation("Passphrase cannot be empty".to_string()));
        }

        let digest = digest_passphrase(passphrase);
        self.store.write(&self.file_name, digest.as_bytes())?;

        info!("Master passphrase set");
        Ok(())
    }

    /// Verify the master passphrase.
    ///
    /// Fails closed: a missing or unreadable digest never grants access.
    ///
    /// # Errors
    /// - `Auth` on mismatch or when no master passphrase is set
    /// - I/O errors reading the digest
    pub fn verify(&self, passphrase: &str) -> Result<AccessGrant> {
        let stored = self
            .store
            .read(&self.file_name)?
            .ok_or_else(|| Error::Auth("Master passphrase has not been set up".to_string()))?;

        let stored = String::from_utf8(stored)
            .map_err(|_| Error::Auth("Stored master digest is unreadable".to_string()))?;

        if !verify_passphrase(passphrase, &stored) {
            warn!("Master passphrase verification failed");
            return Err(Error::Auth("Incorrect master passphrase".to_string()));
        }

        debug!("Master passphrase verified");
        Ok(AccessGrant { _private: () })
    }

    /// Set the master passphrase interactively.
    ///
    /// Keeps asking `prompt` for a new passphrase until setup succeeds. Only
    /// `Validation` errors are retried.
    ///
    /// # Errors
    /// - `AlreadyExists` if a master passphrase is already stored
    /// - Errors from `prompt` and I/O errors
    pub fn setup_with(&self, prompt: &mut dyn MasterPrompt) -> Result<()> {
        if self.is_initialized()? {
            return Err(Error::AlreadyExists(
                "Master passphrase is already set".to_string(),
            ));
        }

        loop {
            let (passphrase, confirmation) = prompt.new_passphrase()?;
            match self.setup(&passphrase, &confirmation) {
                Ok(()) => {
                    prompt.setup_complete();
                    return Ok(());
                }
                Err(e @ Error::Validation(_)) => prompt.rejected(&e),
                Err(e) => return Err(e),
            }
        }
    }

    /// Run first-time setup if needed, then verify.
    pub fn unlock(&self, prompt: &mut dyn MasterPrompt) -> Result<AccessGrant> {
        if !self.is_initialized()? {
            self.setup_with(prompt)?;
        }

        let passphrase = prompt.passphrase()?;
        self.verify(&passphrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_storage::MemoryStore;
    use std::collections::VecDeque;

    fn gate() -> (MasterGate, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (MasterGate::new(store.clone(), "master.hash"), store)
    }

    struct ScriptedPrompt {
        new: VecDeque<(&'static str, &'static str)>,
        login: &'static str,
        rejections: usize,
        completed: bool,
    }

    impl MasterPrompt for ScriptedPrompt {
        fn new_passphrase(&mut self) -> Result<(Zeroizing<String>, Zeroizing<String>)> {
            let (a, b) = self
                .new
                .pop_front()
                .ok_or_else(|| Error::InvalidInput("script exhausted".to_string()))?;
            Ok((Zeroizing::new(a.to_string()), Zeroizing::new(b.to_string())))
        }

        fn passphrase(&mut self) -> Result<Zeroizing<String>> {
            Ok(Zeroizing::new(self.login.to_string()))
        }

        fn rejected(&mut self, _reason: &Error) {
            self.rejections += 1;
        }

        fn setup_complete(&mut self) {
            self.completed = true;
        }
    }

    #[test]
    fn test_setup_and_verify() {
        let (gate, store) = gate();

        gate.setup("pw1", "pw1").unwrap();

        assert!(gate.verify("pw1").is_ok());
        assert!(matches!(gate.verify("wrong"), Err(Error::Auth(_))));

        let stored = String::from_utf8(store.read("master.hash").unwrap().unwrap()).unwrap();
        assert_eq!(stored, digest_passphrase("pw1"));
        assert!(!stored.contains("pw1"));
    }

    #[test]
    fn test_setup_mismatch() {
        let (gate, _) = gate();

        assert!(matches!(gate.setup("pw1", "pw2"), Err(Error::Validation(_))));
        assert!(!gate.is_initialized().unwrap());
    }

    #[test]
    fn test_setup_empty_rejected() {
        let (gate, _) = gate();
        assert!(matches!(gate.setup("", ""), Err(Error::Validation(_))));
    }

    #[test]
    fn test_setup_is_permanent() {
        let (gate, _) = gate();
        gate.setup("pw1", "pw1").unwrap();

        assert!(matches!(
            gate.setup("pw2", "pw2"),
            Err(Error::AlreadyExists(_))
        ));
        assert!(gate.verify("pw1").is_ok());
    }

    #[test]
    fn test_verify_without_setup_fails_closed() {
        let (gate, _) = gate();
        assert!(matches!(gate.verify("anything"), Err(Error::Auth(_))));
    }

    #[test]
    fn test_verify_with_garbage_digest_fails() {
        let (gate, store) = gate();
        store.write("master.hash", &[0xff, 0xfe]).unwrap();

        assert!(matches!(gate.verify(""), Err(Error::Auth(_))));
    }

    #[test]
    fn test_verify_accepts_digest_written_with_newline() {
        let (gate, store) = gate();
        let digest = format!("{}\n", digest_passphrase("pw1"));
        store.write("master.hash", digest.as_bytes()).unwrap();

        assert!(gate.verify("pw1").is_ok());
    }

    #[test]
    fn test_setup_with_retries_then_refuses_second_setup() {
        let (gate, _) = gate();
        let mut prompt = ScriptedPrompt {
            new: VecDeque::from([("pw1", "typo"), ("pw1", "pw1"), ("pw2", "pw2")]),
            login: "pw1",
            rejections: 0,
            completed: false,
        };

        gate.setup_with(&mut prompt).unwrap();
        assert_eq!(prompt.rejections, 1);
        assert!(prompt.completed);
        assert!(gate.verify("pw1").is_ok());

        assert!(matches!(
            gate.setup_with(&mut prompt),
            Err(Error::AlreadyExists(_))
        ));
        // The refused call never prompted.
        assert_eq!(prompt.new.len(), 1);
    }

    #[test]
    fn test_unlock_retries_setup_until_confirmed() {
        let (gate, _) = gate();
        let mut prompt = ScriptedPrompt {
            new: VecDeque::from([("pw1", "typo"), ("", ""), ("pw1", "pw1")]),
            login: "pw1",
            rejections: 0,
            completed: false,
        };

        assert!(gate.unlock(&mut prompt).is_ok());
        assert_eq!(prompt.rejections, 2);
        assert!(prompt.completed);
    }

    #[test]
    fn test_unlock_skips_setup_when_initialized() {
        let (gate, _) = gate();
        gate.setup("pw1", "pw1").unwrap();

        let mut prompt = ScriptedPrompt {
            new: VecDeque::new(),
            login: "wrong",
            rejections: 0,
            completed: false,
        };

        assert!(matches!(gate.unlock(&mut prompt), Err(Error::Auth(_))));
        assert!(!prompt.completed);
    }

    #[test]
    fn test_unlock_propagates_prompt_errors() {
        let (gate, _) = gate();
        let mut prompt = ScriptedPrompt {
            new: VecDeque::from([("a", "b")]),
            login: "a",
            rejections: 0,
            completed: false,
        };

        assert!(matches!(
            gate.unlock(&mut prompt),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(prompt.rejections, 1);
    }
}
