//! Vault engine for Lockbox.
//!
//! This module provides:
//! - Master passphrase setup and verification
//! - Encryption key lifecycle
//! - The credential repository and its persisted document
//!
//! # Architecture
//! The vault module sits between the user interface and the storage
//! backends. `VaultManager` loads the key once; `MasterGate` issues an
//! `AccessGrant` that `VaultRepository` requires, so no credential can be
//! read or written before the master passphrase has been checked.

pub mod config;
pub mod gate;
pub mod keystore;
pub mod manager;
pub mod model;
pub mod repository;

pub use config::VaultConfig;
pub use gate::{AccessGrant, MasterGate, MasterPrompt};
pub use keystore::KeyStore;
pub use manager::VaultManager;
pub use model::{Vault, VaultEntry};
pub use repository::VaultRepository;
