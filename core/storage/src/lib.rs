//! Storage abstraction for Lockbox.
//!
//! This module provides a trait-based interface for the blobs a vault
//! persists (key, master digest, vault document) and two backends: a local
//! directory and an in-memory map.
//!
//! # Design Principles
//! - Store isolation: no vault or crypto logic in storage backends
//! - Whole-object writes that replace atomically
//! - Unified error semantics across backends

pub mod local;
pub mod memory;
pub mod provider;

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use provider::Store;
