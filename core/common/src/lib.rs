//! Common utilities and types shared across Lockbox crates.
//!
//! This module provides the error taxonomy and the value types that cross
//! crate boundaries.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Credential, ServiceName};
