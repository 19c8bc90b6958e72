//! Error types shared across the crate.

pub mod types;

pub use types::{ConfigError, LocationError, StorageError};
