//! Storage Protocol
//!
//! This module defines the `StorageProtocol` trait, the contract between the
//! snapshot framework's external-reference resolver and a storage backend.
//!
//! Implementors of this trait are responsible for:
//! - Deriving the canonical location of a new artifact from its content
//! - Persisting artifacts under that location
//! - Handing out read access to stored artifacts
//! - Deleting artifacts
//!
//! All methods return a `Result` so the framework can interpret failures by kind.

use std::path::Path;

use crate::error_handling::types::StorageError;
use crate::external::location::ExternalLocation;
use crate::storage::types::LoadedArtifact;

/// The `StorageProtocol` trait defines the interface for external artifact backends.
///
/// A backend is registered under [`StorageProtocol::name`] and receives every
/// location whose protocol matches that name.
pub trait StorageProtocol: Send + Sync {
    /// Protocol name used in reference strings (`<name>:<stem><suffix>`).
    fn name(&self) -> &str;

    /// Computes where the artifact currently at `file_path` belongs.
    ///
    /// Returns a copy of `location` carrying the content-derived stem.
    fn new_location(
        &self,
        location: &ExternalLocation,
        file_path: &Path,
    ) -> Result<ExternalLocation, StorageError>;

    /// Persists the file at `file_path` under `location`.
    fn store(&self, location: &ExternalLocation, file_path: &Path) -> Result<(), StorageError>;

    /// Gives scoped read access to the artifact stored under `location`.
    ///
    /// Fails with [`StorageError::LookupFailed`] when nothing is stored there.
    fn load(&self, location: &ExternalLocation) -> Result<LoadedArtifact<'_>, StorageError>;

    /// Removes the artifact stored under `location`, if any.
    fn delete(&self, location: &ExternalLocation) -> Result<(), StorageError>;

    /// Reconciles the store with the set of locations still referenced by tests.
    fn sync_used_externals(&self, used_externals: &[ExternalLocation]) -> Result<(), StorageError>;
}
