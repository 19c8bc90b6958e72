//! Storage subsystem
//!
//! This module provides the storage protocol consumed by the snapshot
//! framework and the perceptual-hash backend that implements it.
//!
//! Components:
//! - `storage_trait`: the `StorageProtocol` trait every backend implements.
//! - `types`: handles and listings shared by backends.
//! - `phash_storage`: filesystem backend keyed by perceptual image hashes.

pub mod phash_storage;
pub mod storage_trait;
#[cfg(test)]
pub mod tests;
pub mod types;

pub use phash_storage::PerceptualHashStorage;
pub use storage_trait::StorageProtocol;
pub use types::{LoadedArtifact, StoredArtifact};
