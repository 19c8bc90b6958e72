//! Registry of storage backends, keyed by protocol name.

pub mod storage_registry;

pub use storage_registry::{register_phash_storage, register_phash_storage_with_hasher, StorageRegistry};
