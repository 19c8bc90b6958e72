//! Perceptual-hash storage for externally stored snapshot artifacts.
//!
//! Images referenced by `phash:` external references are stored under a key
//! derived from a perceptual hash, so the same picture at different
//! resolutions is written to disk once.
//!
//! ```no_run
//! use snapshot_phash::registry::{register_phash_storage, StorageRegistry};
//!
//! let mut registry = StorageRegistry::new();
//! register_phash_storage(&mut registry, None)?;
//! # Ok::<(), snapshot_phash::error_handling::StorageError>(())
//! ```

pub mod configuration;
pub mod error_handling;
pub mod external;
pub mod hashing;
pub mod registry;
pub mod storage;

pub use external::ExternalLocation;
pub use registry::{register_phash_storage, StorageRegistry};
pub use storage::{PerceptualHashStorage, StorageProtocol};
