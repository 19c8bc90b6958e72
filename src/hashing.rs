//! Image hashing capability.
//!
//! Storage backends only see the [`ImageHasher`] trait. The built-in
//! [`BlockMeanHasher`] is compiled in with the `builtin-hasher` feature;
//! without it [`default_hasher`] reports the dependency as missing and callers
//! must inject their own implementation.

pub mod image_hasher;

#[cfg(feature = "builtin-hasher")]
pub mod block_hasher;

pub use image_hasher::ImageHasher;

#[cfg(feature = "builtin-hasher")]
pub use block_hasher::BlockMeanHasher;

use std::sync::Arc;

use crate::error_handling::types::StorageError;

/// The hasher used when no implementation is injected.
#[cfg(feature = "builtin-hasher")]
pub fn default_hasher() -> Result<Arc<dyn ImageHasher>, StorageError> {
    Ok(Arc::new(BlockMeanHasher::new()))
}

#[cfg(not(feature = "builtin-hasher"))]
pub fn default_hasher() -> Result<Arc<dyn ImageHasher>, StorageError> {
    Err(StorageError::DependencyMissing(
        "image hashing is required for phash storage; rebuild with the `builtin-hasher` feature or inject an ImageHasher".to_string(),
    ))
}
