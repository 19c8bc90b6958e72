use std::path::Path;

use crate::error_handling::types::StorageError;

/// Maps an image file to a similarity-bucketed hash string.
///
/// Implementors must be deterministic for pixel-identical content and should
/// return the same string for the same picture at different resolutions. The
/// returned string becomes a file stem, so it must only contain characters
/// accepted by [`crate::external::location::is_valid_stem`].
pub trait ImageHasher: Send + Sync {
    fn hash_image(&self, path: &Path) -> Result<String, StorageError>;
}

impl<F> ImageHasher for F
where
    F: Fn(&Path) -> Result<String, StorageError> + Send + Sync,
{
    fn hash_image(&self, path: &Path) -> Result<String, StorageError> {
        self(path)
    }
}
