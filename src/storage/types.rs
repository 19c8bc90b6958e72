use std::io::Read;
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use log::error;
use serde::Serialize;

use crate::error_handling::types::StorageError;
use crate::external::location::ExternalLocation;

/// Read access to a stored artifact, valid while the backend is borrowed.
///
/// Nothing is copied out of the storage root, so dropping the handle has no
/// side effect.
#[derive(Debug)]
pub struct LoadedArtifact<'a> {
    path: PathBuf,
    _backend: PhantomData<&'a ()>,
}

impl<'a> LoadedArtifact<'a> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _backend: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, StorageError> {
        let mut buf = Vec::new();
        std::fs::File::open(&self.path)
            .and_then(|mut f| f.read_to_end(&mut buf))
            .map_err(|e| {
                error!("Read failed {}: {}", self.path.display(), e);
                StorageError::ReadFailed
            })?;
        Ok(buf)
    }
}

impl Deref for LoadedArtifact<'_> {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for LoadedArtifact<'_> {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// An artifact found in a storage root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    pub location: ExternalLocation,
    pub size_bytes: u64,
}
