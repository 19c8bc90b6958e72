use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};

use crate::error_handling::types::{LocationError, StorageError};
use crate::external::location::ExternalLocation;
use crate::hashing::ImageHasher;
use crate::storage::phash_storage::{PerceptualHashStorage, DEFAULT_STORAGE_DIR};
use crate::storage::storage_trait::StorageProtocol;

/// Storage backends known to a test session.
///
/// The registry is an explicit value owned by whoever drives the session;
/// backends are registered once during setup and looked up by the protocol
/// part of each external reference.
#[derive(Default)]
pub struct StorageRegistry {
    storages: HashMap<String, Arc<dyn StorageProtocol>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `storage` under its own name and returns the backend it replaced.
    pub fn register(&mut self, storage: Arc<dyn StorageProtocol>) -> Option<Arc<dyn StorageProtocol>> {
        let name = storage.name().to_string();
        let previous = self.storages.insert(name.clone(), storage);
        if previous.is_some() {
            warn!("Replaced storage backend registered as {:?}", name);
        } else {
            info!("Registered storage backend {:?}", name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn StorageProtocol>> {
        self.storages.get(name).cloned()
    }

    /// Backend responsible for `location`.
    pub fn resolve(&self, location: &ExternalLocation) -> Result<Arc<dyn StorageProtocol>, LocationError> {
        self.get(location.protocol())
            .ok_or_else(|| LocationError::UnknownProtocol(location.protocol().to_string()))
    }

    /// Registered protocol names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.storages.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Registers the perceptual-hash backend under `"phash"`.
///
/// `storage_dir` defaults to `.inline-snapshot/phash`. Fails with
/// [`StorageError::DependencyMissing`] when the crate was built without a
/// hasher.
pub fn register_phash_storage(
    registry: &mut StorageRegistry,
    storage_dir: Option<&Path>,
) -> Result<Arc<PerceptualHashStorage>, StorageError> {
    let storage = Arc::new(PerceptualHashStorage::new(storage_dir_or_default(storage_dir))?);
    registry.register(storage.clone());
    Ok(storage)
}

/// Like [`register_phash_storage`] with an injected hasher.
pub fn register_phash_storage_with_hasher(
    registry: &mut StorageRegistry,
    storage_dir: Option<&Path>,
    hasher: Arc<dyn ImageHasher>,
) -> Arc<PerceptualHashStorage> {
    let storage = Arc::new(PerceptualHashStorage::with_hasher(
        storage_dir_or_default(storage_dir),
        hasher,
    ));
    registry.register(storage.clone());
    storage
}

fn storage_dir_or_default(storage_dir: Option<&Path>) -> PathBuf {
    storage_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
}
