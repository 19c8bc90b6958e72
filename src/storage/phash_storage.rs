use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::error_handling::types::StorageError;
use crate::external::location::{is_valid_stem, is_valid_suffix, ExternalLocation};
use crate::hashing::{default_hasher, ImageHasher};
use crate::storage::storage_trait::StorageProtocol;
use crate::storage::types::{LoadedArtifact, StoredArtifact};

/// Protocol name this backend answers to in reference strings.
pub const PROTOCOL_NAME: &str = "phash";

/// Storage root used when none is configured.
pub const DEFAULT_STORAGE_DIR: &str = ".inline-snapshot/phash";

const GITIGNORE: &str = ".gitignore";
const GITIGNORE_CONTENT: &[u8] = b"# Perceptual hash storage\n*\n";
const TEMP_PREFIX: &str = ".phash-tmp-";

/// Filesystem backend that addresses artifacts by a perceptual image hash.
///
/// Every artifact is stored once as `{stem}{suffix}` in a flat directory.
/// Pictures that hash alike share a stem, so storing the second one is a no-op.
pub struct PerceptualHashStorage {
    directory: PathBuf,
    hasher: Arc<dyn ImageHasher>,
}

impl PerceptualHashStorage {
    /// Backend rooted at `directory` using the built-in hasher.
    ///
    /// The directory is only created on the first store.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self, StorageError> {
        let hasher = default_hasher().map_err(|e| {
            error!("Cannot create phash storage: {}", e);
            e
        })?;
        Ok(Self::with_hasher(directory, hasher))
    }

    pub fn with_hasher<P: AsRef<Path>>(directory: P, hasher: Arc<dyn ImageHasher>) -> Self {
        let directory = directory.as_ref().to_path_buf();
        debug!("PerceptualHashStorage rooted at {}", directory.display());
        Self { directory, hasher }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn ensure_directory(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            error!("Failed to create storage dir {}: {}", self.directory.display(), e);
            StorageError::WriteFailed
        })?;
        let marker = self.directory.join(GITIGNORE);
        if !marker.exists() {
            fs::write(&marker, GITIGNORE_CONTENT).map_err(|e| {
                error!("Failed to write {}: {}", marker.display(), e);
                StorageError::WriteFailed
            })?;
            info!("Initialized phash storage at {}", self.directory.display());
        }
        Ok(())
    }

    /// Path of the artifact for `location`, or `None` for a location without a stem.
    fn artifact_path(&self, location: &ExternalLocation) -> Result<Option<PathBuf>, StorageError> {
        if location.is_empty() {
            return Ok(None);
        }
        if !is_valid_stem(location.stem()) || !is_valid_suffix(location.suffix()) {
            return Err(StorageError::InvalidLocation(location.to_string()));
        }
        Ok(Some(self.directory.join(location.path())))
    }

    /// All artifacts currently in the storage root, sorted by file name.
    pub fn list_artifacts(&self) -> Result<Vec<StoredArtifact>, StorageError> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }
        let mut artifacts = Vec::new();
        for entry in fs::read_dir(&self.directory).map_err(|e| {
            error!("Failed to read storage dir {}: {}", self.directory.display(), e);
            StorageError::ReadFailed
        })? {
            let entry = entry.map_err(|e| {
                error!("Dir entry error: {}", e);
                StorageError::ReadFailed
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let location = match ExternalLocation::parse(&format!("{}:{}", PROTOCOL_NAME, name)) {
                Ok(loc) if !loc.is_empty() => loc,
                _ => {
                    warn!("Ignoring unexpected file {} in storage root", name);
                    continue;
                }
            };
            let metadata = entry.metadata().map_err(|e| {
                error!("Failed to stat {}: {}", entry.path().display(), e);
                StorageError::ReadFailed
            })?;
            if !metadata.is_file() {
                continue;
            }
            artifacts.push(StoredArtifact {
                location,
                size_bytes: metadata.len(),
            });
        }
        artifacts.sort_by_key(|a| a.location.path());
        debug!("Found {} artifact(s) in {}", artifacts.len(), self.directory.display());
        Ok(artifacts)
    }
}

impl StorageProtocol for PerceptualHashStorage {
    fn name(&self) -> &str {
        PROTOCOL_NAME
    }

    fn new_location(
        &self,
        location: &ExternalLocation,
        file_path: &Path,
    ) -> Result<ExternalLocation, StorageError> {
        let raw_extension = file_path.extension().filter(|e| !e.is_empty()).ok_or_else(|| {
            StorageError::UnsupportedInput(format!(
                "filetype detection not implemented ({} has no extension)",
                file_path.display()
            ))
        })?;
        let extension = raw_extension.to_str().ok_or_else(|| {
            StorageError::UnsupportedInput(format!(
                "extension {:?} of {} is not valid UTF-8",
                raw_extension,
                file_path.display()
            ))
        })?;
        let suffix = if location.suffix().is_empty() {
            format!(".{}", extension)
        } else {
            location.suffix().to_string()
        };
        if !is_valid_suffix(&suffix) {
            return Err(StorageError::UnsupportedInput(format!("unusable suffix {:?}", suffix)));
        }

        let hash = self.hasher.hash_image(file_path)?;
        if !is_valid_stem(&hash) {
            return Err(StorageError::HashFailed(format!(
                "hash {:?} of {} is not a usable file stem",
                hash,
                file_path.display()
            )));
        }
        debug!("Derived location {}{} for {}", hash, suffix, file_path.display());
        Ok(location.with_stem(hash).with_suffix(suffix))
    }

    fn store(&self, location: &ExternalLocation, file_path: &Path) -> Result<(), StorageError> {
        let dest = self.artifact_path(location)?.ok_or_else(|| {
            StorageError::InvalidLocation(format!("{} has no stem to store under", location))
        })?;
        self.ensure_directory()?;
        if dest.exists() {
            debug!("{} already stored, skipping {}", location.path(), file_path.display());
            return Ok(());
        }

        let mut src = File::open(file_path).map_err(|e| {
            error!("Failed to open {}: {}", file_path.display(), e);
            StorageError::ReadFailed
        })?;
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(&self.directory)
            .map_err(|e| {
                error!("Failed to create temp file in {}: {}", self.directory.display(), e);
                StorageError::WriteFailed
            })?;
        io::copy(&mut src, tmp.as_file_mut()).map_err(|e| {
            error!("Copy of {} failed: {}", file_path.display(), e);
            StorageError::WriteFailed
        })?;
        match src.metadata() {
            Ok(metadata) => {
                if let Err(e) = tmp.as_file().set_permissions(metadata.permissions()) {
                    warn!("Failed to copy permissions of {}: {}", file_path.display(), e);
                }
            }
            Err(e) => warn!("Failed to read metadata of {}: {}", file_path.display(), e),
        }

        match tmp.persist_noclobber(&dest) {
            Ok(_) => info!("Stored {} at {}", file_path.display(), dest.display()),
            // another writer got there first with the same content key
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{} appeared concurrently, skipping", dest.display())
            }
            Err(e) => {
                error!("Failed to persist {}: {}", dest.display(), e.error);
                return Err(StorageError::WriteFailed);
            }
        }
        Ok(())
    }

    fn load(&self, location: &ExternalLocation) -> Result<LoadedArtifact<'_>, StorageError> {
        let not_found = || {
            StorageError::LookupFailed(format!(
                "phash {:?} not found in {}",
                location.path(),
                self.directory.display()
            ))
        };
        let path = self.artifact_path(location)?.ok_or_else(not_found)?;
        if !path.exists() {
            return Err(not_found());
        }
        debug!("Loaded {}", path.display());
        Ok(LoadedArtifact::new(path))
    }

    fn delete(&self, location: &ExternalLocation) -> Result<(), StorageError> {
        let Some(path) = self.artifact_path(location)? else {
            return Ok(());
        };
        if !path.exists() {
            debug!("Nothing to delete at {}", path.display());
            return Ok(());
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Failed to delete {}: {}", path.display(), e);
                Err(StorageError::WriteFailed)
            }
        }
    }

    fn sync_used_externals(&self, _used_externals: &[ExternalLocation]) -> Result<(), StorageError> {
        Err(StorageError::NotImplemented(
            "trim not yet implemented for phash storage".to_string(),
        ))
    }
}
