use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidValue(e) => write!(f, "Invalid configuration value: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Failures raised while parsing or routing an external reference.
#[derive(Debug, PartialEq, Eq)]
pub enum LocationError {
    MalformedReference(String),
    UnknownProtocol(String),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::MalformedReference(e) => write!(f, "Malformed external reference: {}", e),
            LocationError::UnknownProtocol(e) => write!(f, "No storage registered for protocol: {}", e),
        }
    }
}

impl std::error::Error for LocationError {}

/// Failures surfaced by a storage backend to the snapshot framework.
///
/// The first four variants are the kinds the framework is expected to
/// interpret; the remaining ones cover plain I/O and hashing trouble.
#[derive(Debug)]
pub enum StorageError {
    /// The hashing capability was not compiled into this build.
    DependencyMissing(String),
    /// The source file carries no extension to derive a type from.
    UnsupportedInput(String),
    /// The requested artifact is absent from the storage root.
    LookupFailed(String),
    /// The operation is not supported by this backend.
    NotImplemented(String),
    HashFailed(String),
    InvalidLocation(String),
    WriteFailed,
    ReadFailed,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DependencyMissing(e) => write!(f, "Missing dependency: {}", e),
            StorageError::UnsupportedInput(e) => write!(f, "Unsupported input: {}", e),
            StorageError::LookupFailed(e) => write!(f, "Lookup failed: {}", e),
            StorageError::NotImplemented(e) => write!(f, "Not implemented: {}", e),
            StorageError::HashFailed(e) => write!(f, "Image hashing failed: {}", e),
            StorageError::InvalidLocation(e) => write!(f, "Invalid location: {}", e),
            StorageError::WriteFailed => write!(f, "Storage write failed"),
            StorageError::ReadFailed => write!(f, "Storage read failed"),
        }
    }
}

impl std::error::Error for StorageError {}
