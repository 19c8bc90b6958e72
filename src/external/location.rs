use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error_handling::types::LocationError;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<protocol>[A-Za-z][A-Za-z0-9_]*):(?P<stem>[A-Za-z0-9_+=-]*)(?P<suffix>(?:\.[A-Za-z0-9_]+)*)$",
        )
        .expect("reference pattern is a valid regex")
    })
}

fn stem_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_+=-]+$").expect("stem pattern is a valid regex"))
}

fn suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\.[A-Za-z0-9_]+)*$").expect("suffix pattern is a valid regex")
    })
}

/// Returns true when `stem` can name a stored artifact.
///
/// Stems never contain dots or path separators, so `{stem}{suffix}` always
/// stays a plain file name inside the storage root.
pub fn is_valid_stem(stem: &str) -> bool {
    stem_pattern().is_match(stem)
}

/// Returns true for an empty suffix or a chain of `.segment` parts.
pub fn is_valid_suffix(suffix: &str) -> bool {
    suffix_pattern().is_match(suffix)
}

/// Where an external artifact lives: the protocol that owns it, the content
/// key (`stem`) and the file extension (`suffix`, leading dot included).
///
/// Two locations refer to the same stored file iff `stem` and `suffix` match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExternalLocation {
    protocol: String,
    stem: String,
    suffix: String,
}

impl ExternalLocation {
    pub fn new<P, S, X>(protocol: P, stem: S, suffix: X) -> Self
    where
        P: Into<String>,
        S: Into<String>,
        X: Into<String>,
    {
        Self {
            protocol: protocol.into(),
            stem: stem.into(),
            suffix: suffix.into(),
        }
    }

    /// Parse a reference string such as `phash:` or `phash:0f3c.png`.
    pub fn parse(reference: &str) -> Result<Self, LocationError> {
        let caps = reference_pattern()
            .captures(reference.trim())
            .ok_or_else(|| LocationError::MalformedReference(reference.to_string()))?;
        Ok(Self::new(&caps["protocol"], &caps["stem"], &caps["suffix"]))
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// File name of the artifact relative to the storage root.
    pub fn path(&self) -> String {
        format!("{}{}", self.stem, self.suffix)
    }

    /// True while no content key has been assigned yet (`phash:`).
    pub fn is_empty(&self) -> bool {
        self.stem.is_empty()
    }

    pub fn with_stem<S: Into<String>>(&self, stem: S) -> Self {
        Self {
            stem: stem.into(),
            ..self.clone()
        }
    }

    pub fn with_suffix<S: Into<String>>(&self, suffix: S) -> Self {
        Self {
            suffix: suffix.into(),
            ..self.clone()
        }
    }
}

impl FromStr for ExternalLocation {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ExternalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.protocol, self.stem, self.suffix)
    }
}
