//! External references.
//!
//! A snapshot assertion refers to an artifact stored outside the test source
//! with a string like `phash:` or `phash:<stem>.png`. This module parses those
//! strings into [`ExternalLocation`] values that storage backends consume.

pub mod location;

pub use location::ExternalLocation;
