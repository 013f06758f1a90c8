//! Identity types for LANDCERT records

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// SHA-256 content hash for canonical payload identity.
pub type ContentHash = [u8; 32];

/// Compute SHA-256 hash of content.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Unique code of a land request (also carried by each of its polygons).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestCode(String);

impl RequestCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for RequestCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl PartialEq<str> for RequestCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RequestCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Reference id of a crop in the crop catalogue.
///
/// Opaque: ids are only ever compared for equality, so catalogue ids of any
/// shape (object ids, UUIDs, slugs) pass through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CropId(String);

impl CropId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CropId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Growing season: the calendar year of a survey timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Season(i32);

impl Season {
    pub fn new(year: i32) -> Self {
        Self(year)
    }

    /// Calendar year of `timestamp` as observed at `offset`.
    pub fn from_timestamp(timestamp: &Timestamp, offset: FixedOffset) -> Self {
        Self(timestamp.with_timezone(&offset).year())
    }

    pub fn year(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
