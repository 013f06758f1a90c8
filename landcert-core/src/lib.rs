//! LANDCERT Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no conflict resolution logic.

pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod identity;

pub use config::{ResolverConfig, MAX_UTC_OFFSET_MINUTES};
pub use entities::{ConflictRecord, Farm, Intersection, IntersectionDetail, LandRequest, Polygon};
pub use error::{ConfigError, LandCertError, LandCertResult, PipelineError, StorageError};
pub use geometry::{canonical_json, Area, GeoPayload};
pub use identity::{compute_content_hash, ContentHash, CropId, RequestCode, Season, Timestamp};
