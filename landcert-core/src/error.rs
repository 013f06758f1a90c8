//! Error types for LANDCERT operations

use crate::RequestCode;
use std::time::Duration;
use thiserror::Error;

/// Request store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Insert failed for land request {code}: {reason}")]
    InsertFailed { code: RequestCode, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Request store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Conflict pipeline invocation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Conflict resolution for {code} timed out after {timeout:?}")]
    TimedOut { code: RequestCode, timeout: Duration },

    #[error("Conflict resolution task failed: {reason}")]
    TaskFailed { reason: String },
}

/// Master error type for all LANDCERT errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LandCertError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Result type alias for LANDCERT operations.
pub type LandCertResult<T> = Result<T, LandCertError>;
