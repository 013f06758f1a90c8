//! Error types for the CLI.

use crate::config::ConfigError;
use landcert_core::LandCertError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read requests from {path}: {source}")]
    ReadRequests {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid request JSON in {path}: {source}")]
    ParseRequests {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    LandCert(#[from] LandCertError),
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
