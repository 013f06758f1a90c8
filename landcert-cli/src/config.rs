//! Configuration loading for the LANDCERT CLI.
//!
//! The TOML file is optional. Missing fields take their defaults, and
//! `LANDCERT_*` environment variables override the file.

use landcert_core::ResolverConfig;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] landcert_core::LandCertError),
}

/// Parse a resolver config from TOML text.
pub fn from_toml(contents: &str) -> Result<ResolverConfig, ConfigError> {
    Ok(toml::from_str(contents)?)
}

pub fn from_path(path: &Path) -> Result<ResolverConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    from_toml(&contents)
}

/// File (if any), then environment overrides, then validation.
pub fn load(path: Option<&Path>) -> Result<ResolverConfig, ConfigError> {
    let config = match path {
        Some(path) => from_path(path)?,
        None => ResolverConfig::default(),
    };
    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}
