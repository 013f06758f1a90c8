//! Configuration types
//!
//! `ResolverConfig` is loaded from TOML by the CLI and from environment
//! variables by embedding services. Every field has a default so partial
//! files are accepted.

use crate::{ConfigError, LandCertError, LandCertResult};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest offset (in minutes) any real time zone uses.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 30_000;

/// Conflict resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Offset from UTC used to derive the season year. 0 means UTC.
    pub season_utc_offset_minutes: i32,
    /// Timeout for one async resolution, in milliseconds.
    pub resolve_timeout_ms: u64,
    /// Drop polygons of other requests before the join.
    pub push_down_target_filter: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            season_utc_offset_minutes: 0,
            resolve_timeout_ms: DEFAULT_RESOLVE_TIMEOUT_MS,
            push_down_target_filter: true,
        }
    }
}

impl ResolverConfig {
    /// Create ResolverConfig from environment variables.
    ///
    /// Environment variables:
    /// - `LANDCERT_SEASON_UTC_OFFSET_MINUTES`: season time zone offset (default: 0)
    /// - `LANDCERT_RESOLVE_TIMEOUT_MS`: async resolution timeout (default: 30000)
    /// - `LANDCERT_PUSH_DOWN_TARGET_FILTER`: "true" or "false" (default: true)
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides on top of `self`.
    pub fn with_env_overrides(self) -> Self {
        let season_utc_offset_minutes = std::env::var("LANDCERT_SEASON_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(self.season_utc_offset_minutes);

        let resolve_timeout_ms = std::env::var("LANDCERT_RESOLVE_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(self.resolve_timeout_ms);

        let push_down_target_filter = std::env::var("LANDCERT_PUSH_DOWN_TARGET_FILTER")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(self.push_down_target_filter);

        Self {
            season_utc_offset_minutes,
            resolve_timeout_ms,
            push_down_target_filter,
        }
    }

    /// Timeout for one async resolution.
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Offset used when deriving seasons.
    pub fn season_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.season_utc_offset_minutes.saturating_mul(60)).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "season_utc_offset_minutes".to_string(),
                value: self.season_utc_offset_minutes.to_string(),
                reason: "offset is out of range".to_string(),
            }
        })
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - season_utc_offset_minutes within +/-14h
    /// - resolve_timeout_ms > 0
    pub fn validate(&self) -> LandCertResult<()> {
        if self.season_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(LandCertError::Config(ConfigError::InvalidValue {
                field: "season_utc_offset_minutes".to_string(),
                value: self.season_utc_offset_minutes.to_string(),
                reason: format!("must be within +/-{} minutes", MAX_UTC_OFFSET_MINUTES),
            }));
        }

        if self.resolve_timeout_ms == 0 {
            return Err(LandCertError::Config(ConfigError::InvalidValue {
                field: "resolve_timeout_ms".to_string(),
                value: self.resolve_timeout_ms.to_string(),
                reason: "resolve_timeout_ms must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }
}
