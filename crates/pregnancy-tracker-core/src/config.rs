//! Environment-driven configuration.

use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Database path variable.
pub const DB_PATH_VAR: &str = "PREGNANCY_TRACKER_DB";

/// Log filter variable (tracing `EnvFilter` syntax).
pub const LOG_FILTER_VAR: &str = "PREGNANCY_TRACKER_LOG";

pub const DEFAULT_DB_PATH: &str = "pregnancy_tracker.db";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub database_path: PathBuf,
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// The log filter alone, for installing logging before the rest of the
    /// config is resolved.
    pub fn log_filter_from_env() -> String {
        Self::log_filter_from_lookup(|key| env::var(key).ok())
    }

    pub fn log_filter_from_lookup<F>(lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(LOG_FILTER_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_path = get(DB_PATH_VAR).map(PathBuf::from).unwrap_or_else(|| {
            warn!("{} not set, using {}", DB_PATH_VAR, DEFAULT_DB_PATH);
            PathBuf::from(DEFAULT_DB_PATH)
        });

        let log_filter = Self::log_filter_from_lookup(&lookup);

        Self {
            database_path,
            log_filter,
        }
    }
}
