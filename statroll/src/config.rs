//! Session configuration for the statroll archive engine.
//!
//! A [`SessionConfig`] is read once at `initialize` and is immutable for the
//! lifetime of the session. It derives serde traits so the CLI can load it
//! from a JSON file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Configuration for a sampling session.
///
/// # Limits
///
/// - `file_size_limit` triggers rotation once the active archive reaches or
///   exceeds this many bytes. It must be greater than zero.
/// - `disk_space_limit` bounds the total on-disk footprint of the session's
///   archive files. Zero means unlimited retention: no file is ever deleted.
///
/// # Examples
///
/// ```rust
/// use statroll::SessionConfig;
///
/// let config = SessionConfig {
///     archive_path: "stats.sra".into(),
///     file_size_limit: 1024 * 1024,
///     disk_space_limit: 10 * 1024 * 1024,
///     system_id: 1,
///     start_time_ms: 1_700_000_000_000,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base archive path. The naming scheme derives per-file names from its
    /// stem and extension, e.g. `stats.sra` becomes `stats-01-01.sra`.
    pub archive_path: PathBuf,
    /// Rotation threshold for a single archive file, in bytes. Must be > 0.
    pub file_size_limit: u64,
    /// Total on-disk budget for the session, in bytes. 0 = unlimited.
    pub disk_space_limit: u64,
    /// Identifier of the sampled system, embedded in each archive header.
    pub system_id: u64,
    /// System start time in milliseconds since the Unix epoch, embedded in
    /// each archive header. Not otherwise interpreted by the engine.
    pub start_time_ms: u64,
}

impl SessionConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// The loaded configuration is not validated; `initialize` validates it
    /// when the session starts.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Load`] if the file cannot be read
    /// - [`ConfigError::Parse`] if it is not valid JSON
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(config)
    }

    /// Validates the configuration limits.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroFileSizeLimit`] if `file_size_limit` is 0
    /// - [`ConfigError::EmptyArchivePath`] if `archive_path` has no file name
    pub fn validate(&self) -> Result<()> {
        if self.file_size_limit == 0 {
            return Err(ConfigError::ZeroFileSizeLimit.into());
        }

        if self.archive_path.file_name().is_none() {
            return Err(ConfigError::EmptyArchivePath {
                path: self.archive_path.display().to_string(),
            }
            .into());
        }

        Ok(())
    }
}
