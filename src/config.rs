//! Generator settings read from `rssforge.toml`.
//!
//! Three keys are recognized: `escape_cache_capacity`, `default_language` and
//! `check_output`. Running without the file is normal and uses the built-in
//! values. A key rssforge does not know is kept out of the result and named
//! in a warning, so a misspelled `check_ouput` does not pass unnoticed.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::feed::{Escaper, DEFAULT_LANGUAGE};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Generator configuration.
///
/// Each key is optional on its own; an omitted key keeps its value from
/// [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Escape cache size. 0 = the unbounded process-wide cache.
    pub escape_cache_capacity: u64,

    /// Language for channels that do not set one.
    pub default_language: String,

    /// Re-parse the generated document before writing it.
    pub check_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            escape_cache_capacity: 0,
            default_language: DEFAULT_LANGUAGE.to_string(),
            check_output: true,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Reads generator settings from `path`.
    ///
    /// A file that does not exist, or holds no keys, gives the defaults: the
    /// process-wide escape cache, `en` as fallback language, and output
    /// checking on. Malformed TOML or a value of the wrong type is a
    /// [`ConfigError::Parse`] whose message points at the offending line.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["escape_cache_capacity", "default_language", "check_output"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            escape_cache_capacity = config.escape_cache_capacity,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// A scoped escape cache when a capacity is configured.
    ///
    /// `None` means the process-wide cache should be used.
    pub fn scoped_escaper(&self) -> Option<Escaper> {
        (self.escape_cache_capacity > 0).then(|| Escaper::with_capacity(self.escape_cache_capacity))
    }
}

// ============================================================================
// Tests
// ============================================================================
