//! Configuration loading for wallfeed feeds.
//!
//! Configuration is loaded from a TOML file (default: `wallfeed.toml`).
//! Every section is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Message history pages.
    #[serde(default = "default_message_pages")]
    pub messages: PageConfig,
    /// Friend list pages.
    #[serde(default)]
    pub friends: PageConfig,
    /// Friend request pages.
    #[serde(default)]
    pub requests: PageConfig,
}

/// Paging configuration for one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Items requested per page (default: 20). A shorter page means
    /// end-of-data.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

// Default value functions
fn default_page_size() -> usize {
    20
}

fn default_message_page_size() -> usize {
    30
}

fn default_message_pages() -> PageConfig {
    PageConfig {
        page_size: default_message_page_size(),
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            messages: default_message_pages(),
            friends: PageConfig::default(),
            requests: PageConfig::default(),
        }
    }
}

impl FeedConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (section, page) in [
            ("messages", &self.messages),
            ("friends", &self.friends),
            ("requests", &self.requests),
        ] {
            if page.page_size == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{section}.page_size must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
