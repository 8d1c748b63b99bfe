//! Session configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! adopted_name_prefix = "Design from "
//! bootstrap_name_prefix = "New Design #"
//! timestamp_format = "%-I:%M:%S %p"
//! route_prefix = "/"
//! ```

use crate::error::ConfigError;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default prefix for projects adopted from anonymous work
pub const DEFAULT_ADOPTED_PREFIX: &str = "Design from ";

/// Default prefix for freshly bootstrapped projects
pub const DEFAULT_BOOTSTRAP_PREFIX: &str = "New Design #";

/// Default human-readable timestamp (local time of day)
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-I:%M:%S %p";

/// Whether `format` is a non-empty strftime format chrono can render
pub(crate) fn is_valid_timestamp_format(format: &str) -> bool {
    !format.is_empty() && !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

/// Reconciler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Name prefix for adopted projects, followed by a timestamp
    pub adopted_name_prefix: String,
    /// Name prefix for bootstrapped projects, followed by a number
    pub bootstrap_name_prefix: String,
    /// strftime format for the adopted-project timestamp
    pub timestamp_format: String,
    /// Path prefix of project routes
    pub route_prefix: String,
}

impl SessionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML or unknown keys,
    /// `ConfigError::Invalid` if a value fails [`validate`](Self::validate).
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as [`from_toml`](Self::from_toml).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check values are usable
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.adopted_name_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("adopted_name_prefix is empty".to_string()));
        }
        if self.bootstrap_name_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("bootstrap_name_prefix is empty".to_string()));
        }
        if !is_valid_timestamp_format(&self.timestamp_format) {
            return Err(ConfigError::Invalid(format!(
                "timestamp_format {:?} is not a valid strftime format",
                self.timestamp_format
            )));
        }
        if !self.route_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "route_prefix {:?} must start with '/'",
                self.route_prefix
            )));
        }
        Ok(())
    }

    /// With adopted-project name prefix
    #[inline]
    #[must_use]
    pub fn with_adopted_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.adopted_name_prefix = prefix.into();
        self
    }

    /// With bootstrapped-project name prefix
    #[inline]
    #[must_use]
    pub fn with_bootstrap_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bootstrap_name_prefix = prefix.into();
        self
    }

    /// With timestamp format
    #[inline]
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// With route prefix
    #[inline]
    #[must_use]
    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = prefix.into();
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            adopted_name_prefix: DEFAULT_ADOPTED_PREFIX.to_string(),
            bootstrap_name_prefix: DEFAULT_BOOTSTRAP_PREFIX.to_string(),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            route_prefix: "/".to_string(),
        }
    }
}
