// Configuration for the presenter core
// Loaded from TOML, every section optional

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use waypoint_error::{ConfigError, ConfigResult};

/// What `link()` does with a link it failed to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidLinkMode {
    /// Substitute a `#` placeholder
    Silent,
    /// Log a warning and substitute an error marker
    Warning,
    /// Hand the error back to the caller
    Exception,
}

impl InvalidLinkMode {
    /// Mode used when none is configured explicitly
    pub fn for_debug_mode(debug_mode: bool) -> Self {
        if debug_mode {
            InvalidLinkMode::Warning
        } else {
            InvalidLinkMode::Silent
        }
    }
}

/// Application section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Debug mode; also selects the default invalid link mode
    pub debug_mode: bool,

    /// Explicit invalid link mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_link_mode: Option<InvalidLinkMode>,

    /// Base URL generated links are relative to
    pub base_url: String,

    /// Log level directive handed to the tracing subscriber
    pub log_level: String,

    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            invalid_link_mode: None,
            base_url: "/".to_string(),
            log_level: crate::tracing::DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointConfig {
    pub application: ApplicationConfig,

    /// Module name (or `*`) to presenter class mask
    pub mapping: BTreeMap<String, String>,
}

impl WaypointConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: WaypointConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        debug!(path = %path.as_ref().display(), "loading configuration");
        let source = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Invalid link mode in effect, explicit or derived from debug mode
    pub fn invalid_link_mode(&self) -> InvalidLinkMode {
        self.application
            .invalid_link_mode
            .unwrap_or_else(|| InvalidLinkMode::for_debug_mode(self.application.debug_mode))
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.application.base_url.is_empty() {
            return Err(ConfigError::InvalidValue("application.base_url must not be empty".to_string()));
        }
        if crate::tracing::log_filter(&self.application.log_level).is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "invalid application.log_level '{}'",
                self.application.log_level
            )));
        }
        if let Some(module) = self.mapping.keys().find(|module| module.is_empty()) {
            return Err(ConfigError::InvalidValue(format!("invalid mapping module '{}'", module)));
        }
        Ok(())
    }
}
