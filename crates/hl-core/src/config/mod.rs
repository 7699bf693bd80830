//! Configuration management
//!
//! Provides a strongly-typed configuration system with TOML support.
//! Every section is optional in the file; missing keys take their defaults.

use crate::error::{Error, Result};
use crate::policy::{defaults, PolicyList, PolicySnapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General application settings
    pub general: GeneralConfig,

    /// Policy list storage and defaults
    pub policy: PolicyConfig,

    /// Pipeline scheduling
    pub pipeline: PipelineConfig,

    /// Transformation markup
    pub transform: TransformConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::from)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.debounce_ms == 0 {
            return Err(Error::config_value(
                "pipeline.debounce_ms",
                "Must be greater than zero",
            ));
        }

        if self.pipeline.debounce_ms > 60_000 {
            return Err(Error::config_value(
                "pipeline.debounce_ms",
                "Must be at most 60000",
            ));
        }

        for (key, value) in [
            ("transform.processed_class", &self.transform.processed_class),
            ("transform.bold_class", &self.transform.bold_class),
            ("transform.style_id", &self.transform.style_id),
        ] {
            if !is_css_identifier(value) {
                return Err(Error::config_value(key, format!("'{value}' is not a valid CSS identifier")));
            }
        }

        if self.transform.processed_class == self.transform.bold_class {
            return Err(Error::config_value(
                "transform.bold_class",
                "Must differ from transform.processed_class",
            ));
        }

        let defaults = self.policy.default_snapshot();
        let overlap = defaults.conflicts();
        if !overlap.is_empty() {
            return Err(Error::config_value(
                "policy.default_allowlist",
                format!("Entries also present in default_blocklist: {}", overlap.join(", ")),
            ));
        }

        Ok(())
    }
}

fn is_css_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Profile name
    pub name: String,
    /// Configuration version
    pub version: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            version: "1.0".to_string(),
        }
    }
}

/// Policy list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// JSON file holding the persisted lists (None = platform default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<String>,
    /// Allowlist used when storage holds none
    pub default_allowlist: Vec<String>,
    /// Blocklist used when storage holds none
    pub default_blocklist: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            default_allowlist: defaults::default_allowlist(),
            default_blocklist: defaults::default_blocklist(),
        }
    }
}

impl PolicyConfig {
    /// Default lists as a snapshot
    pub fn default_snapshot(&self) -> PolicySnapshot {
        PolicySnapshot::new(
            PolicyList::normalize(&self.default_allowlist),
            PolicyList::normalize(&self.default_blocklist),
        )
    }
}

/// Pipeline scheduling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delay before a mutation-triggered pass runs (bursts coalesce)
    pub debounce_ms: u64,
    /// Minimum time between two passes
    pub min_interval_ms: u64,
    /// Enable the pipeline as soon as a page is loaded
    pub enable_on_load: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            min_interval_ms: 500,
            enable_on_load: true,
        }
    }
}

/// Markup used for transformed text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Class marking a processed region
    pub processed_class: String,
    /// Class of the bolded word head
    pub bold_class: String,
    /// Id of the injected style element
    pub style_id: String,
    /// Tags skipped in addition to the built-in opaque set
    pub extra_skip_tags: Vec<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            processed_class: "hl-processed".to_string(),
            bold_class: "hl-bold".to_string(),
            style_id: "hl-first-letters-style".to_string(),
            extra_skip_tags: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log file path (None = stderr only)
    pub file: Option<String>,
    /// Enable JSON format logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json_format: false,
        }
    }
}
