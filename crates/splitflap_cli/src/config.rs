//! Clock configuration file handling
//!
//! Card configs are read from TOML or JSON, picked by file extension.
//! Command-line flags are layered on top.

use anyhow::{Context, Result};
use splitflap_core::ClockConfig;
use std::fs;
use std::path::Path;

/// Load a card config from `path`
pub fn load(path: &Path) -> Result<ClockConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => ClockConfig::from_json_str(&content),
        _ => ClockConfig::from_toml_str(&content),
    }
    .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(config)
}

/// Command-line overrides for a loaded config
#[derive(Debug, Default)]
pub struct Overrides {
    pub entity: Option<String>,
    pub show_seconds: Option<bool>,
    pub show_meridiem: Option<bool>,
}

impl Overrides {
    /// Flags that were given replace the config value, either way
    pub fn apply(self, mut config: ClockConfig) -> ClockConfig {
        if let Some(entity) = self.entity {
            config.entity = entity;
        }
        if let Some(show) = self.show_seconds {
            config.show_seconds = show;
        }
        if let Some(show) = self.show_meridiem {
            config.show_meridiem = show;
        }
        config
    }
}
