//! Clock configuration
//!
//! Mirrors the card configuration a dashboard host hands over: the entity
//! to observe, the digit layout and presentation hints. Keys are camelCase
//! (`showSeconds`, `showMeridiem`) and unknown keys are ignored, so a host
//! config written for the card can be loaded as-is.
//!
//! ```rust
//! use splitflap_core::ClockConfig;
//!
//! let config = ClockConfig::from_json_str(
//!     r##"{ "entity": "sensor.time", "showSeconds": true, "colors": { "digit": "#FFAA00" } }"##,
//! ).unwrap();
//!
//! assert!(config.show_seconds);
//! assert_eq!(config.colors.digit, "#FFAA00");
//! assert_eq!(config.colors.flap, "#000000");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::format::DisplayFormat;

/// Card configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockConfig {
    /// Host state key holding the formatted time string
    #[serde(default)]
    pub entity: String,
    /// Show a third `SS` field
    #[serde(default)]
    pub show_seconds: bool,
    /// 12-hour display with an AM/PM label
    #[serde(default)]
    pub show_meridiem: bool,
    /// Presentation only, the engine never reads it
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Presentation only, the engine never reads it
    #[serde(default)]
    pub colors: Colors,
}

fn default_scale() -> f32 {
    1.0
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            entity: String::new(),
            show_seconds: false,
            show_meridiem: false,
            scale: default_scale(),
            colors: Colors::default(),
        }
    }
}

impl ClockConfig {
    /// Config observing `entity` with every other option at its default
    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            ..Self::default()
        }
    }

    pub fn with_seconds(mut self, show: bool) -> Self {
        self.show_seconds = show;
        self
    }

    pub fn with_meridiem(mut self, show: bool) -> Self {
        self.show_meridiem = show;
        self
    }

    /// Parse a JSON card config
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse a TOML card config
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Digit layout selected by `show_seconds`
    pub fn display_format(&self) -> DisplayFormat {
        if self.show_seconds {
            DisplayFormat::hh_mm_ss()
        } else {
            DisplayFormat::hh_mm()
        }
    }

    /// Whether any update can ever reach the clock
    pub fn has_entity(&self) -> bool {
        !self.entity.is_empty()
    }
}

/// Color theme, `#RRGGBB` strings
///
/// Each key falls back to its own default, so a partial `colors` map only
/// overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Colors {
    #[serde(default = "default_dot")]
    pub dot: String,
    #[serde(default = "default_meridiem")]
    pub meridiem: String,
    #[serde(default = "default_digit")]
    pub digit: String,
    #[serde(default = "default_flap")]
    pub flap: String,
}

fn default_dot() -> String {
    "#FF0000".to_string()
}

fn default_meridiem() -> String {
    "#00FF00".to_string()
}

fn default_digit() -> String {
    "#FFFFFF".to_string()
}

fn default_flap() -> String {
    "#000000".to_string()
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            dot: default_dot(),
            meridiem: default_meridiem(),
            digit: default_digit(),
            flap: default_flap(),
        }
    }
}

/// Parse a `#RRGGBB` color into its components
pub fn parse_hex_color(value: &str) -> Result<(u8, u8, u8), ConfigError> {
    let invalid = || ConfigError::InvalidColor(value.to_string());
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => Ok((r, g, b)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClockConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ClockConfig::default());
        assert!(!config.has_entity());
        assert_eq!(config.scale, 1.0);
        assert_eq!(config.display_format(), DisplayFormat::hh_mm());
    }

    #[test]
    fn test_partial_colors_merge_over_defaults() {
        let config =
            ClockConfig::from_json_str(r##"{ "colors": { "dot": "#123456" } }"##).unwrap();
        assert_eq!(config.colors.dot, "#123456");
        assert_eq!(config.colors.meridiem, "#00FF00");
        assert_eq!(config.colors.digit, "#FFFFFF");
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = ClockConfig::from_json_str(
            r#"{ "type": "custom:split-clock-card", "entity": "sensor.time", "showMeridiem": true }"#,
        )
        .unwrap();
        assert_eq!(config.entity, "sensor.time");
        assert!(config.show_meridiem);
    }

    #[test]
    fn test_toml_config() {
        let config = ClockConfig::from_toml_str(
            r##"
            entity = "sensor.time"
            showSeconds = true
            scale = 1.5

            [colors]
            flap = "#202020"
            "##,
        )
        .unwrap();
        assert_eq!(config.display_format(), DisplayFormat::hh_mm_ss());
        assert_eq!(config.scale, 1.5);
        assert_eq!(config.colors.flap, "#202020");
        assert_eq!(config.colors.digit, "#FFFFFF");
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            ClockConfig::from_json_str("{ entity: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF8000").unwrap(), (255, 128, 0));
        assert_eq!(parse_hex_color("#00ff00").unwrap(), (0, 255, 0));
        assert!(parse_hex_color("FF8000").is_err());
        assert!(parse_hex_color("#FF80").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
    }
}
