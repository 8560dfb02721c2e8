//! Error types for the split-flap engine

use thiserror::Error;

/// Reasons a raw time-source value could not be turned into digits
///
/// A decode error never reaches the user: the tick that produced it is
/// skipped and the previous display stays up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Value does not have the `HH:MM` or `HH:MM:SS` shape
    #[error("malformed time value: {0:?}")]
    Malformed(String),

    /// Format shows seconds but the value carries none
    #[error("time value has no seconds field but the display shows seconds")]
    MissingSeconds,
}

/// Clock construction and invariant errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    /// Display format cannot be produced by the decoder
    #[error("unsupported display format: {0}")]
    UnsupportedFormat(String),

    /// Decoded digit count disagrees with the number of built slots
    #[error("decoded {actual} digits but the clock has {expected} slots")]
    DigitCountMismatch { expected: usize, actual: usize },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// JSON config could not be parsed
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML config could not be parsed
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Color value is not a `#RRGGBB` hex string
    #[error("invalid color {0:?}, expected #RRGGBB")]
    InvalidColor(String),
}

/// Result type for clock operations
pub type Result<T> = std::result::Result<T, ClockError>;
