//! Error types for measurement configuration and text input.

use thiserror::Error;

/// Errors that can occur while loading a [`MeasureConfig`](crate::MeasureConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config values are out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Text did not name a known display unit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown display unit: {0:?} (expected m, cm, ft or in)")]
pub struct UnitParseError(pub String);

/// Text did not name a known measurement mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown measurement mode: {0:?} (expected distance, area, volume or angle)")]
pub struct ModeParseError(pub String);

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
