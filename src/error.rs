//! Error types for simulation setup.
//!
//! The simulation itself never fails: trapped agents, full boards and
//! similar conditions are ordinary outcomes. Only configuration can be
//! rejected, and it is rejected before a world is built.

use std::fmt;
use std::path::PathBuf;

/// Invalid simulation configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A spawn probability was outside `[0, 1]` or not finite.
    InvalidChance {
        /// Which setting was rejected.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// Speed multiplier outside `[1, 10]`.
    InvalidSpeed(u8),
    /// Grid with a zero dimension.
    EmptyGrid {
        /// Requested width.
        width: u16,
        /// Requested height.
        height: u16,
    },
    /// Config file could not be read.
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Config file was not valid JSON for a [`SimConfig`](crate::SimConfig).
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChance { field, value } => {
                write!(f, "{field} must be a probability in [0, 1], got {value}")
            }
            Self::InvalidSpeed(speed) => {
                write!(f, "speed multiplier must be in [1, 10], got {speed}")
            }
            Self::EmptyGrid { width, height } => {
                write!(f, "grid must be non-empty, got {width}x{height}")
            }
            Self::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for configuration and setup.
pub type ConfigResult<T> = Result<T, ConfigError>;
