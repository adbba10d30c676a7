//! CLI command implementations for Mayhem.

pub(crate) mod batch;
pub(crate) mod run;
pub(crate) mod watch;

mod output;

use clap::ValueEnum;
use mayhem::{ConfigError, SimConfig, Speed};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Final board and scoreboard.
    Text,
    /// Machine-readable JSON summary.
    Json,
}

/// Output format for the `batch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

/// Build the effective config: file (or defaults), then flag overrides.
///
/// Returns the config and the seed to run with.
pub(crate) fn load_config(
    path: Option<&Path>,
    seed: Option<u64>,
    speed: Option<u8>,
) -> Result<(SimConfig, u64), CliError> {
    let mut config = match path {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(speed) = speed {
        config.speed = Speed::new(speed)?;
    }
    config.validate()?;
    let seed = seed.or(config.seed).unwrap_or_else(clock_seed);
    config.seed = Some(seed);
    Ok((config, seed))
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
        .unwrap_or(42)
}
