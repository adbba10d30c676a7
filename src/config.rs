//! Tunable simulation settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::game::SpawnRates;

/// Ticks resolved per frame, always within `[Speed::MIN, Speed::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Speed(u8);

impl Speed {
    /// Slowest setting: one tick per frame.
    pub const MIN: Speed = Speed(1);
    /// Fastest setting.
    pub const MAX: Speed = Speed(10);

    /// Validate a raw multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSpeed`] outside `[1, 10]`.
    pub fn new(ticks: u8) -> ConfigResult<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&ticks) {
            Ok(Self(ticks))
        } else {
            Err(ConfigError::InvalidSpeed(ticks))
        }
    }

    /// Ticks per frame.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// One step faster, clamped at [`Speed::MAX`].
    #[must_use]
    pub const fn faster(self) -> Self {
        if self.0 < Self::MAX.0 { Self(self.0 + 1) } else { self }
    }

    /// One step slower, clamped at [`Speed::MIN`].
    #[must_use]
    pub const fn slower(self) -> Self {
        if self.0 > Self::MIN.0 { Self(self.0 - 1) } else { self }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::MIN
    }
}

impl TryFrom<u8> for Speed {
    type Error = ConfigError;

    fn try_from(ticks: u8) -> ConfigResult<Self> {
        Self::new(ticks)
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

/// Simulation settings.
///
/// `Default` is the canonical game. Missing fields in a config file fall
/// back to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Chance per frame that an obstacle spawns.
    pub obstacle_spawn_chance: f64,
    /// Chance per frame that a power-up spawns.
    pub powerup_spawn_chance: f64,
    /// Tick multiplier.
    pub speed: Speed,
    /// RNG seed; `None` picks one from the clock.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let rates = SpawnRates::default();
        Self {
            obstacle_spawn_chance: rates.obstacle,
            powerup_spawn_chance: rates.powerup,
            speed: Speed::default(),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Load settings from a JSON file and validate them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON for
    /// this struct, or holds out-of-range values.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every setting is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidChance`] for a spawn chance outside
    /// `[0, 1]` or not finite.
    pub fn validate(&self) -> ConfigResult<()> {
        check_chance("obstacle_spawn_chance", self.obstacle_spawn_chance)?;
        check_chance("powerup_spawn_chance", self.powerup_spawn_chance)?;
        Ok(())
    }

    /// Spawn chances in the form the world uses.
    #[must_use]
    pub const fn rates(&self) -> SpawnRates {
        SpawnRates {
            obstacle: self.obstacle_spawn_chance,
            powerup: self.powerup_spawn_chance,
        }
    }
}

fn check_chance(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidChance { field, value })
    }
}
