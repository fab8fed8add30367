//! Run configuration.
//!
//! Values come from, lowest to highest precedence:
//! 1. Defaults
//! 2. A YAML file
//! 3. Environment variables with the `QDIMER_` prefix
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::histogram::BitOrder;
use crate::runner::MAX_SHOTS_PER_CALL;
use crate::weights::{EvolutionConfig, NormVariant};

/// Everything needed to run one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Time discretization.
    pub evolution: EvolutionConfig,
    /// Which bias enters the site-A norm.
    pub norm_variant: NormVariant,
    /// Column order of the outcome buckets.
    pub bit_order: BitOrder,
    /// Upper bound on shots per submitted job.
    pub max_shots_per_call: u32,
    /// Results file settings.
    pub output: OutputConfig,
    /// Shot counts per epoch.
    pub sweep: SweepConfig,
    /// Leave out the time-evolution gates.
    pub setup_only: bool,
    /// Use the noise parameter set.
    pub noise: bool,
    /// Use the decoherence parameter set.
    pub decoherence: bool,
    /// Seed for the local simulator.
    pub seed: Option<u64>,
    /// First line of this file is the remote access token.
    pub token_file: PathBuf,
}

/// Results file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// CSV path, appended to.
    #[serde(default = "default_filename")]
    pub filename: PathBuf,
}

/// Shots per epoch.
///
/// Without `delta` a single epoch of `count` shots runs. With `delta`,
/// epochs `start..=end` run `epoch * delta` shots each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Shots per state when no sweep is given.
    #[serde(default = "default_count")]
    pub count: u64,
    /// Shot increment per epoch.
    #[serde(default)]
    pub delta: Option<u64>,
    /// First epoch.
    #[serde(default = "default_epoch")]
    pub start: u64,
    /// Last epoch, inclusive.
    #[serde(default = "default_epoch")]
    pub end: u64,
}

fn default_filename() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_token_file() -> PathBuf {
    PathBuf::from("APItoken.txt")
}

fn default_count() -> u64 {
    1024
}

fn default_epoch() -> u64 {
    1
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            delta: None,
            start: default_epoch(),
            end: default_epoch(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            evolution: EvolutionConfig::default(),
            norm_variant: NormVariant::default(),
            bit_order: BitOrder::default(),
            max_shots_per_call: MAX_SHOTS_PER_CALL,
            output: OutputConfig::default(),
            sweep: SweepConfig::default(),
            setup_only: false,
            noise: false,
            decoherence: false,
            seed: None,
            token_file: default_token_file(),
        }
    }
}

impl SweepConfig {
    /// Shots for each epoch, in order.
    ///
    /// Fails when `epoch * delta` does not fit in a `u64` for some epoch.
    pub fn shot_plan(&self) -> Result<Vec<u64>, ConfigError> {
        let Some(delta) = self.delta else {
            return Ok(vec![self.count]);
        };
        (self.start..=self.end)
            .map(|epoch| {
                epoch.checked_mul(delta).ok_or_else(|| {
                    ConfigError::Validation(format!(
                        "epoch {epoch} times delta {delta} overflows the shot count"
                    ))
                })
            })
            .collect()
    }
}

impl RunConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.as_ref().display())))?;
        serde_yaml_ng::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Defaults, then the optional file, then the process environment.
    ///
    /// The result is not validated; callers apply their own overrides first
    /// and then call [`RunConfig::validate`].
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.merge_env(|key| std::env::var(key).ok())
    }

    /// Apply `QDIMER_*` overrides read through `lookup`.
    ///
    /// Only variables that are set override the current values.
    pub fn merge_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("QDIMER_FILENAME") {
            self.output.filename = PathBuf::from(v);
        }
        if let Some(v) = lookup("QDIMER_TOKEN_FILE") {
            self.token_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("QDIMER_MAX_SHOTS_PER_CALL") {
            self.max_shots_per_call = parse_env("QDIMER_MAX_SHOTS_PER_CALL", &v)?;
        }
        if let Some(v) = lookup("QDIMER_SEED") {
            self.seed = Some(parse_env("QDIMER_SEED", &v)?);
        }
        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_shots_per_call == 0 {
            return Err(ConfigError::Validation(
                "max_shots_per_call must be greater than 0".to_string(),
            ));
        }
        if self.evolution.time_chunks == 0 {
            return Err(ConfigError::Validation(
                "time_chunks must be greater than 0".to_string(),
            ));
        }
        if !self.evolution.time_interval.is_finite() || self.evolution.time_interval <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "time_interval must be finite and positive, got {}",
                self.evolution.time_interval
            )));
        }
        if self.sweep.start > self.sweep.end {
            return Err(ConfigError::Validation(format!(
                "sweep start {} is after end {}",
                self.sweep.start, self.sweep.end
            )));
        }
        if self.sweep.delta == Some(0) {
            return Err(ConfigError::Validation(
                "delta must be greater than 0".to_string(),
            ));
        }
        if let Some(delta) = self.sweep.delta {
            if self.sweep.end.checked_mul(delta).is_none() {
                return Err(ConfigError::Validation(format!(
                    "sweep end {} times delta {delta} overflows the shot count",
                    self.sweep.end
                )));
            }
        }
        if self.sweep.delta.is_none() && self.sweep.count == 0 {
            return Err(ConfigError::Validation(
                "count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Parse(format!("{key}: cannot parse '{value}'")))
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(String),

    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}
