use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{pruning::PHASE2_UNKNOWN_DISTANCE, solver::SearchStrategy};

/// Environment variable naming the table directory when none is configured.
pub const TABLES_ENV_VAR: &str = "TWOPHASE_TABLES";

/// Solver settings, loadable from TOML:
///
/// ```toml
/// max_depth = 20
/// phase2_max_depth = 11
/// strategy = { target_length = 18 }
/// timeout_secs = 2.5
/// tables_dir = "/var/cache/twophase-tables"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Phase 1 is deepened up to, but not including, this many moves.
    pub max_depth: u8,
    /// Phase-2 maneuvers are shorter than this.
    pub phase2_max_depth: u8,
    pub strategy: SearchStrategy,
    pub timeout_secs: Option<f64>,
    pub tables_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Invalid solver config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("phase2_max_depth must be between 1 and 11, got {0}")]
    Phase2MaxDepth(u8),
    #[error("timeout_secs must be a non-negative number of seconds, got {0}")]
    Timeout(f64),
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 20,
            phase2_max_depth: PHASE2_UNKNOWN_DISTANCE,
            strategy: SearchStrategy::FirstSolution,
            timeout_secs: None,
            tables_dir: None,
        }
    }
}

impl SolverConfig {
    /// # Errors
    ///
    /// Fails on malformed TOML, unknown keys, or out of range values.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or [`SolverConfig::from_toml_str`]
    /// rejects it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=PHASE2_UNKNOWN_DISTANCE).contains(&self.phase2_max_depth) {
            return Err(ConfigError::Phase2MaxDepth(self.phase2_max_depth));
        }
        if let Some(secs) = self.timeout_secs
            && Duration::try_from_secs_f64(secs).is_err()
        {
            return Err(ConfigError::Timeout(secs));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs_f64());
        self
    }

    #[must_use]
    pub fn with_tables_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tables_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// The configured table directory, else `$TWOPHASE_TABLES`, else
    /// `twophase-tables` in the user's cache directory.
    #[must_use]
    pub fn resolve_tables_dir(&self) -> Option<PathBuf> {
        self.tables_dir
            .clone()
            .or_else(|| env::var_os(TABLES_ENV_VAR).map(PathBuf::from))
            .or_else(|| {
                let mut cache = dirs::cache_dir()?;
                cache.push("twophase-tables");
                Some(cache)
            })
    }
}
