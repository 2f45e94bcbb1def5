//! Configuration file loading.
//!
//! Settings come from three layers: built-in defaults, an optional
//! `kibitz.toml`, and command-line flags. This module owns the first two;
//! flag overrides are applied in `main`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use kibitz_analysis::{AnalysisOptions, Thresholds};

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A setting is outside the range the analysis stage can act on.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Engine process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Path to the UCI engine executable.
    pub path: String,
    /// Search threads.
    pub threads: u32,
    /// Hash table size in megabytes.
    pub hash_mb: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: "stockfish".to_string(),
            threads: 4,
            hash_mb: 256,
        }
    }
}

/// Full configuration: engine process, analysis options, and
/// classification thresholds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub analysis: AnalysisOptions,
    pub thresholds: Thresholds,
}

impl Config {
    /// File consulted when no `--config` flag is given.
    pub const DEFAULT_PATH: &'static str = "kibitz.toml";

    /// Loads configuration from the given TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Checks the merged settings before analysis starts.
    ///
    /// The time budget feeds `Duration::from_secs_f64`, which panics on
    /// negative or non-finite input, so those values are rejected here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let seconds = self.analysis.seconds_per_ply;
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "seconds_per_ply must be a positive number, got {}",
                seconds
            )));
        }
        Ok(())
    }

    /// Loads the given file, or `kibitz.toml` when present, or defaults.
    ///
    /// An explicitly named file that fails to load is an error; a missing
    /// default file is not.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(Self::DEFAULT_PATH);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.path, "stockfish");
        assert_eq!(config.engine.threads, 4);
        assert_eq!(config.engine.hash_mb, 256);
        assert_eq!(config.analysis.ignore_first_n_plies, 16);
        assert_eq!(config.analysis.multipv, 3);
        assert_eq!(config.analysis.seconds_per_ply, 60.0);
        assert_eq!(config.thresholds.error, 0.75);
        assert_eq!(config.thresholds.first_choice, 1.5);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let toml = r#"
            [engine]
            path = "/opt/stockfish/stockfish"

            [analysis]
            multipv = 5
        "#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.engine.path, "/opt/stockfish/stockfish");
        assert_eq!(config.engine.threads, 4);
        assert_eq!(config.analysis.multipv, 5);
        assert_eq!(config.analysis.seconds_per_ply, 60.0);
        assert_eq!(config.thresholds.error, 0.75);
    }

    #[test]
    fn test_thresholds_section() {
        let toml = r#"
            [thresholds]
            error = 0.5
            first_choice = 2.0
        "#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.thresholds.error, 0.5);
        assert_eq!(config.thresholds.first_choice, 2.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\nthreads = 8").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.engine.threads, 8);
    }

    #[test]
    fn test_load_missing_explicit_file_is_an_error() {
        let result = Config::load_or_default(Some(Path::new("/nonexistent/kibitz.toml")));
        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_time_budget() {
        let mut config = Config::default();
        config.analysis.seconds_per_ply = -5.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.analysis.seconds_per_ply = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_non_finite_time_budget() {
        let mut config = Config::default();
        config.analysis.seconds_per_ply = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.analysis.seconds_per_ply = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml [").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
