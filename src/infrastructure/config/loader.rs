use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid category weights: sum is {0}, expected 1.0")]
    InvalidWeightSum(f64),

    #[error("Invalid category weight for {0}: weights must be finite and non-negative")]
    NegativeWeight(String),

    #[error("Invalid max_iterations: {0}. Must be at least 1")]
    InvalidMaxIterations(u32),

    #[error("Invalid target_score: {0}. Must be between 1 and 100")]
    InvalidTargetScore(f64),

    #[error("Invalid no_improvement_epsilon: {0}. Must be finite and non-negative")]
    InvalidEpsilon(f64),

    #[error("Invalid call_timeout_secs: 0. Must be positive")]
    InvalidCallTimeout,

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("History directory cannot be empty")]
    EmptyHistoryDir,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .seo-refinery/config.yaml (project config)
    /// 3. .seo-refinery/local.yaml (project local overrides, optional)
    /// 4. Environment variables (SEO_REFINERY_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override values from the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("SEO_REFINERY_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            // 1. Start with programmatic defaults
            .merge(Serialized::defaults(Config::default()))
            // 2. Merge project config
            .merge(Yaml::file(".seo-refinery/config.yaml"))
            // 3. Merge project local overrides
            .merge(Yaml::file(".seo-refinery/local.yaml"))
            // 4. Merge environment variables (highest priority)
            .merge(Env::prefixed("SEO_REFINERY_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        // Validate category weights
        let weights = &config.scoring.weights;
        for category in crate::domain::models::Category::ALL {
            let weight = weights.weight(category);
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::NegativeWeight(category.as_str().to_string()));
            }
        }
        if !weights.is_valid() {
            return Err(ConfigError::InvalidWeightSum(weights.sum()));
        }

        // Validate optimization config
        let optimization = &config.optimization;
        if optimization.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(optimization.max_iterations));
        }

        if !optimization.target_score.is_finite()
            || !(1.0..=100.0).contains(&optimization.target_score)
        {
            return Err(ConfigError::InvalidTargetScore(optimization.target_score));
        }

        if !optimization.no_improvement_epsilon.is_finite()
            || optimization.no_improvement_epsilon < 0.0
        {
            return Err(ConfigError::InvalidEpsilon(
                optimization.no_improvement_epsilon,
            ));
        }

        // Validate retry config
        if config.retry.call_timeout_secs == 0 {
            return Err(ConfigError::InvalidCallTimeout);
        }

        if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        // Validate logging config
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        // Validate history config
        if config.history.dir.trim().is_empty() {
            return Err(ConfigError::EmptyHistoryDir);
        }

        Ok(())
    }
}
