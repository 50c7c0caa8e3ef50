//! Configuration loading and validation.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::{QuerentConfig, GENERATION_MODES};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Load full Querent configuration from YAML file.
pub fn load_config(path: &Path) -> Result<QuerentConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: QuerentConfig = serde_yaml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields the default config.
pub fn load_config_or_default(path: &Path) -> Result<QuerentConfig, ConfigError> {
    if !path.exists() {
        return Ok(QuerentConfig::default());
    }
    load_config(path)
}

pub fn validate_config(config: &QuerentConfig) -> Result<(), ConfigError> {
    if config.version == 0 {
        return Err(ConfigError::Invalid(
            "version must be greater than 0".to_string(),
        ));
    }

    if config.app.name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "app.name must not be empty".to_string(),
        ));
    }

    if config.tools.weather.unit.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "tools.weather.unit must not be empty".to_string(),
        ));
    }

    if config.tools.currency.rates.is_empty() {
        return Err(ConfigError::Invalid(
            "tools.currency.rates must not be empty".to_string(),
        ));
    }

    for (code, rate) in &config.tools.currency.rates {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid(format!(
                "tools.currency.rates key '{}' must be a 3-letter code",
                code
            )));
        }
        if !rate.is_finite() || *rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tools.currency.rates[{}] must be > 0",
                code
            )));
        }
    }

    if config.tools.currency.live.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "tools.currency.live.timeout_secs must be > 0".to_string(),
        ));
    }

    if !GENERATION_MODES.contains(&config.generation.mode.as_str()) {
        return Err(ConfigError::Invalid(format!(
            "generation.mode '{}' must be one of: {}",
            config.generation.mode,
            GENERATION_MODES.join(", ")
        )));
    }

    if config.generation.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "generation.timeout_secs must be > 0".to_string(),
        ));
    }

    Ok(())
}
