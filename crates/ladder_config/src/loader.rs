//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::LadderConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "ladder.toml";

/// Loads and validates `ladder.toml` from a project directory.
///
/// Returns the default configuration if the directory has no `ladder.toml`.
pub fn load_config(project_dir: &Path) -> Result<LadderConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(LadderConfig::default());
    }
    load_config_file(&config_path)
}

/// Loads and validates a configuration from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<LadderConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<LadderConfig, ConfigError> {
    let config: LadderConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Rejects parameter combinations the bench cannot run.
pub fn validate_config(config: &LadderConfig) -> Result<(), ConfigError> {
    let design = &config.design;
    if design.contexts == 0 {
        return Err(invalid("design.contexts must be at least 1"));
    }
    if design.entries == 0 {
        return Err(invalid("design.entries must be at least 1"));
    }
    if design.update_pipe_delay == 0 {
        return Err(invalid("design.update_pipe_delay must be at least 1"));
    }
    if design.query_pipe_delay == 0 {
        return Err(invalid("design.query_pipe_delay must be at least 1"));
    }
    if config.bench.half_period == 0 {
        return Err(invalid("bench.half_period must be at least 1"));
    }
    Ok(())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::ValidationError(msg.to_string())
}
