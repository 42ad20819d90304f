//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AssemblyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Why an assembly configuration could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read assembly config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed assembly config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Every semantic problem found, in field order.
    #[error("invalid assembly config: {}", join_problems(.0))]
    Validation(Vec<ValidationError>),
}

fn join_problems(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AssemblyConfig, ConfigError> {
    let config: AssemblyConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AssemblyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
