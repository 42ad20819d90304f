//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AssemblyConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use crate::config::schema::AssemblyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check value ranges the type system cannot express.
pub fn validate_config(config: &AssemblyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.close_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "close_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.log_filter.trim().is_empty() {
        errors.push(ValidationError {
            field: "log_filter",
            message: "must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
