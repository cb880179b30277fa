//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, known log levels)
//!
//! Returns all validation errors, not just the first.

use thiserror::Error;

use crate::config::schema::ConnectorConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("http.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("http.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ConnectorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.http.user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    }
    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
