//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate path patterns before they reach the registrar
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TracerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::{SinkKind, TracerConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("tracing.include must contain at least one pattern")]
    EmptyInclude,

    #[error("path pattern `{0}` must start with '/'")]
    RelativePattern(String),

    #[error("sink.trace_marker_paths must not be empty when sink.kind = \"trace_marker\"")]
    NoTraceMarkerPaths,

    #[error("sink.logger_name must not be empty when sink.kind = \"log\"")]
    EmptyLoggerName,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("application.name must not be blank when set")]
    BlankServiceName,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &TracerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.tracing.include.is_empty() {
        errors.push(ValidationError::EmptyInclude);
    }

    for pattern in config.tracing.include.iter().chain(&config.tracing.exclude) {
        if !pattern.starts_with('/') {
            errors.push(ValidationError::RelativePattern(pattern.clone()));
        }
    }

    match config.sink.kind {
        SinkKind::TraceMarker if config.sink.trace_marker_paths.is_empty() => {
            errors.push(ValidationError::NoTraceMarkerPaths);
        }
        SinkKind::Log if config.sink.logger_name.is_empty() => {
            errors.push(ValidationError::EmptyLoggerName);
        }
        _ => {}
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if matches!(&config.application.name, Some(name) if name.trim().is_empty()) {
        errors.push(ValidationError::BlankServiceName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&TracerConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TracerConfig::default();
        config.tracing.include.clear();
        config.tracing.exclude.push("health".to_string());
        config.timeouts.request_secs = 0;
        config.application.name = Some("  ".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyInclude,
                ValidationError::RelativePattern("health".to_string()),
                ValidationError::ZeroRequestTimeout,
                ValidationError::BlankServiceName,
            ]
        );
    }

    #[test]
    fn test_sink_specific_checks() {
        let mut config = TracerConfig::default();
        config.sink.trace_marker_paths.clear();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::NoTraceMarkerPaths])
        );

        config.sink.kind = SinkKind::None;
        assert_eq!(validate_config(&config), Ok(()));
    }
}
