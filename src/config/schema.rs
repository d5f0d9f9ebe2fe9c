//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a traced service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a traced service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TracerConfig {
    /// Service identity.
    pub application: ApplicationConfig,

    /// Request tracing rules.
    pub tracing: TracingConfig,

    /// External trace channel selection.
    pub sink: SinkConfig,

    /// Listener configuration for the host binary.
    pub listener: ListenerConfig,

    /// Timeout configuration for the host binary.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Logical service name (e.g. "ts-order-service").
    pub name: Option<String>,
}

/// Which paths are traced and how requests are keyed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Path patterns the tracer applies to.
    pub include: Vec<String>,

    /// Path patterns never traced, checked after `include`.
    pub exclude: Vec<String>,

    /// How the correlation key of each request is produced.
    pub context_key: ContextKeyStrategy,
}

/// Paths excluded by default: health checks, API docs and static assets.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "/actuator/**",
    "/health/**",
    "/swagger-ui.html",
    "/swagger-ui/**",
    "/v2/api-docs",
    "/v3/api-docs/**",
    "/swagger-resources/**",
    "/webjars/**",
];

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            include: vec!["/**".to_string()],
            exclude: DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect(),
            context_key: ContextKeyStrategy::default(),
        }
    }
}

/// Correlation key strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextKeyStrategy {
    /// Process-local monotonically increasing sequence.
    #[default]
    Sequence,
    /// Incoming `x-request-id` header, or a fresh UUID v4.
    RequestId,
}

/// Trace channel selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Channel kind.
    pub kind: SinkKind,

    /// Candidate ftrace marker files, tried in order.
    pub trace_marker_paths: Vec<String>,

    /// Logger name attached to every line by the log channel.
    pub logger_name: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::default(),
            trace_marker_paths: vec![
                "/sys/kernel/tracing/trace_marker".to_string(),
                "/sys/kernel/debug/tracing/trace_marker".to_string(),
            ],
            logger_name: "request_trace".to_string(),
        }
    }
}

/// Kinds of trace channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Kernel ftrace marker file.
    #[default]
    TraceMarker,
    /// `tracing` events on a dedicated target.
    Log,
    /// Tracing disabled.
    None,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_trace_everything_but_operational_paths() {
        let config = TracerConfig::default();
        assert_eq!(config.tracing.include, vec!["/**"]);
        assert!(config.tracing.exclude.iter().any(|p| p == "/actuator/**"));
        assert!(config.tracing.exclude.iter().any(|p| p == "/webjars/**"));
        assert_eq!(config.sink.kind, SinkKind::TraceMarker);
        assert!(config.application.name.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: TracerConfig = toml::from_str(
            r#"
            [application]
            name = "ts-order-service"

            [sink]
            kind = "log"

            [tracing]
            context_key = "request_id"
            "#,
        )
        .unwrap();

        assert_eq!(config.application.name.as_deref(), Some("ts-order-service"));
        assert_eq!(config.sink.kind, SinkKind::Log);
        assert_eq!(config.sink.logger_name, "request_trace");
        assert_eq!(config.tracing.context_key, ContextKeyStrategy::RequestId);
        assert_eq!(config.tracing.include, vec!["/**"]);
        assert_eq!(config.timeouts.request_secs, 30);
    }
}
