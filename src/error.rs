//! Error taxonomy for the tracing subsystem.
//!
//! None of these errors ever reaches the instrumented request. They are
//! recovered where they occur and surface only in logs and metrics.

use thiserror::Error;

/// Errors raised inside the tracer and its collaborators.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The external trace channel is not present in this environment.
    #[error("trace channel unavailable: {0}")]
    SinkUnavailable(String),

    /// An exit hook ran without a timer recorded by the matching enter hook.
    #[error("exit hook invoked without a pending timer")]
    MissingTimerState,

    /// A configuration key was unset and its default was used.
    #[error("configuration key `{key}` is not set")]
    ConfigurationMissing { key: String },

    /// Writing a line to the trace channel failed.
    #[error("trace channel write failed: {0}")]
    Io(#[from] std::io::Error),
}
