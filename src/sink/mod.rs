//! Trace sink adapter.
//!
//! # Data Flow
//! ```text
//! startup:  SinkConfig → probe channel once → TraceSink (present | absent)
//! request:  RequestTracer → TraceSink::emit(line) → TraceChannel::try_send
//! ```
//!
//! # Design Decisions
//! - The channel is probed once; absence is stored as a sentinel, never retried
//! - `emit` never fails outward: errors are logged and counted
//! - No buffering, no retry; lines leave in call order

pub mod channel;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{SinkConfig, SinkKind};
use crate::error::TraceError;
use crate::observability::metrics;

pub use channel::{LogChannel, MemoryChannel, TraceChannel, TraceMarkerChannel};

/// Best-effort handle to the external trace channel. Cheap to clone.
#[derive(Clone)]
pub struct TraceSink {
    channel: Option<Arc<dyn TraceChannel>>,
    failure_logged: Arc<AtomicBool>,
}

impl TraceSink {
    /// Wrap a channel that is known to be present.
    pub fn new(channel: impl TraceChannel + 'static) -> Self {
        Self {
            channel: Some(Arc::new(channel)),
            failure_logged: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A sink with no channel: every emit is a no-op.
    pub fn absent() -> Self {
        Self {
            channel: None,
            failure_logged: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Try to acquire a channel once; fall back to an absent sink on failure.
    pub fn probe<C, F>(open: F) -> Self
    where
        C: TraceChannel + 'static,
        F: FnOnce() -> Result<C, TraceError>,
    {
        match open() {
            Ok(channel) => {
                tracing::info!(channel = channel.name(), "Trace channel attached");
                Self::new(channel)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Trace channel unavailable, request tracing disabled");
                Self::absent()
            }
        }
    }

    /// Build the sink selected by configuration.
    pub fn from_config(config: &SinkConfig) -> Self {
        match config.kind {
            SinkKind::TraceMarker => {
                Self::probe(|| TraceMarkerChannel::open(config.trace_marker_paths.as_slice()))
            }
            SinkKind::Log => Self::new(LogChannel::new(&config.logger_name)),
            SinkKind::None => {
                tracing::info!("Trace channel disabled by configuration");
                Self::absent()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.channel.is_some()
    }

    /// Deliver a line if a channel is present. Never fails.
    pub fn emit(&self, line: &str) {
        let Some(channel) = &self.channel else {
            return;
        };

        if let Err(e) = channel.try_send(line) {
            metrics::record_sink_failure();
            if !self.failure_logged.swap(true, Ordering::Relaxed) {
                tracing::warn!(channel = channel.name(), error = %e, "Trace channel write failed");
            } else {
                tracing::debug!(channel = channel.name(), error = %e, "Trace channel write failed");
            }
        }
    }
}

impl fmt::Debug for TraceSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceSink")
            .field("channel", &self.channel.as_ref().map(|c| c.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Default)]
    struct BrokenChannel {
        calls: AtomicUsize,
    }

    impl TraceChannel for BrokenChannel {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn try_send(&self, _line: &str) -> Result<(), TraceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(TraceError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "gone",
            )))
        }
    }

    #[test]
    fn test_probe_failure_yields_absent_sink() {
        let sink = TraceSink::probe(|| -> Result<MemoryChannel, TraceError> {
            Err(TraceError::SinkUnavailable("agent not loaded".into()))
        });
        assert!(!sink.is_available());
        sink.emit("ENTER:svc:GET:/:1");
    }

    #[test]
    fn test_probe_success_delivers_lines() {
        let channel = MemoryChannel::new();
        let probe_channel = channel.clone();
        let sink = TraceSink::probe(move || Ok(probe_channel));
        assert!(sink.is_available());

        sink.emit("ENTER:svc:GET:/:1");
        assert_eq!(channel.lines(), vec!["ENTER:svc:GET:/:1"]);
    }

    #[test]
    fn test_write_failures_are_swallowed() {
        let sink = TraceSink::new(BrokenChannel::default());
        sink.emit("a");
        sink.emit("b");
        assert!(sink.failure_logged.load(Ordering::Relaxed));
    }

    #[test]
    fn test_config_selects_channel() {
        let mut config = SinkConfig::default();

        config.kind = SinkKind::None;
        assert!(!TraceSink::from_config(&config).is_available());

        config.kind = SinkKind::Log;
        assert!(TraceSink::from_config(&config).is_available());

        config.kind = SinkKind::TraceMarker;
        config.trace_marker_paths = vec!["/nonexistent/trace_marker".to_string()];
        assert!(!TraceSink::from_config(&config).is_available());
    }
}
