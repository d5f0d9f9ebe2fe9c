//! Request boundary tracer.
//!
//! # Data Flow
//! ```text
//! on_request_start(request)
//!     → KeySource (context key) + Clock (start instant)
//!     → PendingTimer, owned by the request's future
//!     → ENTER line → TraceSink
//!
//! on_request_end(timer, status)
//!     → consume PendingTimer, duration = now - start
//!     → EXIT line → TraceSink
//! ```
//!
//! # Design Decisions
//! - Timer state is a value carried by the request, not thread-local or shared
//! - An exit without a timer emits nothing and leaves nothing behind
//! - Tracing failures never reach the request path
//! - The EXIT duration ends when the response head exists; streaming the body
//!   to the client happens after EXIT and is not part of the measured time

pub mod event;
pub mod key;
pub mod timer;

use std::sync::Arc;

use axum::http::{Request, StatusCode};

use crate::error::TraceError;
use crate::identity::ServiceName;
use crate::observability::metrics;
use crate::sink::TraceSink;

pub use event::TraceEvent;
pub use key::{key_source, ContextKey, KeySource, RequestIdKeys, SequenceKeys};
pub use timer::{Clock, ManualClock, MonotonicClock, PendingTimer};

/// Status reported when a request is dropped before producing a response.
pub const ABORTED_STATUS: u16 = 499;

/// Emits paired ENTER/EXIT lines around each request.
#[derive(Debug)]
pub struct RequestTracer {
    service: ServiceName,
    sink: TraceSink,
    keys: Box<dyn KeySource>,
    clock: Arc<dyn Clock>,
}

impl RequestTracer {
    /// Create a tracer with sequence keys and the monotonic clock.
    ///
    /// Succeeds whether or not the sink has a channel.
    pub fn new(service: ServiceName, sink: TraceSink) -> Self {
        Self {
            service,
            sink,
            keys: Box::new(SequenceKeys::new()),
            clock: Arc::new(MonotonicClock),
        }
    }

    pub fn with_key_source(mut self, keys: Box<dyn KeySource>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn service(&self) -> &ServiceName {
        &self.service
    }

    pub fn sink(&self) -> &TraceSink {
        &self.sink
    }

    /// Pre-hook: start the timer and emit ENTER.
    ///
    /// Call at most once per request and hand the returned timer to
    /// [`on_request_end`](Self::on_request_end).
    pub fn on_request_start<B>(&self, request: &Request<B>) -> PendingTimer {
        let key = self.keys.next_key(request.headers());
        let timer = PendingTimer::start(key, self.clock.now());

        self.emit(TraceEvent::Enter {
            service: self.service.as_str(),
            method: request.method().as_str(),
            uri: request.uri().path(),
            key: timer.key(),
        });

        timer
    }

    /// Post-hook: consume the timer and emit EXIT with the elapsed time.
    ///
    /// Without a timer nothing is emitted.
    pub fn on_request_end(&self, timer: Option<PendingTimer>, status: StatusCode) {
        match timer {
            Some(timer) => self.finish(timer, status.as_u16()),
            None => {
                metrics::record_missing_timer();
                tracing::warn!(
                    service = %self.service,
                    status = status.as_u16(),
                    error = %TraceError::MissingTimerState,
                    "Skipping exit event"
                );
            }
        }
    }

    /// Cleanup hook for requests dropped before a response existed.
    pub fn on_request_aborted(&self, timer: PendingTimer, status: u16) {
        metrics::record_aborted();
        tracing::debug!(
            service = %self.service,
            key = %timer.key(),
            status,
            "Request dropped before completion"
        );
        self.finish(timer, status);
    }

    fn finish(&self, timer: PendingTimer, status: u16) {
        let duration_nanos = timer.elapsed_nanos(self.clock.now());
        self.emit(TraceEvent::Exit {
            service: self.service.as_str(),
            status,
            duration_nanos,
            key: timer.key(),
        });
    }

    fn emit(&self, event: TraceEvent<'_>) {
        if !self.sink.is_available() {
            return;
        }
        metrics::record_event(event.kind());
        self.sink.emit(&event.to_line());
    }
}
