//! Metrics collection.
//!
//! # Metrics
//! - `request_trace_events_total` (counter): events handed to the sink, by kind
//! - `request_trace_sink_failures_total` (counter): channel writes that failed
//! - `request_trace_missing_timer_total` (counter): exit hooks without a timer
//! - `request_trace_aborted_total` (counter): requests dropped before a response
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host decides on an exporter
//! - Without an installed recorder every call is a no-op

use metrics::counter;

pub fn record_event(kind: &'static str) {
    counter!("request_trace_events_total", "kind" => kind).increment(1);
}

pub fn record_sink_failure() {
    counter!("request_trace_sink_failures_total").increment(1);
}

pub fn record_missing_timer() {
    counter!("request_trace_missing_timer_total").increment(1);
}

pub fn record_aborted() {
    counter!("request_trace_aborted_total").increment(1);
}
