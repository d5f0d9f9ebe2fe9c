//! Shared utilities for integration tests.

use std::sync::Arc;

use axum::{body::Body, http::Request, Router};
use request_tracer::sink::{MemoryChannel, TraceSink};
use request_tracer::tracer::{ManualClock, SequenceKeys};
use request_tracer::{registrar, PathFilter, RequestTracer, ServiceName};

pub const SERVICE: &str = "ts-order-service";

/// A tracer writing to an in-memory channel.
pub fn memory_tracer(channel: &MemoryChannel) -> RequestTracer {
    RequestTracer::new(ServiceName::new(SERVICE), TraceSink::new(channel.clone()))
}

/// A tracer with a manual clock and keys starting at `first_key`.
#[allow(dead_code)]
pub fn scripted_tracer(channel: &MemoryChannel, clock: Arc<ManualClock>, first_key: u64) -> RequestTracer {
    memory_tracer(channel)
        .with_key_source(Box::new(SequenceKeys::starting_at(first_key)))
        .with_clock(clock)
}

/// Install `tracer` on `routes` with the default path filter.
#[allow(dead_code)]
pub fn traced(routes: Router, tracer: RequestTracer) -> Router {
    registrar::install(routes, Arc::new(tracer), PathFilter::default())
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// A parsed trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Enter { method: String, uri: String, key: String },
    Exit { status: u16, duration_nanos: u64, key: String },
}

impl Line {
    pub fn key(&self) -> &str {
        match self {
            Line::Enter { key, .. } | Line::Exit { key, .. } => key,
        }
    }
}

/// Split a line on `:` and check the service field.
pub fn parse(line: &str) -> Line {
    let fields: Vec<&str> = line.split(':').collect();
    assert_eq!(fields.len(), 5, "malformed line: {line}");
    assert_eq!(fields[1], SERVICE, "unexpected service in {line}");
    match fields[0] {
        "ENTER" => Line::Enter {
            method: fields[2].to_string(),
            uri: fields[3].to_string(),
            key: fields[4].to_string(),
        },
        "EXIT" => Line::Exit {
            status: fields[2].parse().unwrap(),
            duration_nanos: fields[3].parse().unwrap(),
            key: fields[4].to_string(),
        },
        other => panic!("unknown event kind {other}"),
    }
}
