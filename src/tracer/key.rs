//! Correlation keys.
//!
//! A key is unique among in-flight requests and is the join column between
//! request events and kernel trace events. The tokio scheduler moves tasks
//! between worker threads, so the OS thread id cannot serve as the key; keys
//! are generated here instead and travel with the request.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::config::ContextKeyStrategy;

/// Header consulted by [`RequestIdKeys`].
pub const X_REQUEST_ID: &str = "x-request-id";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Correlation key of one request. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(Arc<str>);

impl ContextKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces a key for each new request.
pub trait KeySource: Send + Sync + fmt::Debug {
    fn next_key(&self, headers: &HeaderMap) -> ContextKey;
}

/// Process-local sequence: 1, 2, 3, ...
#[derive(Debug)]
pub struct SequenceKeys {
    next: AtomicU64,
}

impl SequenceKeys {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequenceKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for SequenceKeys {
    fn next_key(&self, _headers: &HeaderMap) -> ContextKey {
        ContextKey::new(self.next.fetch_add(1, Ordering::Relaxed).to_string())
    }
}

/// Reuses a well-formed incoming `x-request-id`, otherwise a fresh UUID v4.
///
/// Clients may send the same id on concurrent requests, so a reused id is
/// suffixed with a process-local sequence: `<request-id>.<seq>`.
#[derive(Debug, Default)]
pub struct RequestIdKeys {
    seq: SequenceKeys,
}

impl RequestIdKeys {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_usable(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= MAX_REQUEST_ID_LEN
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
    }
}

impl KeySource for RequestIdKeys {
    fn next_key(&self, headers: &HeaderMap) -> ContextKey {
        match headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|id| Self::is_usable(id))
        {
            Some(id) => ContextKey::new(format!("{}.{}", id, self.seq.next_key(headers))),
            None => ContextKey::new(Uuid::new_v4().to_string()),
        }
    }
}

/// Key source for a configured strategy.
pub fn key_source(strategy: ContextKeyStrategy) -> Box<dyn KeySource> {
    match strategy {
        ContextKeyStrategy::Sequence => Box::new(SequenceKeys::new()),
        ContextKeyStrategy::RequestId => Box::new(RequestIdKeys::new()),
    }
}
