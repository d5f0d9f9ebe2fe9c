//! Trace event line format.
//!
//! ```text
//! ENTER:<service>:<method>:<uri>:<context_key>
//! EXIT:<service>:<status>:<duration_ns>:<context_key>
//! ```
//!
//! Every field is percent-escaped for `%`, `:` and ASCII control characters,
//! so a field can neither add a separator nor break the line.
//!
//! A line never exceeds [`MAX_LINE_LEN`] bytes. The kernel splits or clips
//! longer marker writes, so an over-long URI is cut and ends in
//! [`TRUNCATION_MARKER`]; the context key is always kept whole.

use std::borrow::Cow;
use std::fmt::{self, Write};

use crate::tracer::key::ContextKey;

/// Longest line handed to a channel, excluding the trailing newline.
pub const MAX_LINE_LEN: usize = 4095;

/// Appended to a field cut short to fit [`MAX_LINE_LEN`].
pub const TRUNCATION_MARKER: &str = "...";

/// Request methods are client-controlled too; cap them well below the line limit.
const MAX_METHOD_LEN: usize = 64;

/// One boundary event of a request. Borrowed, built right before emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent<'a> {
    Enter {
        service: &'a str,
        method: &'a str,
        uri: &'a str,
        key: &'a ContextKey,
    },
    Exit {
        service: &'a str,
        status: u16,
        duration_nanos: u64,
        key: &'a ContextKey,
    },
}

impl TraceEvent<'_> {
    /// Metric label for this event.
    pub fn kind(&self) -> &'static str {
        match self {
            TraceEvent::Enter { .. } => "enter",
            TraceEvent::Exit { .. } => "exit",
        }
    }

    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TraceEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Enter {
                service,
                method,
                uri,
                key,
            } => {
                let service = escape_field(service);
                let method = truncate_field(escape_field(method), MAX_METHOD_LEN);
                let key = escape_field(key.as_str());
                let fixed = "ENTER::::".len() + service.len() + method.len() + key.len();
                let uri = truncate_field(escape_field(uri), MAX_LINE_LEN.saturating_sub(fixed));
                write!(f, "ENTER:{}:{}:{}:{}", service, method, uri, key)
            }
            TraceEvent::Exit {
                service,
                status,
                duration_nanos,
                key,
            } => write!(
                f,
                "EXIT:{}:{}:{}:{}",
                escape_field(service),
                status,
                duration_nanos,
                escape_field(key.as_str()),
            ),
        }
    }
}

fn needs_escape(c: char) -> bool {
    c == ':' || c == '%' || c.is_ascii_control()
}

/// Cut an escaped field to at most `max` bytes, marker included.
///
/// The cut lands on a char boundary and never inside a `%XX` escape.
fn truncate_field(field: Cow<'_, str>, max: usize) -> Cow<'_, str> {
    if field.len() <= max {
        return field;
    }

    let mut end = max.saturating_sub(TRUNCATION_MARKER.len());
    while !field.is_char_boundary(end) {
        end -= 1;
    }
    let tail_start = end.saturating_sub(2);
    if let Some(i) = field.as_bytes()[tail_start..end].iter().rposition(|&b| b == b'%') {
        end = tail_start + i;
    }

    let mut cut = String::with_capacity(end + TRUNCATION_MARKER.len());
    cut.push_str(&field[..end]);
    cut.push_str(TRUNCATION_MARKER);
    Cow::Owned(cut)
}

/// Percent-escape the characters that would break line parsing.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if !field.chars().any(needs_escape) {
        return Cow::Borrowed(field);
    }

    let mut escaped = String::with_capacity(field.len() + 8);
    for c in field.chars() {
        if needs_escape(c) {
            let _ = write!(escaped, "%{:02X}", c as u32);
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}
