//! Trace channel implementations.
//!
//! # Responsibilities
//! - Deliver one pre-formatted line to an external tracing facility
//! - Report absence at open time and write failures per call
//!
//! # Channels
//! - `TraceMarkerChannel`: kernel ftrace marker file; lines share the ring
//!   buffer with syscall events, so the context key can be joined against them
//! - `LogChannel`: `tracing` events on the `request_trace` target
//! - `MemoryChannel`: in-process capture for tests and embedding hosts

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::TraceError;

/// An external tracing facility accepting single-line messages.
pub trait TraceChannel: Send + Sync + fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Deliver one line. Must not panic.
    fn try_send(&self, line: &str) -> Result<(), TraceError>;
}

/// Writes each line to the kernel's `trace_marker` file with a single `write(2)`.
#[derive(Debug)]
pub struct TraceMarkerChannel {
    file: File,
    path: PathBuf,
}

impl TraceMarkerChannel {
    /// Open the first writable marker file among `candidates`.
    pub fn open<P: AsRef<Path>>(candidates: &[P]) -> Result<Self, TraceError> {
        let mut last_error = None;
        for candidate in candidates {
            let path = candidate.as_ref();
            match OpenOptions::new().write(true).open(path) {
                Ok(file) => {
                    tracing::debug!(path = %path.display(), "Opened trace marker");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Trace marker not writable");
                    last_error = Some(format!("{}: {}", path.display(), e));
                }
            }
        }
        Err(TraceError::SinkUnavailable(
            last_error.unwrap_or_else(|| "no trace marker paths configured".to_string()),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TraceChannel for TraceMarkerChannel {
    fn name(&self) -> &'static str {
        "trace_marker"
    }

    fn try_send(&self, line: &str) -> Result<(), TraceError> {
        // `&File` is `Write`; concurrent writers each issue their own syscall.
        write_line(&self.file, line)
    }
}

/// Write `line` and its newline with exactly one `write` call.
///
/// The kernel records each marker write as one event, so a retried remainder
/// would land as a separate, unparseable line. A short write is an error.
fn write_line<W: Write>(mut out: W, line: &str) -> Result<(), TraceError> {
    let mut buf = Vec::with_capacity(line.len() + 1);
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');

    let written = out.write(&buf)?;
    if written < buf.len() {
        return Err(TraceError::Io(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write to trace marker: {} of {} bytes", written, buf.len()),
        )));
    }
    Ok(())
}

/// Hands lines to the `tracing` subscriber under the `request_trace` target.
#[derive(Debug, Clone)]
pub struct LogChannel {
    logger: Arc<str>,
}

impl LogChannel {
    pub fn new(logger: impl AsRef<str>) -> Self {
        Self {
            logger: Arc::from(logger.as_ref()),
        }
    }
}

impl TraceChannel for LogChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    fn try_send(&self, line: &str) -> Result<(), TraceError> {
        tracing::info!(target: "request_trace", logger = %self.logger, "{}", line);
        Ok(())
    }
}

/// Records every line in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines received so far, in emission order.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain and return the lines received so far.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl TraceChannel for MemoryChannel {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn try_send(&self, line: &str) -> Result<(), TraceError> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn scratch_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "request-tracer-{}-{}",
            std::process::id(),
            name
        ));
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn test_trace_marker_open_fails_when_absent() {
        let err = TraceMarkerChannel::open(&["/nonexistent/tracing/trace_marker"]).unwrap_err();
        assert!(matches!(err, TraceError::SinkUnavailable(_)));

        let none: [&str; 0] = [];
        assert!(matches!(
            TraceMarkerChannel::open(&none),
            Err(TraceError::SinkUnavailable(_))
        ));
    }

    #[test]
    fn test_trace_marker_falls_through_to_next_candidate() {
        let path = scratch_file("marker-fallthrough");
        let channel = TraceMarkerChannel::open(&[
            PathBuf::from("/nonexistent/tracing/trace_marker"),
            path.clone(),
        ])
        .unwrap();
        assert_eq!(channel.path(), path.as_path());

        channel.try_send("ENTER:svc:GET:/a:1").unwrap();
        channel.try_send("EXIT:svc:200:10:1").unwrap();

        let mut written = String::new();
        File::open(&path).unwrap().read_to_string(&mut written).unwrap();
        assert_eq!(written, "ENTER:svc:GET:/a:1\nEXIT:svc:200:10:1\n");
        let _ = std::fs::remove_file(path);
    }

    /// Accepts at most `limit` bytes per write.
    struct CappedWriter {
        limit: usize,
        writes: Vec<Vec<u8>>,
    }

    impl Write for CappedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let n = buf.len().min(self.limit);
            self.writes.push(buf[..n].to_vec());
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_line_issues_a_single_write() {
        let mut out = CappedWriter {
            limit: 4096,
            writes: Vec::new(),
        };
        write_line(&mut out, "EXIT:svc:200:10:1").unwrap();
        assert_eq!(out.writes, vec![b"EXIT:svc:200:10:1\n".to_vec()]);
    }

    #[test]
    fn test_short_write_is_reported_not_retried() {
        let mut out = CappedWriter {
            limit: 8,
            writes: Vec::new(),
        };
        let err = write_line(&mut out, "ENTER:svc:GET:/a:1").unwrap_err();
        assert!(matches!(err, TraceError::Io(ref e) if e.kind() == io::ErrorKind::WriteZero));
        assert_eq!(out.writes.len(), 1);
    }

    #[test]
    fn test_memory_channel_clones_share_buffer() {
        let channel = MemoryChannel::new();
        let clone = channel.clone();
        clone.try_send("one").unwrap();
        channel.try_send("two").unwrap();
        assert_eq!(channel.lines(), vec!["one", "two"]);
        assert_eq!(clone.take(), vec!["one", "two"]);
        assert!(channel.lines().is_empty());
    }
}
