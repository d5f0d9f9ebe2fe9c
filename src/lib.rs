//! Request boundary tracing for HTTP services.
//!
//! Every traced request produces one `ENTER` and one `EXIT` line on an
//! external trace channel, sharing a correlation key that downstream tooling
//! joins against kernel trace events.

pub mod config;
pub mod error;
pub mod identity;
pub mod observability;
pub mod registrar;
pub mod sink;
pub mod tracer;

pub use config::TracerConfig;
pub use error::TraceError;
pub use identity::ServiceName;
pub use registrar::{install, PathFilter, Pipeline};
pub use sink::TraceSink;
pub use tracer::RequestTracer;
