//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured diagnostic events)
//!     → metrics.rs (counters)
//!
//! Trace lines themselves go through the sink, not through here.
//! ```

pub mod logging;
pub mod metrics;
