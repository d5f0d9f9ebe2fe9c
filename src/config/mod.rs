//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → TracerConfig (validated, immutable)
//!     → read once at startup by the composition root
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the tracer is installed once per process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ContextKeyStrategy, LogFormat, ObservabilityConfig, SinkConfig, SinkKind, TracerConfig,
    TracingConfig,
};
