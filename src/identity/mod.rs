//! Service identity resolution.
//!
//! # Data Flow
//! ```text
//! application.name        (APPLICATION_NAME, [application] name)
//!     → spring.application.name (SPRING_APPLICATION_NAME)
//!     → fallback "unknown-service"
//!     → ServiceName (immutable, process lifetime)
//! ```

pub mod source;

use std::fmt;
use std::sync::Arc;

use crate::error::TraceError;

pub use source::{ConfigSource, EnvSource, LayeredSource, PropertySource};

/// Configuration key holding the logical service name.
pub const SERVICE_NAME_KEY: &str = "application.name";

/// Secondary key, set by hosts that already export the Spring-style name.
pub const SPRING_SERVICE_NAME_KEY: &str = "spring.application.name";

/// Name used when no service name is configured.
pub const DEFAULT_SERVICE_NAME: &str = "unknown-service";

/// Logical name of the running service. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceName(Arc<str>);

impl ServiceName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Resolve the service name once from configuration.
    ///
    /// [`SERVICE_NAME_KEY`] is consulted before [`SPRING_SERVICE_NAME_KEY`];
    /// blank values count as unset.
    pub fn resolve(source: &dyn ConfigSource) -> Self {
        let configured = [SERVICE_NAME_KEY, SPRING_SERVICE_NAME_KEY]
            .into_iter()
            .find_map(|key| source.get(key).filter(|v| !v.trim().is_empty()));
        let Some(name) = configured else {
            let reason = TraceError::ConfigurationMissing {
                key: SERVICE_NAME_KEY.to_string(),
            };
            tracing::info!(
                reason = %reason,
                fallback = DEFAULT_SERVICE_NAME,
                "Service name not configured"
            );
            return Self::new(DEFAULT_SERVICE_NAME);
        };
        tracing::debug!(service = %name, "Service name resolved");
        Self::new(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_configured_name() {
        let source = PropertySource::new().with(SERVICE_NAME_KEY, "ts-order-service");
        assert_eq!(ServiceName::resolve(&source).as_str(), "ts-order-service");
    }

    #[test]
    fn test_resolve_accepts_spring_style_name() {
        let source = EnvSource::from_vars([("SPRING_APPLICATION_NAME", "ts-travel-service")]);
        assert_eq!(ServiceName::resolve(&source).as_str(), "ts-travel-service");
    }

    #[test]
    fn test_resolve_prefers_application_name_over_spring_name() {
        let source = LayeredSource::new()
            .push(EnvSource::from_vars([
                ("SPRING_APPLICATION_NAME", "ts-travel-service"),
                ("APPLICATION_NAME", " "),
            ]))
            .push(PropertySource::new().with(SERVICE_NAME_KEY, "ts-order-service"));
        assert_eq!(ServiceName::resolve(&source).as_str(), "ts-order-service");
    }

    #[test]
    fn test_resolve_falls_back_when_unset() {
        let source = LayeredSource::new()
            .push(EnvSource::from_vars(Vec::<(String, String)>::new()))
            .push(PropertySource::new());
        assert_eq!(ServiceName::resolve(&source).as_str(), DEFAULT_SERVICE_NAME);
    }
}
