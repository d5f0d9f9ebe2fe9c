//! Process-wide configuration sources.
//!
//! # Responsibilities
//! - Answer `key → value` lookups for settings read once at startup
//! - Layer sources so the environment can override the config file
//!
//! # Design Decisions
//! - Sources are snapshots; nothing re-reads the environment after startup
//! - Environment keys use relaxed binding: `application.name` → `APPLICATION_NAME`

use std::collections::HashMap;
use std::fmt;

use crate::config::TracerConfig;

/// A read-only source of string configuration values.
pub trait ConfigSource: Send + Sync + fmt::Debug {
    /// Look up a value; `None` when the key is unset.
    fn get(&self, key: &str) -> Option<String>;

    /// Look up a value, falling back to `default` when unset or blank.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }
}

/// Explicit key/value properties, e.g. flattened from a config file.
#[derive(Debug, Clone, Default)]
pub struct PropertySource {
    values: HashMap<String, String>,
}

impl PropertySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Properties carried by a loaded config file.
    pub fn from_config(config: &TracerConfig) -> Self {
        let mut source = Self::new();
        if let Some(name) = &config.application.name {
            source = source.with(super::SERVICE_NAME_KEY, name.clone());
        }
        source
    }
}

impl ConfigSource for PropertySource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Snapshot of environment variables, looked up with relaxed binding.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Snapshot the current process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build from explicit variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// `application.name` → `APPLICATION_NAME`.
    pub fn env_key(key: &str) -> String {
        key.chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect()
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(&Self::env_key(key)).cloned()
    }
}

/// Ordered chain of sources; the first one that knows a key wins.
#[derive(Debug, Default)]
pub struct LayeredSource {
    layers: Vec<Box<dyn ConfigSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-priority layer.
    pub fn push(mut self, source: impl ConfigSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }
}

impl ConfigSource for LayeredSource {
    fn get(&self, key: &str) -> Option<String> {
        self.layers
            .iter()
            .find_map(|layer| layer.get(key).filter(|v| !v.trim().is_empty()))
    }
}
