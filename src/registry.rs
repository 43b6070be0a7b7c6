//! Widget registry — the fixed list of embeddable demos.
//!
//! DESIGN
//! ======
//! Entries are kept in a `Vec` for insertion order with a key → index map
//! beside it. The registry is built once at startup (from the embedded
//! `widgets.yaml` or `WIDGETS_FILE`) and shared behind an `Arc`; nothing
//! mutates it afterwards, so readers never lock.
//!
//! ERROR HANDLING
//! ==============
//! A duplicate key aborts startup. `register` validates before touching
//! either collection, so a rejected entry leaves the registry unchanged.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Seed list compiled into the binary.
pub const BUILTIN_WIDGETS_YAML: &str = include_str!("../widgets.yaml");

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate widget key: {0}")]
    DuplicateKey(String),
    #[error("invalid widget key {0:?}: keys must be non-empty lowercase ascii, digits, '-' or '_'")]
    InvalidKey(String),
    #[error("failed to read widget list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse widget list: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl crate::error::ErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateKey(_) => "E_DUPLICATE_KEY",
            Self::InvalidKey(_) => "E_INVALID_KEY",
            Self::Io { .. } => "E_IO",
            Self::Parse(_) => "E_CONFIG_PARSE",
        }
    }
}

/// Metadata for one embeddable widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetEntry {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Subdomain of an externally hosted variant.
    #[serde(default)]
    pub subdomain: Option<String>,
    /// Local dev port of the externally hosted variant.
    #[serde(default)]
    pub port: Option<u16>,
}

impl WidgetEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self { key: key.into(), title: title.into(), description: None, subdomain: None, port: None }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = Some(subdomain.into());
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: Vec<WidgetEntry>,
    index: HashMap<String, usize>,
}

impl WidgetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from entries, in order.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid or duplicate key.
    pub fn from_entries(entries: impl IntoIterator<Item = WidgetEntry>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for entry in entries {
            registry.register(entry)?;
        }
        Ok(registry)
    }

    /// Parse a YAML sequence of entries.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Parse`] for malformed YAML, or the first
    /// registration error.
    pub fn from_yaml(source: &str) -> Result<Self, RegistryError> {
        let entries: Vec<WidgetEntry> = serde_yaml::from_str(source)?;
        Self::from_entries(entries)
    }

    /// The registry compiled from the embedded `widgets.yaml`.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded seed itself is broken.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml(BUILTIN_WIDGETS_YAML)
    }

    /// Load from `path` when given, else the embedded seed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Io`] if the file cannot be read, plus any
    /// parse or registration error.
    pub fn load(path: Option<&Path>) -> Result<Self, RegistryError> {
        let Some(path) = path else {
            return Self::builtin();
        };
        let source = std::fs::read_to_string(path)
            .map_err(|source| RegistryError::Io { path: path.display().to_string(), source })?;
        Self::from_yaml(&source)
    }

    /// Add an entry. Rejected entries leave the registry untouched.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateKey`] if the key is already registered,
    /// [`RegistryError::InvalidKey`] if the key is malformed.
    pub fn register(&mut self, entry: WidgetEntry) -> Result<(), RegistryError> {
        if !is_valid_key(&entry.key) {
            return Err(RegistryError::InvalidKey(entry.key));
        }
        if self.index.contains_key(&entry.key) {
            return Err(RegistryError::DuplicateKey(entry.key));
        }
        self.index.insert(entry.key.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&WidgetEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in registration order.
    #[must_use]
    pub fn list(&self) -> &[WidgetEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
