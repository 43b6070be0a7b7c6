//! Widget implementations and the seams the mount uses to load them.
//!
//! ARCHITECTURE
//! ============
//! The registry only knows metadata. Implementations are bound separately in
//! a `WidgetCatalog`: key → `WidgetLoader`. A loader resolves asynchronously
//! to a `WidgetFactory`, and the mount builds fresh `Widget` instances from
//! that factory (once on load, again on every boundary retry).
//!
//! Widgets receive their mount's `SessionScope` explicitly on every call.

mod counter;
mod terminal;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use counter::CounterWidget;
pub use terminal::{CONNECTION_RESOURCE, TerminalConnection, TerminalWidget};

use crate::registry::WidgetEntry;
use crate::scope::SessionScope;

// =============================================================================
// ERRORS
// =============================================================================

/// Failure raised by a widget while rendering or handling an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("{0}")]
    Runtime(String),
    #[error("invalid payload for event '{event}': {reason}")]
    InvalidPayload { event: String, reason: String },
}

impl crate::error::ErrorCode for WidgetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Runtime(_) => "E_WIDGET_RUNTIME",
            Self::InvalidPayload { .. } => "E_WIDGET_PAYLOAD",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

/// Failure resolving a widget implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("widget load timed out after {ms}ms")]
    TimedOut { ms: u64 },
    #[error("widget load aborted")]
    Aborted,
    #[error("widget load failed: {0}")]
    Failed(String),
}

impl crate::error::ErrorCode for LoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TimedOut { .. } => "E_LOAD_TIMEOUT",
            Self::Aborted => "E_LOAD_ABORTED",
            Self::Failed(_) => "E_LOAD_FAILED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::TimedOut { .. } | Self::Failed(_))
    }
}

// =============================================================================
// WIDGET
// =============================================================================

/// A user interaction forwarded to a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetEvent {
    pub name: String,
    #[serde(default)]
    pub payload: Value,
}

impl WidgetEvent {
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self { name: name.into(), payload }
    }

    /// Read a required string field from the payload.
    ///
    /// # Errors
    ///
    /// [`WidgetError::InvalidPayload`] when the field is absent or not a string.
    pub fn str_field(&self, field: &str) -> Result<&str, WidgetError> {
        self.payload.get(field).and_then(Value::as_str).ok_or_else(|| WidgetError::InvalidPayload {
            event: self.name.clone(),
            reason: format!("missing string field '{field}'"),
        })
    }
}

/// Widget trait implemented by every embeddable demo.
pub trait Widget: Send {
    /// Render the widget body as an HTML fragment.
    ///
    /// # Errors
    ///
    /// Any error trips the surrounding error boundary.
    fn render(&mut self, scope: &mut SessionScope) -> Result<String, WidgetError>;

    /// Handle a user event. Unknown events are ignored by default.
    ///
    /// # Errors
    ///
    /// Any error trips the surrounding error boundary.
    fn handle_event(&mut self, _event: &WidgetEvent, _scope: &mut SessionScope) -> Result<(), WidgetError> {
        Ok(())
    }
}

/// Builds fresh widget instances.
#[derive(Clone)]
pub struct WidgetFactory {
    ctor: Arc<dyn Fn() -> Box<dyn Widget> + Send + Sync>,
}

impl WidgetFactory {
    pub fn new<T, F>(build: F) -> Self
    where
        T: Widget + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self { ctor: Arc::new(move || Box::new(build())) }
    }

    #[must_use]
    pub fn create(&self) -> Box<dyn Widget> {
        (self.ctor)()
    }
}

impl std::fmt::Debug for WidgetFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WidgetFactory")
    }
}

// =============================================================================
// LOADING
// =============================================================================

/// Deferred resolution of a widget implementation.
#[async_trait]
pub trait WidgetLoader: Send + Sync {
    async fn load(&self, entry: &WidgetEntry) -> Result<WidgetFactory, LoadError>;
}

/// Loader for widgets compiled into this binary. Yields once before
/// resolving so loading is always observed as a separate step.
pub struct BuiltinLoader {
    factory: WidgetFactory,
}

impl BuiltinLoader {
    #[must_use]
    pub fn new(factory: WidgetFactory) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl WidgetLoader for BuiltinLoader {
    async fn load(&self, _entry: &WidgetEntry) -> Result<WidgetFactory, LoadError> {
        tokio::task::yield_now().await;
        Ok(self.factory.clone())
    }
}

/// Implementations bound to registry keys.
#[derive(Clone, Default)]
pub struct WidgetCatalog {
    loaders: HashMap<String, Arc<dyn WidgetLoader>>,
}

impl WidgetCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the widgets shipped with the site.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.bind("terminal", BuiltinLoader::new(WidgetFactory::new(TerminalWidget::new)));
        catalog.bind("counter", BuiltinLoader::new(WidgetFactory::new(CounterWidget::new)));
        catalog
    }

    /// Bind `loader` to `key`, replacing any previous binding.
    pub fn bind(&mut self, key: &str, loader: impl WidgetLoader + 'static) {
        self.loaders.insert(key.to_string(), Arc::new(loader));
    }

    #[must_use]
    pub fn loader(&self, key: &str) -> Option<Arc<dyn WidgetLoader>> {
        self.loaders.get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.loaders.contains_key(key)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.loaders.keys().cloned().collect();
        keys.sort();
        keys
    }
}

// =============================================================================
// HTML
// =============================================================================

pub(crate) fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
