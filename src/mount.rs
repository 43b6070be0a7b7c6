//! Widget mount — resolves a key, loads the widget lazily, renders it inside
//! its session scope and error boundary.
//!
//! DESIGN
//! ======
//! `WidgetHost::mount` looks the key up in the registry. Unknown keys (and
//! registered demos with no local implementation) become an `External`
//! mount that renders the "External demo" placeholder. Everything else gets
//! a fresh `SessionScope` and a background load task; until that task
//! reports back, the mount renders a loading placeholder.
//!
//! Loading suspends only this mount. The task hands its result over a
//! oneshot channel, which `render`/`dispatch` poll without blocking and
//! `ready` awaits.
//!
//! TEARDOWN
//! ========
//! `unmount` (also run from `Drop`) clears the shared liveness flag, aborts
//! any in-flight load, drops the widget and destroys the scope. The load
//! task checks liveness before sending and `commit` refuses results once
//! unmounted, so a late load is never applied to a destroyed scope.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::boundary::{ErrorBoundary, WidgetFailure};
use crate::config::ShellConfig;
use crate::registry::{WidgetEntry, WidgetRegistry};
use crate::scope::SessionScope;
use crate::widgets::{LoadError, Widget, WidgetCatalog, WidgetEvent, WidgetFactory, WidgetLoader, escape_html};

pub const EXTERNAL_PLACEHOLDER: &str = "External demo";
pub const LOADING_MESSAGE: &str = "Loading demo...";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
    #[error("widget is still loading")]
    NotReady,
    #[error("widget '{0}' is hosted externally")]
    External(String),
    #[error("widget has been unmounted")]
    Unmounted,
}

impl crate::error::ErrorCode for MountError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotReady => "E_NOT_READY",
            Self::External(_) => "E_EXTERNAL_WIDGET",
            Self::Unmounted => "E_UNMOUNTED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::NotReady)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderState {
    External,
    Loading,
    Ready,
    Failed,
    Unmounted,
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedWidget {
    pub key: String,
    pub state: RenderState,
    pub html: String,
    /// Captured failure; only populated when diagnostics are enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WidgetFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountOptions {
    pub load_timeout: Duration,
    pub diagnostics: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self { load_timeout: Duration::from_secs(crate::config::DEFAULT_DEMO_LOAD_TIMEOUT_SECS), diagnostics: true }
    }
}

impl MountOptions {
    #[must_use]
    pub fn from_config(config: &ShellConfig) -> Self {
        Self { load_timeout: config.load_timeout, diagnostics: config.diagnostics_enabled() }
    }
}

// =============================================================================
// HOST
// =============================================================================

/// Everything a mount needs: the read-only registry, bound
/// implementations and mount options. Cheap to clone.
#[derive(Clone)]
pub struct WidgetHost {
    registry: Arc<WidgetRegistry>,
    catalog: Arc<WidgetCatalog>,
    options: MountOptions,
}

impl WidgetHost {
    #[must_use]
    pub fn new(registry: Arc<WidgetRegistry>, catalog: Arc<WidgetCatalog>, options: MountOptions) -> Self {
        Self { registry, catalog, options }
    }

    #[must_use]
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> MountOptions {
        self.options
    }

    /// True when `key` is registered and has a local implementation bound.
    #[must_use]
    pub fn has_implementation(&self, key: &str) -> bool {
        self.registry.contains(key) && self.catalog.contains(key)
    }

    /// Mount the widget registered under `key`.
    ///
    /// # Panics
    ///
    /// Loadable widgets spawn their load on the current Tokio runtime, so this
    /// must be called from within one.
    #[must_use]
    pub fn mount(&self, key: &str) -> WidgetMount {
        let id = Uuid::new_v4();
        let entry = self.registry.lookup(key).cloned();
        let loader = entry.as_ref().and_then(|_| self.catalog.loader(key));
        let scope = match (&entry, &loader) {
            (Some(entry), Some(_)) => Some(SessionScope::new(scope_seed(entry, id, self.options))),
            _ => None,
        };

        let mut mount = WidgetMount {
            id,
            key: key.to_string(),
            entry,
            loader,
            options: self.options,
            phase: Phase::External,
            scope,
            boundary: ErrorBoundary::new(format!("widget={key} mount={id}"), self.options.diagnostics),
            alive: Arc::new(AtomicBool::new(true)),
            pending: None,
            loads_started: 0,
            last_active: Instant::now(),
        };

        if mount.scope.is_some() {
            mount.start_load();
        }
        info!(mount_id = %id, widget = %key, external = mount.is_external(), "widget mounted");
        mount
    }
}

fn scope_seed(entry: &WidgetEntry, mount_id: Uuid, options: MountOptions) -> Vec<(String, Value)> {
    vec![
        ("widget.key".to_string(), json!(entry.key)),
        ("widget.title".to_string(), json!(entry.title)),
        ("mount.id".to_string(), json!(mount_id.to_string())),
        ("diagnostics".to_string(), json!(options.diagnostics)),
    ]
}

// =============================================================================
// MOUNT
// =============================================================================

enum Phase {
    External,
    Loading,
    Loaded { factory: WidgetFactory, widget: Box<dyn Widget> },
    LoadFailed,
    Unmounted,
}

struct PendingLoad {
    rx: oneshot::Receiver<Result<WidgetFactory, LoadError>>,
    task: JoinHandle<()>,
}

pub struct WidgetMount {
    id: Uuid,
    key: String,
    entry: Option<WidgetEntry>,
    loader: Option<Arc<dyn WidgetLoader>>,
    options: MountOptions,
    phase: Phase,
    scope: Option<SessionScope>,
    boundary: ErrorBoundary,
    alive: Arc<AtomicBool>,
    pending: Option<PendingLoad>,
    loads_started: u32,
    last_active: Instant,
}

impl WidgetMount {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn entry(&self) -> Option<&WidgetEntry> {
        self.entry.as_ref()
    }

    #[must_use]
    pub fn boundary(&self) -> &ErrorBoundary {
        &self.boundary
    }

    #[must_use]
    pub fn scope(&self) -> Option<&SessionScope> {
        self.scope.as_ref()
    }

    pub fn scope_mut(&mut self) -> Option<&mut SessionScope> {
        self.scope.as_mut()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self.phase, Phase::External)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    /// Number of load attempts, including those re-issued by retry.
    #[must_use]
    pub fn loads_started(&self) -> u32 {
        self.loads_started
    }

    #[must_use]
    pub fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_active)
    }

    /// Wait for an in-flight load to finish and apply its result.
    pub async fn ready(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let result = (&mut pending.rx)
            .await
            .unwrap_or_else(|_| Err(LoadError::Failed("loader task ended without a result".into())));
        self.pending = None;
        self.commit(result);
    }

    /// Render the current state. Never fails: widget faults are contained by
    /// the boundary and show up as [`RenderState::Failed`].
    pub fn render(&mut self) -> RenderedWidget {
        self.poll_pending();
        self.last_active = Instant::now();

        let (state, html) = match &mut self.phase {
            Phase::Unmounted => (RenderState::Unmounted, String::new()),
            Phase::External => (RenderState::External, external_html(&self.key, self.entry.as_ref())),
            Phase::Loading => (RenderState::Loading, frame_html(&self.key, RenderState::Loading, &loading_html())),
            Phase::LoadFailed => {
                (RenderState::Failed, frame_html(&self.key, RenderState::Failed, &self.boundary.fallback_html()))
            }
            Phase::Loaded { widget, .. } => {
                let rendered = match self.scope.as_mut() {
                    Some(scope) => self.boundary.run("render", || widget.render(scope)),
                    None => None,
                };
                match rendered {
                    Some(body) => (RenderState::Ready, frame_html(&self.key, RenderState::Ready, &body)),
                    None => {
                        (RenderState::Failed, frame_html(&self.key, RenderState::Failed, &self.boundary.fallback_html()))
                    }
                }
            }
        };

        let error = if self.options.diagnostics { self.boundary.last_error().cloned() } else { None };
        RenderedWidget { key: self.key.clone(), state, html, error }
    }

    /// Forward a user event to the widget under the boundary, then render.
    /// Events reaching a failed widget are dropped.
    ///
    /// # Errors
    ///
    /// [`MountError`] when the mount cannot take events (loading, external
    /// or unmounted). Widget failures are never returned here.
    pub fn dispatch(&mut self, event: &WidgetEvent) -> Result<RenderedWidget, MountError> {
        self.poll_pending();
        match &mut self.phase {
            Phase::Unmounted => return Err(MountError::Unmounted),
            Phase::External => return Err(MountError::External(self.key.clone())),
            Phase::Loading => return Err(MountError::NotReady),
            Phase::LoadFailed => {}
            Phase::Loaded { widget, .. } => {
                if let Some(scope) = self.scope.as_mut() {
                    let _ = self.boundary.run("event", || widget.handle_event(event, scope));
                }
            }
        }
        Ok(self.render())
    }

    /// User-triggered retry. A failed boundary goes back to healthy and the
    /// widget is rebuilt from scratch (or reloaded if loading had failed).
    /// Healthy mounts are simply re-rendered.
    ///
    /// # Errors
    ///
    /// [`MountError::External`] or [`MountError::Unmounted`].
    pub fn retry(&mut self) -> Result<RenderedWidget, MountError> {
        match self.phase {
            Phase::Unmounted => return Err(MountError::Unmounted),
            Phase::External => return Err(MountError::External(self.key.clone())),
            _ => {}
        }
        self.poll_pending();
        if !self.boundary.retry() {
            return Ok(self.render());
        }

        info!(mount_id = %self.id, widget = %self.key, "widget retry requested");
        if let Phase::Loaded { factory, widget } = &mut self.phase {
            if let Some(fresh) = self.boundary.run("render", || Ok(factory.create())) {
                *widget = fresh;
            }
        } else {
            self.start_load();
        }
        Ok(self.render())
    }

    /// Tear the mount down: abandon any pending load, drop the widget and
    /// destroy the scope. Safe to call more than once.
    pub fn unmount(&mut self) {
        if matches!(self.phase, Phase::Unmounted) {
            return;
        }
        self.alive.store(false, Ordering::Release);
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
            let err = LoadError::Aborted;
            debug!(mount_id = %self.id, widget = %self.key, error = %err, "in-flight widget load abandoned");
        }
        self.phase = Phase::Unmounted;
        if let Some(mut scope) = self.scope.take() {
            scope.destroy();
        }
        info!(mount_id = %self.id, widget = %self.key, "widget unmounted");
    }

    fn start_load(&mut self) {
        let (Some(entry), Some(loader)) = (self.entry.clone(), self.loader.clone()) else {
            return;
        };
        let (tx, rx) = oneshot::channel();
        let alive = Arc::clone(&self.alive);
        let timeout = self.options.load_timeout;
        let mount_id = self.id;

        let task = tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, loader.load(&entry)).await {
                Ok(result) => result,
                Err(_) => Err(LoadError::TimedOut { ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX) }),
            };
            if !alive.load(Ordering::Acquire) {
                debug!(%mount_id, widget = %entry.key, "mount gone before load finished; result dropped");
                return;
            }
            let _ = tx.send(result);
        });

        self.pending = Some(PendingLoad { rx, task });
        self.phase = Phase::Loading;
        self.loads_started += 1;
    }

    fn poll_pending(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(LoadError::Failed("loader task ended without a result".into()))
            }
        };
        self.pending = None;
        self.commit(result);
    }

    fn commit(&mut self, result: Result<WidgetFactory, LoadError>) {
        if !self.is_alive() || matches!(self.phase, Phase::Unmounted) {
            debug!(mount_id = %self.id, "load result ignored after unmount");
            return;
        }
        match result {
            Ok(factory) => match self.boundary.run("load", || Ok(factory.create())) {
                Some(widget) => {
                    debug!(mount_id = %self.id, widget = %self.key, "widget loaded");
                    self.phase = Phase::Loaded { factory, widget };
                }
                None => self.phase = Phase::LoadFailed,
            },
            Err(err) => {
                warn!(mount_id = %self.id, widget = %self.key, error = %err, "widget load failed");
                self.boundary.fail("load", WidgetFailure::from_load(&err));
                self.phase = Phase::LoadFailed;
            }
        }
    }
}

impl Drop for WidgetMount {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for WidgetMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetMount")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("alive", &self.is_alive())
            .field("boundary", self.boundary.state())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// HTML
// =============================================================================

fn state_attr(state: RenderState) -> &'static str {
    match state {
        RenderState::External => "external",
        RenderState::Loading => "loading",
        RenderState::Ready => "ready",
        RenderState::Failed => "failed",
        RenderState::Unmounted => "unmounted",
    }
}

fn frame_html(key: &str, state: RenderState, body: &str) -> String {
    format!(
        "<section class=\"demo\" data-demo=\"{key}\" data-state=\"{state}\">{body}</section>",
        key = escape_html(key),
        state = state_attr(state),
    )
}

fn loading_html() -> String {
    format!("<p class=\"demo__loading\" aria-busy=\"true\">{LOADING_MESSAGE}</p>")
}

fn external_html(key: &str, entry: Option<&WidgetEntry>) -> String {
    let subdomain = entry
        .and_then(|e| e.subdomain.as_deref())
        .map(|s| format!(" data-subdomain=\"{}\"", escape_html(s)))
        .unwrap_or_default();
    format!(
        "<section class=\"demo demo--external\" data-demo=\"{key}\" data-state=\"external\"{subdomain}>\
         <p class=\"demo__external\">{EXTERNAL_PLACEHOLDER}</p></section>",
        key = escape_html(key),
    )
}

#[cfg(test)]
#[path = "mount_test.rs"]
mod tests;
