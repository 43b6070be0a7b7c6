//! Error isolation boundary around a mounted widget.
//!
//! DESIGN
//! ======
//! Two-state machine: `Healthy` → `Failed` when a guarded render or event
//! call returns `Err` or panics; `Failed` → `Healthy` only through `retry`.
//! While failed, guarded calls are skipped and the host renders
//! `fallback_html` instead of the widget.
//!
//! Retry is user-driven. The boundary never retries on its own, so a widget
//! that keeps failing lands back in `Failed` on the next guarded call.
//!
//! QUIET MODE
//! ==========
//! With diagnostics off, panics inside `run` are also kept off stderr. A
//! process-wide panic hook is chained in front of the existing one on first
//! use and stays silent while the current thread is inside a quiet `run`.
//!
//! LIMITATIONS
//! ===========
//! Only synchronous work inside `run` is observed. Failures in tasks a widget
//! spawns elsewhere are invisible here until they surface during a later
//! render.

use std::any::Any;
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Once;

use serde::Serialize;
use tracing::error;

use crate::widgets::{LoadError, WidgetError};

pub const FALLBACK_MESSAGE: &str = "Something went wrong with this demo.";
pub const RETRY_LABEL: &str = "Try again";

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

fn install_quiet_panic_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// True while the current thread runs a widget call with panic output suppressed.
pub(crate) fn panics_silenced() -> bool {
    QUIET_PANICS.with(Cell::get)
}

/// Silences the panic hook on this thread until dropped.
struct QuietPanics {
    previous: bool,
}

impl QuietPanics {
    fn enter() -> Self {
        install_quiet_panic_hook();
        Self { previous: QUIET_PANICS.with(|q| q.replace(true)) }
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        QUIET_PANICS.with(|q| q.set(self.previous));
    }
}

// =============================================================================
// FAILURE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The widget returned an error.
    Error,
    /// The widget panicked.
    Panic,
    /// The widget implementation could not be loaded.
    Load,
}

/// Captured error value of a failed boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl WidgetFailure {
    #[must_use]
    pub fn from_error(err: &WidgetError) -> Self {
        Self { kind: FailureKind::Error, message: err.to_string() }
    }

    #[must_use]
    pub fn from_load(err: &LoadError) -> Self {
        Self { kind: FailureKind::Load, message: err.to_string() }
    }

    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "widget panicked".to_string()
        };
        Self { kind: FailureKind::Panic, message }
    }
}

impl std::fmt::Display for WidgetFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// =============================================================================
// BOUNDARY
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BoundaryState {
    #[default]
    Healthy,
    Failed(WidgetFailure),
}

#[derive(Debug)]
pub struct ErrorBoundary {
    state: BoundaryState,
    /// Appended to diagnostic lines, e.g. `widget=terminal mount=<id>`.
    context: String,
    diagnostics: bool,
    failures: u64,
}

impl ErrorBoundary {
    #[must_use]
    pub fn new(context: impl Into<String>, diagnostics: bool) -> Self {
        Self { state: BoundaryState::Healthy, context: context.into(), diagnostics, failures: 0 }
    }

    #[must_use]
    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        matches!(self.state, BoundaryState::Failed(_))
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&WidgetFailure> {
        match &self.state {
            BoundaryState::Failed(failure) => Some(failure),
            BoundaryState::Healthy => None,
        }
    }

    /// Total `Healthy → Failed` transitions over the boundary's lifetime.
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.failures
    }

    /// Run `op` under the boundary. Returns `None` without calling `op` when
    /// already failed, or when `op` errors or panics (the boundary fails).
    pub fn run<T>(&mut self, phase: &str, op: impl FnOnce() -> Result<T, WidgetError>) -> Option<T> {
        if self.has_failed() {
            return None;
        }
        let outcome = {
            let _quiet = (!self.diagnostics).then(QuietPanics::enter);
            catch_unwind(AssertUnwindSafe(op))
        };
        match outcome {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                self.fail(phase, WidgetFailure::from_error(&err));
                None
            }
            Err(payload) => {
                self.fail(phase, WidgetFailure::from_panic(payload.as_ref()));
                None
            }
        }
    }

    /// Transition to `Failed` with `failure`. A boundary that is already
    /// failed keeps its first error.
    pub fn fail(&mut self, phase: &str, failure: WidgetFailure) {
        if self.has_failed() {
            return;
        }
        if self.diagnostics {
            error!("[DemoError] {failure} {} phase={phase} kind={:?}", self.context, failure.kind);
        }
        self.failures += 1;
        self.state = BoundaryState::Failed(failure);
    }

    /// `Failed → Healthy`. Returns `false` if the boundary was healthy.
    pub fn retry(&mut self) -> bool {
        if !self.has_failed() {
            return false;
        }
        self.state = BoundaryState::Healthy;
        true
    }

    /// Fixed fallback shown in place of a failed widget.
    #[must_use]
    pub fn fallback_html(&self) -> String {
        format!(
            "<div class=\"demo-error\" role=\"alert\">\
             <p class=\"demo-error__message\">{FALLBACK_MESSAGE}</p>\
             <button type=\"button\" data-action=\"retry\">{RETRY_LABEL}</button>\
             </div>"
        )
    }
}

#[cfg(test)]
#[path = "boundary_test.rs"]
mod tests;
