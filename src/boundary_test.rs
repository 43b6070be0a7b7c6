use super::*;
use crate::state::test_helpers::capture_logs;

fn boundary() -> ErrorBoundary {
    ErrorBoundary::new("widget=test", true)
}

// =============================================================================
// run
// =============================================================================

#[test]
fn starts_healthy() {
    let b = boundary();
    assert_eq!(b.state(), &BoundaryState::Healthy);
    assert!(!b.has_failed());
    assert!(b.last_error().is_none());
    assert_eq!(b.failure_count(), 0);
}

#[test]
fn run_ok_returns_value_and_stays_healthy() {
    let mut b = boundary();
    assert_eq!(b.run("render", || Ok(7)), Some(7));
    assert!(!b.has_failed());
}

#[test]
fn run_error_fails_boundary() {
    let mut b = boundary();
    let out: Option<()> = b.run("render", || Err(WidgetError::Runtime("boom".into())));
    assert!(out.is_none());
    assert!(b.has_failed());
    let failure = b.last_error().unwrap();
    assert_eq!(failure.kind, FailureKind::Error);
    assert_eq!(failure.message, "boom");
}

#[test]
fn run_panic_is_contained() {
    let mut b = boundary();
    let out: Option<()> = b.run("event", || panic!("kaboom"));
    assert!(out.is_none());
    let failure = b.last_error().unwrap();
    assert_eq!(failure.kind, FailureKind::Panic);
    assert_eq!(failure.message, "kaboom");
}

#[test]
fn run_formatted_panic_message_is_captured() {
    let mut b = boundary();
    let code = 42;
    let _: Option<()> = b.run("render", || panic!("bad state {code}"));
    assert_eq!(b.last_error().unwrap().message, "bad state 42");
}

#[test]
fn run_skips_op_while_failed() {
    let mut b = boundary();
    let _: Option<()> = b.run("render", || Err(WidgetError::Runtime("first".into())));
    let mut called = false;
    let out = b.run("render", || {
        called = true;
        Ok(())
    });
    assert!(out.is_none());
    assert!(!called);
}

// =============================================================================
// fail / retry
// =============================================================================

#[test]
fn fail_keeps_first_error() {
    let mut b = boundary();
    b.fail("load", WidgetFailure::from_load(&LoadError::TimedOut { ms: 1 }));
    b.fail("render", WidgetFailure::from_error(&WidgetError::Runtime("later".into())));
    assert_eq!(b.last_error().unwrap().kind, FailureKind::Load);
    assert_eq!(b.failure_count(), 1);
}

#[test]
fn retry_returns_to_healthy() {
    let mut b = boundary();
    let _: Option<()> = b.run("render", || Err(WidgetError::Runtime("boom".into())));
    assert!(b.retry());
    assert_eq!(b.state(), &BoundaryState::Healthy);
    assert_eq!(b.run("render", || Ok("again")), Some("again"));
}

#[test]
fn retry_on_healthy_is_noop() {
    let mut b = boundary();
    assert!(!b.retry());
    assert_eq!(b.state(), &BoundaryState::Healthy);
}

#[test]
fn recurring_fault_fails_again_without_auto_retry() {
    let mut b = boundary();
    let mut attempts = 0;
    for _ in 0..3 {
        let _: Option<()> = b.run("render", || {
            attempts += 1;
            Err(WidgetError::Runtime("still broken".into()))
        });
        assert!(b.has_failed());
        b.retry();
    }
    // One attempt per explicit retry cycle, never more.
    assert_eq!(attempts, 3);
    assert_eq!(b.failure_count(), 3);
}

#[test]
fn diagnostics_disabled_still_fails() {
    let mut b = ErrorBoundary::new("widget=quiet", false);
    let _: Option<()> = b.run("render", || Err(WidgetError::Runtime("hidden".into())));
    assert!(b.has_failed());
}

// =============================================================================
// diagnostics
// =============================================================================

#[test]
fn failure_logs_demo_error_line_with_context() {
    let mut b = boundary();
    let (_, logs) = capture_logs(|| {
        let _: Option<()> = b.run("render", || Err(WidgetError::Runtime("boom".into())));
    });
    assert!(logs.contains("[DemoError] boom widget=test phase=render"));
}

#[test]
fn quiet_boundary_logs_nothing() {
    let mut b = ErrorBoundary::new("widget=quiet", false);
    let (_, logs) = capture_logs(|| {
        let _: Option<()> = b.run("render", || Err(WidgetError::Runtime("boom".into())));
    });
    assert!(b.has_failed());
    assert!(logs.is_empty(), "unexpected output: {logs}");
}

#[test]
fn quiet_boundary_silences_panic_hook_during_run() {
    let mut b = ErrorBoundary::new("widget=quiet", false);
    let mut silenced = false;
    let (_, logs) = capture_logs(|| {
        let _: Option<()> = b.run("render", || -> Result<(), WidgetError> {
            silenced = panics_silenced();
            panic!("hidden detail")
        });
    });
    assert!(silenced);
    assert!(QUIET_HOOK.is_completed());
    assert!(!panics_silenced());
    assert_eq!(b.last_error().unwrap().kind, FailureKind::Panic);
    assert!(!logs.contains("hidden detail"));
}

#[test]
fn diagnostic_boundary_leaves_panic_hook_alone() {
    let mut b = boundary();
    let mut silenced = true;
    let _: Option<()> = b.run("render", || -> Result<(), WidgetError> {
        silenced = panics_silenced();
        panic!("visible")
    });
    assert!(!silenced);
}

// =============================================================================
// fallback
// =============================================================================

#[test]
fn fallback_contains_message_and_retry_control() {
    let html = boundary().fallback_html();
    assert!(html.contains(FALLBACK_MESSAGE));
    assert!(html.contains("data-action=\"retry\""));
    assert!(html.contains(RETRY_LABEL));
}

#[test]
fn failure_display_is_message() {
    let failure = WidgetFailure::from_error(&WidgetError::Runtime("nope".into()));
    assert_eq!(failure.to_string(), "nope");
}

#[test]
fn non_string_panic_payload_gets_generic_message() {
    let payload: Box<dyn Any + Send> = Box::new(17_u8);
    let failure = WidgetFailure::from_panic(payload.as_ref());
    assert_eq!(failure.message, "widget panicked");
}
