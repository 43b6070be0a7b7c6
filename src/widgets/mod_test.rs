use serde_json::json;

use super::*;

// =============================================================================
// escape_html
// =============================================================================

#[test]
fn escape_html_replaces_markup() {
    assert_eq!(escape_html("<a href=\"x\">'&'</a>"), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
}

#[test]
fn escape_html_plain_text_unchanged() {
    assert_eq!(escape_html("hello world"), "hello world");
}

// =============================================================================
// WidgetEvent
// =============================================================================

#[test]
fn event_deserializes_without_payload() {
    let event: WidgetEvent = serde_json::from_str(r#"{"name":"reset"}"#).unwrap();
    assert_eq!(event.name, "reset");
    assert!(event.payload.is_null());
}

#[test]
fn event_str_field_reports_missing_field() {
    let event = WidgetEvent::new("input", json!({"line": 5}));
    let err = event.str_field("line").unwrap_err();
    assert!(err.to_string().contains("missing string field 'line'"));
}

// =============================================================================
// WidgetFactory / catalog
// =============================================================================

#[test]
fn factory_builds_independent_instances() {
    let factory = WidgetFactory::new(CounterWidget::new);
    let mut scope_a = SessionScope::new([]);
    let mut scope_b = SessionScope::new([]);
    let mut a = factory.create();
    let mut b = factory.create();
    a.handle_event(&WidgetEvent::new("increment", json!({"by": 2})), &mut scope_a).unwrap();
    assert!(a.render(&mut scope_a).unwrap().contains(">2<"));
    assert!(b.render(&mut scope_b).unwrap().contains(">0<"));
}

#[test]
fn builtin_catalog_binds_shipped_widgets() {
    let catalog = WidgetCatalog::builtin();
    assert_eq!(catalog.keys(), ["counter", "terminal"]);
    assert!(catalog.contains("terminal"));
    assert!(catalog.loader("storefront").is_none());
}

#[tokio::test]
async fn builtin_loader_resolves_factory() {
    let catalog = WidgetCatalog::builtin();
    let loader = catalog.loader("terminal").unwrap();
    let factory = loader.load(&crate::registry::WidgetEntry::new("terminal", "Terminal")).await.unwrap();
    let mut scope = SessionScope::new([]);
    let html = factory.create().render(&mut scope).unwrap();
    assert!(html.contains("terminal__screen"));
}

#[test]
fn load_error_retryable_classification() {
    use crate::error::ErrorCode;
    assert!(LoadError::TimedOut { ms: 1 }.retryable());
    assert!(LoadError::Failed("x".into()).retryable());
    assert!(!LoadError::Aborted.retryable());
    assert_eq!(LoadError::Aborted.error_code(), "E_LOAD_ABORTED");
}
