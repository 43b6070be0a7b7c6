use super::*;

fn increment(by: Value) -> WidgetEvent {
    WidgetEvent::new("increment", json!({ "by": by }))
}

#[test]
fn render_starts_at_zero() {
    let mut scope = SessionScope::new([]);
    let html = CounterWidget::new().render(&mut scope).unwrap();
    assert!(html.contains("<output class=\"counter__value\">0</output>"));
}

#[test]
fn increment_defaults_to_one() {
    let mut scope = SessionScope::new([]);
    let mut widget = CounterWidget::new();
    widget.handle_event(&WidgetEvent::new("increment", Value::Null), &mut scope).unwrap();
    widget.handle_event(&WidgetEvent::new("increment", json!({})), &mut scope).unwrap();
    assert_eq!(scope.get(COUNT_KEY), Some(&json!(2)));
}

#[test]
fn increment_by_amount_and_reset() {
    let mut scope = SessionScope::new([]);
    let mut widget = CounterWidget::new();
    widget.handle_event(&increment(json!(5)), &mut scope).unwrap();
    assert!(widget.render(&mut scope).unwrap().contains(">5<"));

    widget.handle_event(&WidgetEvent::new("reset", Value::Null), &mut scope).unwrap();
    assert_eq!(scope.get(COUNT_KEY), Some(&json!(0)));
}

#[test]
fn count_survives_new_instance_with_same_scope() {
    let mut scope = SessionScope::new([]);
    CounterWidget::new().handle_event(&increment(json!(3)), &mut scope).unwrap();
    let html = CounterWidget::new().render(&mut scope).unwrap();
    assert!(html.contains(">3<"));
}

#[test]
fn non_integer_amount_is_invalid_payload() {
    let mut scope = SessionScope::new([]);
    let err = CounterWidget::new().handle_event(&increment(json!("lots")), &mut scope).unwrap_err();
    assert!(matches!(err, WidgetError::InvalidPayload { .. }));
}

#[test]
fn overflow_is_runtime_error() {
    let mut scope = SessionScope::new([(COUNT_KEY.to_string(), json!(i64::MAX))]);
    let err = CounterWidget::new().handle_event(&increment(json!(1)), &mut scope).unwrap_err();
    assert_eq!(err, WidgetError::Runtime("counter overflow".into()));
}
