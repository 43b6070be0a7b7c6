//! Click counter demo. The count lives in the mount's session scope, so it
//! survives a boundary retry but not an unmount.

use serde_json::{Value, json};

use super::{Widget, WidgetError, WidgetEvent};
use crate::scope::SessionScope;

pub const COUNT_KEY: &str = "counter.value";

#[derive(Debug, Default)]
pub struct CounterWidget;

impl CounterWidget {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn count(scope: &SessionScope) -> i64 {
        scope.get(COUNT_KEY).and_then(Value::as_i64).unwrap_or(0)
    }
}

impl Widget for CounterWidget {
    fn render(&mut self, scope: &mut SessionScope) -> Result<String, WidgetError> {
        let count = Self::count(scope);
        Ok(format!(
            "<div class=\"counter\">\
             <output class=\"counter__value\">{count}</output>\
             <button type=\"button\" data-event=\"increment\">+1</button>\
             <button type=\"button\" data-event=\"reset\">Reset</button>\
             </div>"
        ))
    }

    fn handle_event(&mut self, event: &WidgetEvent, scope: &mut SessionScope) -> Result<(), WidgetError> {
        match event.name.as_str() {
            "increment" => {
                let by = match event.payload.get("by") {
                    None | Some(Value::Null) => 1,
                    Some(v) => v.as_i64().ok_or_else(|| WidgetError::InvalidPayload {
                        event: event.name.clone(),
                        reason: "'by' must be an integer".into(),
                    })?,
                };
                let next = Self::count(scope)
                    .checked_add(by)
                    .ok_or_else(|| WidgetError::Runtime("counter overflow".into()))?;
                scope.set(COUNT_KEY, json!(next));
            }
            "reset" => {
                scope.set(COUNT_KEY, json!(0));
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "counter_test.rs"]
mod tests;
