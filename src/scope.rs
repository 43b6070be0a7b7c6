//! Per-mount session scope.
//!
//! DESIGN
//! ======
//! Every mount owns exactly one `SessionScope`. It is passed to the widget by
//! `&mut` reference on each render and event, never stored globally, so two
//! mounts of the same widget cannot observe each other's values.
//!
//! A scope holds plain JSON values plus resource handles. `destroy` releases
//! every handle once; later calls (and the `Drop` impl) are no-ops, which
//! makes teardown safe from any unmount path.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// A handle whose lifetime is bound to the owning scope.
pub trait ScopeResource: Send {
    /// Release the underlying resource. Called at most once per handle.
    fn release(&mut self);
}

pub struct SessionScope {
    id: Uuid,
    values: HashMap<String, Value>,
    resources: Vec<(String, Box<dyn ScopeResource>)>,
    released: bool,
}

impl SessionScope {
    #[must_use]
    pub fn new(initial: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self { id: Uuid::new_v4(), values: initial.into_iter().collect(), resources: Vec::new(), released: false }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Shorthand for boolean flags; missing or non-bool values read as `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Set a value, returning the previous one. Ignored once destroyed.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        if self.released {
            return None;
        }
        self.values.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Attach a resource released with the scope. Replaces (and releases) an
    /// existing resource under the same name. A destroyed scope releases the
    /// incoming handle immediately.
    pub fn attach(&mut self, name: impl Into<String>, mut resource: Box<dyn ScopeResource>) {
        let name = name.into();
        if self.released {
            resource.release();
            return;
        }
        if let Some(pos) = self.resources.iter().position(|(n, _)| *n == name) {
            let (_, mut old) = self.resources.remove(pos);
            old.release();
        }
        self.resources.push((name, resource));
    }

    #[must_use]
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.iter().any(|(n, _)| n == name)
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Release all resources in reverse attach order and clear values.
    /// Idempotent.
    pub fn destroy(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let count = self.resources.len();
        while let Some((_, mut resource)) = self.resources.pop() {
            resource.release();
        }
        self.values.clear();
        debug!(scope_id = %self.id, resources = count, "session scope destroyed");
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for SessionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionScope")
            .field("id", &self.id)
            .field("values", &self.values)
            .field("resources", &self.resources.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>())
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
#[path = "scope_test.rs"]
mod tests;
