//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the widget host (read-only registry + bound implementations) and the
//! live server-side mounts keyed by mount ID. Each mount owns its own session
//! scope; the only thing mounts share is the registry.
//!
//! LOCKING
//! =======
//! The map lock only guards membership. Each mount sits behind its own
//! `Mutex`; handlers clone the handle, drop the map lock, then lock the
//! mount, so a slow widget never holds up requests for other mounts.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::ShellConfig;
use crate::mount::{MountOptions, WidgetHost, WidgetMount};
use crate::registry::WidgetRegistry;
use crate::widgets::WidgetCatalog;

/// One live mount. A `Mutex` rather than `RwLock`: widgets are `Send` but
/// not `Sync`, and every access mutates anyway.
pub type MountHandle = Arc<Mutex<WidgetMount>>;

/// Live mounts by ID.
pub type MountMap = Arc<Mutex<HashMap<Uuid, MountHandle>>>;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ShellConfig>,
    pub host: WidgetHost,
    pub mounts: MountMap,
}

impl AppState {
    #[must_use]
    pub fn new(config: ShellConfig, registry: WidgetRegistry, catalog: WidgetCatalog) -> Self {
        let options = MountOptions::from_config(&config);
        Self {
            config: Arc::new(config),
            host: WidgetHost::new(Arc::new(registry), Arc::new(catalog), options),
            mounts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Track `mount` and return its handle.
    pub async fn insert_mount(&self, mount: WidgetMount) -> MountHandle {
        let id = mount.id();
        let handle = Arc::new(Mutex::new(mount));
        self.mounts.lock().await.insert(id, Arc::clone(&handle));
        handle
    }

    /// Handle for mount `id`. The map lock is released before returning.
    pub async fn mount_handle(&self, id: Uuid) -> Option<MountHandle> {
        self.mounts.lock().await.get(&id).cloned()
    }

    /// Stop tracking mount `id`, returning its handle.
    pub async fn remove_mount(&self, id: Uuid) -> Option<MountHandle> {
        self.mounts.lock().await.remove(&id)
    }

    /// Number of live server-side mounts.
    pub async fn mount_count(&self) -> usize {
        self.mounts.lock().await.len()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
