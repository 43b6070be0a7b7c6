//! Server-side mount routes.
//!
//! DESIGN
//! ======
//! Mounts live in `AppState::mounts` until deleted or swept for idleness.
//! Handlers look up the mount's own handle and lock only that mount.
//! `create_mount` with `wait=true` awaits readiness before inserting.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::RouteError;
use crate::mount::RenderedWidget;
use crate::state::AppState;
use crate::widgets::WidgetEvent;

#[derive(Debug, Deserialize)]
pub struct CreateMountBody {
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateMountQuery {
    /// Await the widget load before responding.
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
pub struct MountResponse {
    pub id: Uuid,
    pub key: String,
    pub rendered: RenderedWidget,
}

/// `POST /api/mounts` — mount a widget by key.
///
/// Unknown keys still mount; they render the external placeholder.
pub async fn create_mount(
    State(state): State<AppState>,
    Query(query): Query<CreateMountQuery>,
    Json(body): Json<CreateMountBody>,
) -> (StatusCode, Json<MountResponse>) {
    let mut mount = state.host.mount(&body.key);
    if query.wait {
        mount.ready().await;
    }
    let id = mount.id();
    let rendered = mount.render();
    state.insert_mount(mount).await;

    (StatusCode::CREATED, Json(MountResponse { id, key: body.key, rendered }))
}

/// `GET /api/mounts/:id` — render the mount's current state.
pub async fn get_mount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderedWidget>, RouteError> {
    let handle = state.mount_handle(id).await.ok_or(RouteError::MountNotFound(id))?;
    let mut mount = handle.lock().await;
    Ok(Json(mount.render()))
}

/// `POST /api/mounts/:id/events` — forward a user event.
pub async fn dispatch_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<WidgetEvent>,
) -> Result<Json<RenderedWidget>, RouteError> {
    let handle = state.mount_handle(id).await.ok_or(RouteError::MountNotFound(id))?;
    let mut mount = handle.lock().await;
    Ok(Json(mount.dispatch(&event)?))
}

/// `POST /api/mounts/:id/retry` — the fallback's "Try again" control.
pub async fn retry_mount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RenderedWidget>, RouteError> {
    let handle = state.mount_handle(id).await.ok_or(RouteError::MountNotFound(id))?;
    let mut mount = handle.lock().await;
    Ok(Json(mount.retry()?))
}

/// `DELETE /api/mounts/:id` — unmount and forget.
pub async fn delete_mount(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, RouteError> {
    let handle = state.remove_mount(id).await.ok_or(RouteError::MountNotFound(id))?;
    handle.lock().await.unmount();
    info!(mount_id = %id, "mount deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "mounts_test.rs"]
mod tests;
