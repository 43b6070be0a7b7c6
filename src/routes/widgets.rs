//! Registry listing routes.

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;

use super::RouteError;
use crate::registry::WidgetEntry;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WidgetResponse {
    pub key: String,
    pub title: String,
    pub description: Option<String>,
    pub subdomain: Option<String>,
    pub port: Option<u16>,
    /// Whether the demo renders in-page rather than as an external placeholder.
    pub local: bool,
}

fn to_response(state: &AppState, entry: &WidgetEntry) -> WidgetResponse {
    WidgetResponse {
        key: entry.key.clone(),
        title: entry.title.clone(),
        description: entry.description.clone(),
        subdomain: entry.subdomain.clone(),
        port: entry.port,
        local: state.host.has_implementation(&entry.key),
    }
}

/// `GET /api/widgets` — registry entries in registration order.
pub async fn list_widgets(State(state): State<AppState>) -> Json<Vec<WidgetResponse>> {
    let entries = state.host.registry().list();
    Json(entries.iter().map(|entry| to_response(&state, entry)).collect())
}

/// `GET /api/widgets/:key` — a single registry entry.
pub async fn get_widget(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<WidgetResponse>, RouteError> {
    let entry = state
        .host
        .registry()
        .lookup(&key)
        .ok_or_else(|| RouteError::WidgetNotFound(key.clone()))?;
    Ok(Json(to_response(&state, entry)))
}

#[cfg(test)]
#[path = "widgets_test.rs"]
mod tests;
