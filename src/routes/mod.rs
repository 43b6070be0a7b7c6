//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The portfolio pages talk to this router: `/api/widgets` exposes the
//! registry, `/api/mounts` drives long-lived server-side mounts, and
//! `/demos/{key}` renders a demo once into a standalone HTML page.

pub mod demos;
pub mod mounts;
pub mod widgets;

use axum::Router;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::{ApiError, ErrorCode};
use crate::mount::MountError;
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/widgets", get(widgets::list_widgets))
        .route("/api/widgets/{key}", get(widgets::get_widget))
        .route("/api/mounts", post(mounts::create_mount))
        .route("/api/mounts/{id}", get(mounts::get_mount).delete(mounts::delete_mount))
        .route("/api/mounts/{id}/events", post(mounts::dispatch_event))
        .route("/api/mounts/{id}/retry", post(mounts::retry_mount))
        .route("/demos/{key}", get(demos::render_demo))
        .route("/healthz", get(healthz))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("widget not found: {0}")]
    WidgetNotFound(String),
    #[error("mount not found: {0}")]
    MountNotFound(Uuid),
    #[error(transparent)]
    Mount(#[from] MountError),
}

impl ErrorCode for RouteError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WidgetNotFound(_) => "E_WIDGET_NOT_FOUND",
            Self::MountNotFound(_) => "E_MOUNT_NOT_FOUND",
            Self::Mount(err) => err.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Mount(err) => err.retryable(),
            _ => false,
        }
    }
}

impl RouteError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::WidgetNotFound(_) | Self::MountNotFound(_) => StatusCode::NOT_FOUND,
            Self::Mount(MountError::NotReady | MountError::External(_)) => StatusCode::CONFLICT,
            Self::Mount(MountError::Unmounted) => StatusCode::GONE,
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        ApiError::from_code(self.status(), &self).into_response()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
