//! One-shot demo pages.

use axum::extract::{Path, State};
use axum::response::Html;

use crate::state::AppState;
use crate::widgets::escape_html;

/// `GET /demos/:key` — mount, wait for the load, render once, unmount.
///
/// Always answers 200: unknown keys render the external placeholder and
/// failures render the boundary fallback.
pub async fn render_demo(State(state): State<AppState>, Path(key): Path<String>) -> Html<String> {
    let mut mount = state.host.mount(&key);
    mount.ready().await;
    let rendered = mount.render();
    mount.unmount();

    let title = mount.entry().map_or(key.as_str(), |entry| entry.title.as_str());
    Html(page_html(title, &rendered.html))
}

fn page_html(title: &str, body: &str) -> String {
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body>{body}</body></html>",
        title = escape_html(title),
    )
}

#[cfg(test)]
#[path = "demos_test.rs"]
mod tests;
