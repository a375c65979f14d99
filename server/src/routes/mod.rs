//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stateless endpoints (id grammar, generation, template inspect/fill) sit
//! beside the editor session endpoints under `/api`. Everything speaks JSON
//! except the SVG downloads, which return `image/svg+xml`.

pub mod editor;
pub mod generate;
pub mod ids;
pub mod templates;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// JSON framing and the value map on top of the SVG itself.
const BODY_OVERHEAD_BYTES: usize = 256 * 1024;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = state.config.max_svg_bytes.saturating_add(BODY_OVERHEAD_BYTES);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/ids/parse", post(ids::parse))
        .route("/api/ids/suggest", post(ids::suggest))
        .route("/api/generate", post(generate::generate))
        .route("/api/extract", post(generate::extract))
        .route("/api/templates/inspect", post(templates::inspect))
        .route("/api/templates/fill", post(templates::fill))
        .route("/api/editor", post(editor::open))
        .route("/api/editor/{id}", get(editor::snapshot).delete(editor::close))
        .route(
            "/api/editor/{id}/elements/{internal_id}",
            patch(editor::update_element).delete(editor::delete_element),
        )
        .route("/api/editor/{id}/elements/{internal_id}/duplicate", post(editor::duplicate_element))
        .route("/api/editor/{id}/reorder", post(editor::reorder))
        .route("/api/editor/{id}/options", post(editor::set_option))
        .route("/api/editor/{id}/select", post(editor::select))
        .route("/api/editor/{id}/undo", post(editor::undo))
        .route("/api/editor/{id}/redo", post(editor::redo))
        .route("/api/editor/{id}/svg", get(editor::svg))
        .route("/api/editor/{id}/preview", get(editor::preview))
        .route("/api/editor/{id}/preview/{internal_id}", get(editor::preview_element))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
