//! Editor session routes.
//!
//! Each route resolves the session, runs one store operation under the
//! session lock and returns the result. Mutations take an optional `record`
//! flag (default `true`); `false` applies the change without an undo entry,
//! for values still being typed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use stencil::field::FormField;
use stencil::history::{ElementField, Patch};
use stencil::store::EditorStore;
use stencil::svg::SvgElement;
use uuid::Uuid;

use super::templates::{InvalidId, invalid_ids};
use crate::error::ApiError;
use crate::services::session;
use crate::state::AppState;

fn default_record() -> bool {
    true
}

fn svg_response(svg: String) -> Response {
    ([(CONTENT_TYPE, "image/svg+xml; charset=utf-8")], svg).into_response()
}

// =============================================================================
// SESSION LIFECYCLE
// =============================================================================

#[derive(Deserialize)]
pub struct OpenBody {
    pub svg: String,
}

#[derive(Debug, Serialize)]
pub struct OpenResponse {
    pub id: Uuid,
    pub elements: usize,
}

/// `POST /api/editor`: open an editor session on an SVG document.
///
/// # Errors
///
/// Rejects oversized or malformed documents, and new sessions past the limit.
pub async fn open(
    State(state): State<AppState>,
    Json(body): Json<OpenBody>,
) -> Result<(StatusCode, Json<OpenResponse>), ApiError> {
    let (id, elements) = session::open_session(&state, &body.svg).await?;
    Ok((StatusCode::CREATED, Json(OpenResponse { id, elements })))
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub elements: Vec<SvgElement>,
    pub order: Vec<String>,
    pub selected: Option<String>,
    pub history: HistoryState,
    pub fields: Vec<FormField>,
    pub invalid_ids: Vec<InvalidId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryState {
    pub index: Option<usize>,
    pub len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl HistoryState {
    fn of(store: &EditorStore) -> Self {
        Self {
            index: store.history_index(),
            len: store.history_len(),
            can_undo: store.can_undo(),
            can_redo: store.can_redo(),
        }
    }
}

/// `GET /api/editor/{id}`: full session snapshot.
///
/// # Errors
///
/// Returns `ApiError::SessionNotFound` for an unknown session.
pub async fn snapshot(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = session::with_session(&state, id, |store| {
        Ok(SessionSnapshot {
            id,
            elements: store.snapshot(),
            order: store.order().to_vec(),
            selected: store.selected().map(str::to_owned),
            history: HistoryState::of(store),
            fields: store.fields(),
            invalid_ids: invalid_ids(store),
        })
    })
    .await?;
    Ok(Json(snapshot))
}

/// `DELETE /api/editor/{id}`: close a session.
///
/// # Errors
///
/// Returns `ApiError::SessionNotFound` for an unknown session.
pub async fn close(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    session::close_session(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// ELEMENT MUTATIONS
// =============================================================================

#[derive(Deserialize)]
pub struct ElementChange {
    pub field: ElementField,
    /// `None` removes the attribute, style property, text or id.
    pub value: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateElementBody {
    pub changes: Vec<ElementChange>,
    #[serde(default = "default_record")]
    pub record: bool,
}

#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    /// Effective changes; no-ops are dropped.
    pub patches: Vec<Patch>,
    pub element: SvgElement,
    pub history: HistoryState,
}

/// `PATCH /api/editor/{id}/elements/{internal_id}`: change one element.
///
/// # Errors
///
/// Returns not-found errors for an unknown session or element.
pub async fn update_element(
    State(state): State<AppState>,
    Path((id, internal_id)): Path<(Uuid, String)>,
    Json(body): Json<UpdateElementBody>,
) -> Result<Json<UpdateResponse>, ApiError> {
    let changes = body.changes.into_iter().map(|c| (c.field, c.value)).collect();
    let response = session::with_session(&state, id, |store| {
        let patches = store.update_element(&internal_id, changes, body.record)?;
        let element = store
            .element(&internal_id)
            .cloned()
            .ok_or_else(|| ApiError::BadRequest(format!("element vanished: {internal_id}")))?;
        Ok(UpdateResponse { patches, element, history: HistoryState::of(store) })
    })
    .await?;
    Ok(Json(response))
}

/// `?record=false` for structural edits that should skip the undo log.
#[derive(Deserialize)]
pub struct RecordQuery {
    #[serde(default = "default_record")]
    pub record: bool,
}

/// `DELETE /api/editor/{id}/elements/{internal_id}`: remove one element.
/// Returns the removed element.
///
/// # Errors
///
/// Returns not-found errors for an unknown session or element.
pub async fn delete_element(
    State(state): State<AppState>,
    Path((id, internal_id)): Path<(Uuid, String)>,
    Query(query): Query<RecordQuery>,
) -> Result<Json<SvgElement>, ApiError> {
    let removed =
        session::with_session(&state, id, |store| Ok(store.delete_element(&internal_id, query.record)?)).await?;
    Ok(Json(removed))
}

#[derive(Debug, Serialize)]
pub struct DuplicateResponse {
    pub internal_id: String,
    pub element: SvgElement,
}

/// `POST /api/editor/{id}/elements/{internal_id}/duplicate`: copy an element
/// right after itself.
///
/// # Errors
///
/// Returns not-found errors for an unknown session or element.
pub async fn duplicate_element(
    State(state): State<AppState>,
    Path((id, internal_id)): Path<(Uuid, String)>,
    Query(query): Query<RecordQuery>,
) -> Result<(StatusCode, Json<DuplicateResponse>), ApiError> {
    let response = session::with_session(&state, id, |store| {
        let new_id = store.duplicate_element(&internal_id, query.record)?;
        let element = store
            .element(&new_id)
            .cloned()
            .ok_or_else(|| ApiError::BadRequest(format!("copy vanished: {new_id}")))?;
        Ok(DuplicateResponse { internal_id: new_id, element })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Deserialize)]
pub struct ReorderBody {
    pub order: Vec<String>,
    #[serde(default = "default_record")]
    pub record: bool,
}

/// `POST /api/editor/{id}/reorder`: replace the element order.
///
/// # Errors
///
/// Returns `E_INVALID_ORDER` unless the order is a permutation of the
/// current one.
pub async fn reorder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReorderBody>,
) -> Result<Json<Vec<String>>, ApiError> {
    let order = session::with_session(&state, id, |store| {
        store.reorder_elements(body.order, body.record)?;
        Ok(store.order().to_vec())
    })
    .await?;
    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct OptionBody {
    pub base_id: String,
    pub value: String,
    #[serde(default = "default_record")]
    pub record: bool,
}

#[derive(Debug, Serialize)]
pub struct OptionResponse {
    /// Number of option elements whose visibility changed.
    pub changed: usize,
}

/// `POST /api/editor/{id}/options`: show one member of an option group.
///
/// # Errors
///
/// Returns not-found errors for an unknown session or option group.
pub async fn set_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<OptionBody>,
) -> Result<Json<OptionResponse>, ApiError> {
    let changed = session::with_session(&state, id, |store| {
        Ok(store.set_option_selection(&body.base_id, &body.value, body.record)?)
    })
    .await?;
    Ok(Json(OptionResponse { changed }))
}

#[derive(Deserialize)]
pub struct SelectBody {
    pub internal_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub selected: Option<String>,
}

/// `POST /api/editor/{id}/select`: set or clear the selection.
///
/// # Errors
///
/// Returns not-found errors for an unknown session or element.
pub async fn select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<SelectBody>,
) -> Result<Json<SelectResponse>, ApiError> {
    let selected = session::with_session(&state, id, |store| {
        store.select(body.internal_id.as_deref())?;
        Ok(store.selected().map(str::to_owned))
    })
    .await?;
    Ok(Json(SelectResponse { selected }))
}

// =============================================================================
// HISTORY
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    /// Whether a batch was applied.
    pub applied: bool,
    pub history: HistoryState,
}

/// `POST /api/editor/{id}/undo`
///
/// # Errors
///
/// Returns `ApiError::SessionNotFound` for an unknown session.
pub async fn undo(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<HistoryResponse>, ApiError> {
    let response = session::with_session(&state, id, |store| {
        let applied = store.undo();
        Ok(HistoryResponse { applied, history: HistoryState::of(store) })
    })
    .await?;
    Ok(Json(response))
}

/// `POST /api/editor/{id}/redo`
///
/// # Errors
///
/// Returns `ApiError::SessionNotFound` for an unknown session.
pub async fn redo(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<HistoryResponse>, ApiError> {
    let response = session::with_session(&state, id, |store| {
        let applied = store.redo();
        Ok(HistoryResponse { applied, history: HistoryState::of(store) })
    })
    .await?;
    Ok(Json(response))
}

// =============================================================================
// OUTPUT
// =============================================================================

/// `GET /api/editor/{id}/svg`: the regenerated document.
///
/// # Errors
///
/// Returns `ApiError::SessionNotFound` for an unknown session.
pub async fn svg(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, ApiError> {
    let svg = session::with_session(&state, id, |store| Ok(store.regenerate()?)).await?;
    Ok(svg_response(svg))
}

/// `GET /api/editor/{id}/preview`: live preview with the selection
/// highlighted.
///
/// # Errors
///
/// Returns `ApiError::SessionNotFound` for an unknown session.
pub async fn preview(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, ApiError> {
    let svg = session::with_session(&state, id, |store| Ok(store.live_view()?.to_svg())).await?;
    Ok(svg_response(svg))
}

/// `GET /api/editor/{id}/preview/{internal_id}`: live preview with one element
/// highlighted. The selection is left alone.
///
/// # Errors
///
/// Returns not-found errors for an unknown session or element.
pub async fn preview_element(
    State(state): State<AppState>,
    Path((id, internal_id)): Path<(Uuid, String)>,
) -> Result<Response, ApiError> {
    let svg = session::with_session(&state, id, |store| Ok(store.live_view_with(Some(&internal_id))?.to_svg())).await?;
    Ok(svg_response(svg))
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
