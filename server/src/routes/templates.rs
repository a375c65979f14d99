//! Stateless template routes: inspect a template's form, fill it in one shot.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use stencil::field::{FieldValues, FormField};
use stencil::form::{self, AutoPolicy, FilledTemplate, FormIssue, FormState};
use stencil::store::EditorStore;
use stencil::svg::SvgElement;

use super::generate::with_rng;
use crate::error::{self, ApiError};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidId {
    pub internal_id: String,
    pub error: String,
}

pub(crate) fn invalid_ids(store: &EditorStore) -> Vec<InvalidId> {
    store
        .invalid_ids()
        .into_iter()
        .map(|(internal_id, error)| InvalidId { internal_id, error })
        .collect()
}

#[derive(Deserialize)]
pub struct InspectBody {
    pub svg: String,
}

#[derive(Serialize)]
pub struct InspectResponse {
    pub elements: Vec<SvgElement>,
    pub fields: Vec<FormField>,
    pub invalid_ids: Vec<InvalidId>,
    pub issues: Vec<FormIssue>,
    /// Field ids in evaluation order; fields caught in a cycle come last.
    pub evaluation_order: Vec<String>,
}

/// `POST /api/templates/inspect`: elements, form fields and problems of a
/// template.
///
/// # Errors
///
/// Rejects oversized or malformed documents.
pub async fn inspect(
    State(state): State<AppState>,
    Json(body): Json<InspectBody>,
) -> Result<Json<InspectResponse>, ApiError> {
    error::check_svg_size(&body.svg, state.config.max_svg_bytes)?;
    let mut store = EditorStore::new();
    store.load(&body.svg)?;

    let elements = store.snapshot();
    let form = FormState::from_elements(&elements, state.config.auto_policy);
    let (mut evaluation_order, cycles) = form.dependency_order();
    evaluation_order.extend(cycles.into_iter().flatten());

    Ok(Json(InspectResponse {
        fields: form.fields().cloned().collect(),
        invalid_ids: invalid_ids(&store),
        issues: form.issues(),
        evaluation_order,
        elements,
    }))
}

#[derive(Deserialize)]
pub struct FillBody {
    pub svg: String,
    #[serde(default)]
    pub values: FieldValues,
    pub seed: Option<u64>,
    /// Overrides the server's configured policy.
    pub auto_policy: Option<AutoPolicy>,
}

/// `POST /api/templates/fill`: fill a template from a value map.
///
/// # Errors
///
/// Rejects oversized or malformed documents.
pub async fn fill(State(state): State<AppState>, Json(body): Json<FillBody>) -> Result<Json<FilledTemplate>, ApiError> {
    error::check_svg_size(&body.svg, state.config.max_svg_bytes)?;
    let policy = body.auto_policy.unwrap_or(state.config.auto_policy);
    let filled = with_rng(body.seed, |rng| form::fill_template(&body.svg, &body.values, policy, rng))?;
    Ok(Json(filled))
}

#[cfg(test)]
#[path = "templates_test.rs"]
mod tests;
