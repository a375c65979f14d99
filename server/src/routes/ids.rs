//! Id grammar routes: parse/validate an element id and suggest next tokens.

use axum::response::Json;
use serde::{Deserialize, Serialize};
use stencil::field::FieldType;
use stencil::grammar::TokenDef;
use stencil::id::{self, IdIssue, ParsedId, Validation};

#[derive(Deserialize)]
pub struct ParseIdBody {
    pub id: String,
}

#[derive(Serialize)]
pub struct ParseIdResponse {
    pub parsed: ParsedId,
    /// Field type selected by the id, if it names one.
    pub field_type: Option<FieldType>,
    pub validation: Validation,
    /// Advisory issues that do not invalidate the id.
    pub warnings: Vec<IdIssue>,
}

/// `POST /api/ids/parse`: split and validate an element id.
pub async fn parse(Json(body): Json<ParseIdBody>) -> Json<ParseIdResponse> {
    let parsed = id::parse_id(&body.id);
    let validation = id::validate_parsed(&parsed);
    let warnings = validation.warnings().into_iter().cloned().collect();
    let field_type = parsed.field_type_key().and_then(FieldType::from_key);
    Json(ParseIdResponse { parsed, field_type, validation, warnings })
}

#[derive(Deserialize)]
pub struct SuggestBody {
    /// The id as typed so far; the text after the last `.` is the partial
    /// token being completed.
    pub input: String,
}

/// `POST /api/ids/suggest`: tokens that may follow the typed input.
pub async fn suggest(Json(body): Json<SuggestBody>) -> Json<Vec<&'static TokenDef>> {
    Json(id::suggest_for_input(&body.input))
}

#[cfg(test)]
#[path = "ids_test.rs"]
mod tests;
