//! Value routes: run a generation rule or a dependency extraction.

use axum::response::Json;
use serde::{Deserialize, Serialize};
use stencil::consts::MAX_GENERATED_LEN;
use stencil::extract;
use stencil::field::FieldValues;
use stencil::generate::{self, MaxSpec};
use stencil::pattern::Rule;
use stencil::random::{RandomSource, RngSource};

use crate::error::ApiError;

/// Run `f` with a seeded generator when `seed` is given, thread entropy
/// otherwise. The generator never outlives the call.
pub(crate) fn with_rng<T>(seed: Option<u64>, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
    match seed {
        Some(seed) => f(&mut RngSource::seeded(seed)),
        None => f(&mut RngSource::thread()),
    }
}

#[derive(Deserialize)]
pub struct GenerateBody {
    pub rule: String,
    #[serde(default)]
    pub values: FieldValues,
    pub max_length: Option<usize>,
    /// Legacy `<n>` or `<n>:<pad>` spec from a `max_` token.
    pub max_spec: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ValueResponse {
    pub value: String,
}

/// `POST /api/generate`: evaluate a generation rule.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for an unparseable `max_spec` or a length
/// above `MAX_GENERATED_LEN`.
pub async fn generate(Json(body): Json<GenerateBody>) -> Result<Json<ValueResponse>, ApiError> {
    let value = generate_value(&body)?;
    Ok(Json(ValueResponse { value }))
}

fn generate_value(body: &GenerateBody) -> Result<String, ApiError> {
    let spec = body
        .max_spec
        .as_deref()
        .map(|raw| MaxSpec::parse(raw).ok_or_else(|| ApiError::BadRequest(format!("invalid max_spec: {raw}"))))
        .transpose()?;
    let rule = Rule::parse(&body.rule);
    let max_length = body.max_length.or(spec.map(|s| s.length));
    for length in [max_length, spec.map(|s| s.length)].into_iter().flatten() {
        if length > MAX_GENERATED_LEN {
            return Err(ApiError::BadRequest(format!(
                "length {length} exceeds the limit of {MAX_GENERATED_LEN}"
            )));
        }
    }

    let value = with_rng(body.seed, |rng| generate::evaluate(&rule.parts, &body.values, max_length, rng));
    Ok(match spec {
        Some(spec) if !rule.has_fill() => generate::apply_max_generation(&value, &spec),
        _ => value,
    })
}

#[derive(Deserialize)]
pub struct ExtractBody {
    /// `Field`, `Field[w2]` or `Field[ch1-3]`.
    pub reference: String,
    #[serde(default)]
    pub values: FieldValues,
}

/// `POST /api/extract`: resolve a dependency reference against values.
pub async fn extract(Json(body): Json<ExtractBody>) -> Json<ValueResponse> {
    Json(ValueResponse { value: extract::extract_from_dependency(&body.reference, &body.values) })
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
