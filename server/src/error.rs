//! API error type.
//!
//! DESIGN
//! ======
//! Every failure a handler can return maps to one HTTP status and one stable,
//! grepable `E_*` code. The body is always `{ "code", "message" }`, so clients
//! branch on `code` and show `message`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use stencil::store::StoreError;
use stencil::svg::SvgError;
use uuid::Uuid;

/// Stable machine-readable code for an error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("svg is {actual} bytes, limit is {limit}")]
    PayloadTooLarge { actual: usize, limit: usize },
    #[error("editor session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("session limit reached ({0})")]
    TooManySessions(usize),
    #[error(transparent)]
    Svg(#[from] SvgError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "E_BAD_REQUEST",
            Self::PayloadTooLarge { .. } => "E_PAYLOAD_TOO_LARGE",
            Self::SessionNotFound(_) => "E_SESSION_NOT_FOUND",
            Self::TooManySessions(_) => "E_TOO_MANY_SESSIONS",
            Self::Svg(_) | Self::Store(StoreError::Svg(_)) => "E_INVALID_SVG",
            Self::Store(StoreError::NotLoaded) => "E_NOT_LOADED",
            Self::Store(StoreError::UnknownElement(_)) => "E_ELEMENT_NOT_FOUND",
            Self::Store(StoreError::InvalidOrder) => "E_INVALID_ORDER",
            Self::Store(StoreError::UnknownOptionGroup(_)) => "E_OPTION_GROUP_NOT_FOUND",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Store(StoreError::InvalidOrder) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::SessionNotFound(_)
            | Self::Store(StoreError::UnknownElement(_) | StoreError::UnknownOptionGroup(_)) => StatusCode::NOT_FOUND,
            Self::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Svg(_) | Self::Store(StoreError::Svg(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(StoreError::NotLoaded) => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        let body = ErrorBody { code: self.error_code(), message: self.to_string() };
        (status, Json(body)).into_response()
    }
}

/// Reject documents over the configured size.
///
/// # Errors
///
/// Returns `ApiError::PayloadTooLarge` when `svg` exceeds `limit` bytes.
pub fn check_svg_size(svg: &str, limit: usize) -> Result<(), ApiError> {
    if svg.len() > limit {
        return Err(ApiError::PayloadTooLarge { actual: svg.len(), limit });
    }
    Ok(())
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
