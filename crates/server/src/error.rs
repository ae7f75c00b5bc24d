//! HTTP error mapping for the search endpoint.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use imago_core::Error;

/// Wrapper turning core errors into HTTP responses.
///
/// Queries only fault on the corrupted-mirror invariant violation
/// (`Error::MissingItem`), which is a server bug, so everything surfaces
/// as an internal error rather than a client one.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("query failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": self.0.to_string()})),
        )
            .into_response()
    }
}
