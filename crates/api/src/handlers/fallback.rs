//! Catch-all handlers that keep unmatched requests inside the error envelope.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::AppError;

/// Mounted as the fallback of every method router.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Mounted as the router-wide fallback for unknown paths.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "error": "NOT_FOUND",
        })),
    )
}
