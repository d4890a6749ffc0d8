//! Route definitions for the `/records` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::fallback::method_not_allowed;
use crate::handlers::records;
use crate::state::AppState;

/// Routes mounted at `/records`.
///
/// ```text
/// GET    /                -> list_records
/// GET    /{id}            -> get_record
/// POST   /{id}/retry      -> retry_record
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(records::list_records).fallback(method_not_allowed))
        .route("/{id}", get(records::get_record).fallback(method_not_allowed))
        .route(
            "/{id}/retry",
            post(records::retry_record).fallback(method_not_allowed),
        )
}
