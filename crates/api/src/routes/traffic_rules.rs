//! Route definitions for the `/traffic-rules` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::fallback::method_not_allowed;
use crate::handlers::traffic_rules;
use crate::state::AppState;

/// Routes mounted at `/traffic-rules`.
///
/// ```text
/// GET    /                -> list_rules
/// POST   /                -> create_rule
/// GET    /{id}            -> get_rule
/// POST   /{id}/execute    -> execute_rule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(traffic_rules::list_rules)
                .post(traffic_rules::create_rule)
                .fallback(method_not_allowed),
        )
        .route("/{id}", get(traffic_rules::get_rule).fallback(method_not_allowed))
        .route(
            "/{id}/execute",
            post(traffic_rules::execute_rule).fallback(method_not_allowed),
        )
}
