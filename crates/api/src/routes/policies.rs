use axum::routing::get;
use axum::Router;

use crate::handlers::fallback::method_not_allowed;
use crate::handlers::policies;
use crate::state::AppState;

/// Routes mounted at `/policies`.
///
/// ```text
/// GET    /                -> list_policies
/// POST   /                -> create_policy
/// GET    /{id}            -> get_policy
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(policies::list_policies)
                .post(policies::create_policy)
                .fallback(method_not_allowed),
        )
        .route("/{id}", get(policies::get_policy).fallback(method_not_allowed))
}
