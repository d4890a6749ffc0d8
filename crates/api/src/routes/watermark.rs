//! Route definitions for watermark tasks.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::fallback::method_not_allowed;
use crate::handlers::watermark;
use crate::state::AppState;

/// Routes mounted at `/watermark`.
///
/// ```text
/// POST   /tasks              -> submit_task
/// POST   /extract            -> submit_extract
/// GET    /tasks/{taskId}     -> get_task_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            post(watermark::submit_task).fallback(method_not_allowed),
        )
        .route(
            "/extract",
            post(watermark::submit_extract).fallback(method_not_allowed),
        )
        .route(
            "/tasks/{task_id}",
            get(watermark::get_task_status).fallback(method_not_allowed),
        )
}
