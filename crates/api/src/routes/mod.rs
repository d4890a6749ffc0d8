pub mod health;
pub mod policies;
pub mod records;
pub mod traffic_rules;
pub mod watermark;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /watermark/tasks                     submit embed task (POST)
/// /watermark/extract                   submit extract task (POST)
/// /watermark/tasks/{taskId}            poll task status (GET)
///
/// /records                             list (GET)
/// /records/{id}                        get (GET)
/// /records/{id}/retry                  retry (POST)
///
/// /policies                            list, create
/// /policies/{id}                       get
///
/// /traffic-rules                       list, create
/// /traffic-rules/{id}                  get
/// /traffic-rules/{id}/execute          execute (POST)
/// ```
///
/// Every method router falls back to a 405 error envelope.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/watermark", watermark::router())
        .nest("/records", records::router())
        .nest("/policies", policies::router())
        .nest("/traffic-rules", traffic_rules::router())
}
