//! Request middleware that keeps timeouts and handler panics inside the
//! standard error envelope.

use std::any::Any;
use std::time::Duration;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Answer with a 408 envelope when the rest of the stack runs past `limit`.
pub async fn timeout_mw(limit: Duration, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%method, path = %path, limit_ms = limit.as_millis() as u64, "Request timed out");
            AppError::RequestTimeout.into_response()
        }
    }
}

/// Response for a panic caught by `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = match panic.downcast_ref::<String>() {
        Some(s) => s.clone(),
        None => panic
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "non-string panic payload".to_string()),
    };
    AppError::InternalError(format!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn call(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn with_timeout(app: Router, limit: Duration) -> Router {
        app.layer(axum::middleware::from_fn(move |req: Request, next: Next| {
            timeout_mw(limit, req, next)
        }))
    }

    #[tokio::test]
    async fn slow_handler_gets_timeout_envelope() {
        let app = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );

        let (status, json) = call(with_timeout(app, Duration::from_millis(20)), "/slow").await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "REQUEST_TIMEOUT");
    }

    #[tokio::test]
    async fn fast_handler_passes_through() {
        let app = Router::new().route("/fast", get(|| async { axum::Json(serde_json::json!({"ok": 1})) }));

        let (status, json) = call(with_timeout(app, Duration::from_secs(5)), "/fast").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], 1);
    }

    #[tokio::test]
    async fn panic_becomes_internal_error_envelope() {
        async fn explode() -> &'static str {
            panic!("ledger corrupted at row 7")
        }
        let app = Router::new()
            .route("/explode", get(explode))
            .layer(CatchPanicLayer::custom(panic_response));

        let (status, json) = call(app, "/explode").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "INTERNAL_ERROR");
        assert!(!json.to_string().contains("ledger"));
    }
}
