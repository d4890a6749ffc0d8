//! HTTP tests for task submission and polling that need no database.
//!
//! The pool points at an unreachable address, so these tests also show that
//! validation and polling never depend on the store.

mod common;

use axum::http::{Method, StatusCode};
use common::{build_test_app, get, json_request, post_empty, send, unreachable_pool, CountingProcessor};
use serde_json::json;

// ---------------------------------------------------------------------------
// Submission validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submit_with_blank_file_url_is_rejected_before_the_processor() {
    let processor = CountingProcessor::new();
    let app = build_test_app(unreachable_pool(), processor.clone());

    let (status, json) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/watermark/tasks",
            json!({"fileUrl": "", "content": "x"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert_eq!(processor.call_count(), 0);
}

#[tokio::test]
async fn submit_with_blank_content_is_rejected_before_the_processor() {
    let processor = CountingProcessor::new();
    let app = build_test_app(unreachable_pool(), processor.clone());

    let (status, json) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/watermark/tasks",
            json!({"fileUrl": "http://x", "content": ""}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "content is required");
    assert_eq!(processor.call_count(), 0);
}

#[tokio::test]
async fn submit_with_missing_fields_is_a_validation_error() {
    let processor = CountingProcessor::new();
    let app = build_test_app(unreachable_pool(), processor.clone());

    let (status, json) = send(
        app,
        json_request(Method::POST, "/api/v1/watermark/tasks", json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");
    assert_eq!(processor.call_count(), 0);
}

#[tokio::test]
async fn malformed_json_body_uses_the_error_envelope() {
    let processor = CountingProcessor::new();
    let app = build_test_app(unreachable_pool(), processor.clone());

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/watermark/tasks")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "BAD_REQUEST");
    assert_eq!(processor.call_count(), 0);
}

#[tokio::test]
async fn extract_without_file_url_is_rejected() {
    let processor = CountingProcessor::new();
    let app = build_test_app(unreachable_pool(), processor.clone());

    let (status, json) = send(
        app,
        json_request(Method::POST, "/api/v1/watermark/extract", json!({"bizId": "b"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "fileUrl is required");
    assert_eq!(processor.call_count(), 0);
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poll_reports_the_progress_table() {
    let cases = [
        ("pending", 5, "1 minutes 54 seconds"),
        ("running", 50, "1 minutes 0 seconds"),
        ("finished", 100, "completed"),
        ("failed", 0, "failed"),
        ("mystery", 0, "unknown"),
    ];

    for (raw, progress, eta) in cases {
        let processor = CountingProcessor::new();
        processor.set_status(raw);
        let app = build_test_app(unreachable_pool(), processor.clone());

        let (status, json) = send(app, get("/api/v1/watermark/tasks/T-42")).await;

        assert_eq!(status, StatusCode::OK, "raw = {raw}");
        assert_eq!(json["success"], true);
        assert_eq!(json["taskId"], "T-42");
        assert_eq!(json["progress"], progress, "raw = {raw}");
        assert_eq!(json["estimatedTime"], eta, "raw = {raw}");
        assert_eq!(json["bizId"], "add_1700000000000");
        assert_eq!(json["taskType"], "add");
    }
}

#[tokio::test]
async fn poll_reports_unknown_status_distinctly() {
    let processor = CountingProcessor::new();
    processor.set_status("exploded");
    let app = build_test_app(unreachable_pool(), processor);

    let (_, json) = send(app, get("/api/v1/watermark/tasks/T-1")).await;

    assert_eq!(json["status"], "unknown");
    assert_eq!(json["rawStatus"], "exploded");
}

#[tokio::test]
async fn poll_survives_an_unreachable_store() {
    let processor = CountingProcessor::new();
    processor.set_status("finished");
    let app = build_test_app(unreachable_pool(), processor);

    let (status, json) = send(app, get("/api/v1/watermark/tasks/T-7")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "finished");
    assert_eq!(json["result"], "https://files.example.com/out/T-7.pdf");
}

// ---------------------------------------------------------------------------
// Method handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn wrong_method_returns_405_envelope() {
    let processor = CountingProcessor::new();

    let app = build_test_app(unreachable_pool(), processor.clone());
    let (status, json) = send(app, get("/api/v1/watermark/tasks")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "METHOD_NOT_ALLOWED");

    let app = build_test_app(unreachable_pool(), processor.clone());
    let (status, _) = send(app, post_empty("/api/v1/watermark/tasks/T-1")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let app = build_test_app(unreachable_pool(), processor.clone());
    let (status, _) = send(app, get("/api/v1/records/1/retry")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(processor.call_count(), 0);
}

#[tokio::test]
async fn unknown_path_returns_404_envelope() {
    let app = build_test_app(unreachable_pool(), CountingProcessor::new());

    let (status, json) = send(app, get("/api/v1/nowhere")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "NOT_FOUND");
}

#[tokio::test]
async fn retry_with_non_numeric_id_is_a_validation_error() {
    let app = build_test_app(unreachable_pool(), CountingProcessor::new());

    let (status, json) = send(app, post_empty("/api/v1/records/abc/retry")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = build_test_app(unreachable_pool(), CountingProcessor::new());

    let (status, json) = send(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}
