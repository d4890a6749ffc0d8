//! Database-backed HTTP tests: submission persistence, record listing,
//! poll sync, retry, and the policy and traffic-rule endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{build_test_app, get, json_request, post_empty, send, CountingProcessor};
use dyemark_core::correlation::is_generated;
use serde_json::{json, Value};
use sqlx::PgPool;

async fn submit(pool: &PgPool, processor: &std::sync::Arc<CountingProcessor>, body: Value) -> Value {
    let app = build_test_app(pool.clone(), processor.clone());
    let (status, json) = send(
        app,
        json_request(Method::POST, "/api/v1/watermark/tasks", body),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "submit failed: {json}");
    json
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_generates_biz_id_and_persists_a_record(pool: PgPool) {
    let processor = CountingProcessor::new();

    let json = submit(
        &pool,
        &processor,
        json!({"fileUrl": "https://files.example.com/in/report%20q3.pdf", "content": "CONFIDENTIAL"}),
    )
    .await;

    assert_eq!(json["success"], true);
    assert_eq!(json["taskId"], "T-1");
    assert_eq!(json["data"]["data"]["task_id"], "T-1");
    let biz_id = json["bizId"].as_str().unwrap();
    assert!(is_generated(biz_id, "add"), "got {biz_id}");

    let record_id = json["recordId"].as_i64().unwrap();
    let app = build_test_app(pool.clone(), processor.clone());
    let (status, record) = send(app, get(&format!("/api/v1/records/{record_id}"))).await;

    assert_eq!(status, StatusCode::OK);
    let record = &record["data"];
    assert_eq!(record["taskId"], "T-1");
    assert_eq!(record["bizId"], biz_id);
    assert_eq!(record["operation"], "add");
    assert_eq!(record["status"], "processing");
    assert_eq!(record["fileName"], "report q3.pdf");
    assert_eq!(record["watermarkText"], "CONFIDENTIAL");
    assert_eq!(record["metadata"], json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_with_unknown_policy_is_not_found(pool: PgPool) {
    let processor = CountingProcessor::new();
    let app = build_test_app(pool, processor.clone());

    let (status, json) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/watermark/tasks",
            json!({"fileUrl": "http://x/a.pdf", "content": "c", "policyId": 999}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "NOT_FOUND");
    assert_eq!(processor.call_count(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submit_with_policy_forwards_rendering_parameters(pool: PgPool) {
    let processor = CountingProcessor::new();

    let app = build_test_app(pool.clone(), processor.clone());
    let (status, policy) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/policies",
            json!({"name": "Internal", "watermarkText": "INTERNAL", "opacity": 0.5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let policy_id = policy["data"]["id"].as_i64().unwrap();

    submit(
        &pool,
        &processor,
        json!({"fileUrl": "http://x/a.pdf", "content": "c", "policyId": policy_id}),
    )
    .await;

    let submitted = processor.submitted.lock().unwrap();
    let (_, _, payload) = &submitted[0];
    assert_eq!(payload["policy"]["opacity"], 0.5);
    assert_eq!(payload["policy"]["font_size"], 24);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn keyword_listing_matches_and_counts_pages(pool: PgPool) {
    let processor = CountingProcessor::new();
    for i in 0..3 {
        submit(
            &pool,
            &processor,
            json!({"fileUrl": format!("https://cdn.example.com/ABC-{i}.pdf"), "content": "c"}),
        )
        .await;
    }
    submit(
        &pool,
        &processor,
        json!({"fileUrl": "https://cdn.example.com/other.pdf", "content": "c"}),
    )
    .await;

    let app = build_test_app(pool.clone(), processor.clone());
    let (status, json) = send(app, get("/api/v1/records?keyword=abc&page=1&pageSize=2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["pageSize"], 2);
    assert_eq!(json["pagination"]["totalPages"], 2);

    let app = build_test_app(pool, processor);
    let (_, json) = send(app, get("/api/v1/records?keyword=abc&page=1&pageSize=20")).await;
    assert_eq!(json["pagination"]["totalPages"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_with_no_rows_has_zero_pages(pool: PgPool) {
    let app = build_test_app(pool, CountingProcessor::new());

    let (status, json) = send(app, get("/api/v1/records")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], json!([]));
    assert_eq!(json["pagination"]["totalPages"], 0);
    assert_eq!(json["pagination"]["page"], 1);
}

// ---------------------------------------------------------------------------
// Poll sync
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn finished_poll_completes_the_record_once(pool: PgPool) {
    let processor = CountingProcessor::new();
    let submitted = submit(
        &pool,
        &processor,
        json!({"fileUrl": "http://x/a.pdf", "content": "c"}),
    )
    .await;
    let record_id = submitted["recordId"].as_i64().unwrap();

    processor.set_status("finished");
    let app = build_test_app(pool.clone(), processor.clone());
    let (status, _) = send(app, get("/api/v1/watermark/tasks/T-1")).await;
    assert_eq!(status, StatusCode::OK);

    let app = build_test_app(pool.clone(), processor.clone());
    let (_, record) = send(app, get(&format!("/api/v1/records/{record_id}"))).await;
    assert_eq!(record["data"]["status"], "success");
    assert_eq!(record["data"]["progress"], 100);
    assert_eq!(record["data"]["resultUrl"], "https://files.example.com/out/T-1.pdf");

    // A later contradictory poll must not rewrite the terminal record.
    processor.set_status("running");
    let app = build_test_app(pool.clone(), processor.clone());
    send(app, get("/api/v1/watermark/tasks/T-1")).await;

    let app = build_test_app(pool, processor);
    let (_, record) = send(app, get(&format!("/api/v1/records/{record_id}"))).await;
    assert_eq!(record["data"]["status"], "success");
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn retry_creates_a_linked_attempt(pool: PgPool) {
    let processor = CountingProcessor::new();
    let submitted = submit(
        &pool,
        &processor,
        json!({"fileUrl": "http://x/a.pdf", "content": "c"}),
    )
    .await;
    let record_id = submitted["recordId"].as_i64().unwrap();
    let calls_before = processor.call_count();

    let app = build_test_app(pool.clone(), processor.clone());
    let (status, json) = send(app, post_empty(&format!("/api/v1/records/{record_id}/retry"))).await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["id"], record_id);
    assert_eq!(data["status"], "processing");
    assert!(data["retryAt"].is_string());
    let new_task_id = data["newTaskId"].as_str().unwrap();
    assert!(is_generated(new_task_id, "retry"), "got {new_task_id}");
    assert_ne!(new_task_id, "T-1");
    assert_eq!(processor.call_count(), calls_before);

    let new_record_id = data["newRecordId"].as_i64().unwrap();
    let app = build_test_app(pool.clone(), processor.clone());
    let (_, attempt) = send(app, get(&format!("/api/v1/records/{new_record_id}"))).await;
    assert_eq!(attempt["data"]["taskId"], new_task_id);
    assert_eq!(attempt["data"]["retryOfRecordId"], record_id);
    assert_eq!(attempt["data"]["watermarkText"], "c");

    let app = build_test_app(pool, processor);
    let (_, original) = send(app, get(&format!("/api/v1/records/{record_id}"))).await;
    assert_eq!(original["data"]["taskId"], "T-1");
    assert_eq!(original["data"]["status"], "processing");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn retry_of_missing_record_is_not_found(pool: PgPool) {
    let app = build_test_app(pool, CountingProcessor::new());

    let (status, json) = send(app, post_empty("/api/v1/records/4242/retry")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn policy_create_applies_defaults_and_lists(pool: PgPool) {
    let processor = CountingProcessor::new();

    let app = build_test_app(pool.clone(), processor.clone());
    let (status, json) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/policies",
            json!({"name": "Default", "watermarkText": "DO NOT COPY"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Policy created");
    assert_eq!(json["data"]["opacity"], 0.3);
    assert_eq!(json["data"]["fontSize"], 24);
    assert_eq!(json["data"]["embedDepth"], 5);
    assert_eq!(json["data"]["color"], "#666666");
    assert_eq!(json["data"]["sensitivity"], "medium");

    let app = build_test_app(pool, processor);
    let (status, json) = send(app, get("/api/v1/policies?active=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn policy_create_rejects_blank_name_and_bad_opacity(pool: PgPool) {
    let processor = CountingProcessor::new();

    let app = build_test_app(pool.clone(), processor.clone());
    let (status, json) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/policies",
            json!({"name": " ", "watermarkText": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "VALIDATION_ERROR");

    let app = build_test_app(pool, processor);
    let (status, _) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/policies",
            json!({"name": "n", "watermarkText": "x", "opacity": 1.5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Traffic rules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn rule_create_normalizes_and_execute_dispatches(pool: PgPool) {
    let processor = CountingProcessor::new();

    let app = build_test_app(pool.clone(), processor.clone());
    let (status, json) = send(
        app,
        json_request(
            Method::POST,
            "/api/v1/traffic-rules",
            json!({"name": "checkout", "target": "10.0.0.0/24", "appType": "mainframe", "protocol": "https"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["appType"], "web");
    assert_eq!(json["data"]["protocol"], "https");
    assert_eq!(json["data"]["priority"], 50);
    let rule_id = json["data"]["id"].as_i64().unwrap();

    let app = build_test_app(pool.clone(), processor.clone());
    let (status, json) = send(
        app,
        post_empty(&format!("/api/v1/traffic-rules/{rule_id}/execute")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "execute failed: {json}");
    assert_eq!(json["data"]["rule"]["status"], "processing");
    assert!(is_generated(json["data"]["bizId"].as_str().unwrap(), "dye"));
    assert_eq!(processor.call_count(), 1);

    // Already processing: a second execution conflicts.
    let app = build_test_app(pool.clone(), processor.clone());
    let (status, _) = send(
        app,
        post_empty(&format!("/api/v1/traffic-rules/{rule_id}/execute")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let app = build_test_app(pool, processor);
    let (_, json) = send(app, get("/api/v1/records?operation=dye")).await;
    assert_eq!(json["pagination"]["total"], 1);
}
