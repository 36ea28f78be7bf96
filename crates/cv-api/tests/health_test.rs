//! Health, readiness and OpenAPI endpoints.

mod helpers;

use helpers::setup_memory_app;
use serde_json::Value;

#[tokio::test]
async fn test_health_reports_backend() {
    let app = setup_memory_app();

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage_backend"], "memory");
}

#[tokio::test]
async fn test_ready_follows_record_store() {
    let app = setup_memory_app();

    assert_eq!(app.client().get("/ready").await.status_code(), 200);

    app.records.set_unavailable(true);
    let response = app.client().get("/ready").await;
    assert_eq!(response.status_code(), 503);
    assert_eq!(response.json::<Value>()["status"], "not_ready");
}

#[tokio::test]
async fn test_openapi_document_lists_cv_paths() {
    let app = setup_memory_app();

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let doc = response.json::<Value>();
    assert!(doc["paths"]["/api/v1/cvs/upload"].is_object());
    assert!(doc["paths"]["/api/v1/cvs/{id}"].is_object());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = setup_memory_app();

    let response = app.client().get("/health").await;

    assert!(response.maybe_header("x-request-id").is_some());
}
