//! Test helpers: build the app against in-process collaborators.
//!
//! Run from workspace root: `cargo test -p cv-api`. No database or object store is needed;
//! records live in memory and blobs go to a temp directory through the local receiver.

#![allow(dead_code)]

use axum::body::Bytes;
use axum_test::TestServer;
use cv_api::constants::{API_PREFIX, BLOB_RECEIVER_PATH};
use cv_api::setup::build_app;
use cv_core::{Config, StorageBackend};
use cv_db::InMemoryCvStore;
use cv_storage::{ConfiguredBlobStore, LocalStorage, MemoryBlobStore};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_SIGNING_SECRET: &str = "test-signing-secret-at-least-32-bytes";
pub const TEST_BASE_URL: &str = "http://localhost";

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Test application: server plus handles on its collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub records: Arc<InMemoryCvStore>,
    /// Present when the app runs on [`MemoryBlobStore`]
    pub memory_blobs: Option<Arc<MemoryBlobStore>>,
    pub _temp_dir: Option<TempDir>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// App with local filesystem blobs served by the built-in receiver.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let base_url = format!("{}{}", TEST_BASE_URL, BLOB_RECEIVER_PATH);

    let local = Arc::new(
        LocalStorage::new(temp_dir.path(), base_url.clone(), TEST_SIGNING_SECRET)
            .await
            .expect("Failed to create local storage"),
    );

    let config = Config {
        storage_backend: StorageBackend::Local,
        local_storage_path: Some(temp_dir.path().to_string_lossy().to_string()),
        local_storage_base_url: Some(base_url),
        local_signing_secret: Some(TEST_SIGNING_SECRET.to_string()),
        ..Config::default()
    };

    let records = Arc::new(InMemoryCvStore::new());
    let blobs = ConfiguredBlobStore {
        store: local.clone(),
        local: Some(local),
    };

    let (_state, router) = build_app(config, records.clone(), blobs).expect("Failed to build app");

    TestApp {
        server: TestServer::new(router).expect("Failed to create test server"),
        records,
        memory_blobs: None,
        _temp_dir: Some(temp_dir),
    }
}

/// App with in-memory blobs; objects are placed directly with `put_object`.
pub fn setup_memory_app() -> TestApp {
    let records = Arc::new(InMemoryCvStore::new());
    let memory = Arc::new(MemoryBlobStore::new());
    let blobs = ConfiguredBlobStore {
        store: memory.clone(),
        local: None,
    };

    let (_state, router) =
        build_app(Config::default(), records.clone(), blobs).expect("Failed to build app");

    TestApp {
        server: TestServer::new(router).expect("Failed to create test server"),
        records,
        memory_blobs: Some(memory),
        _temp_dir: None,
    }
}

/// Start an upload and return the response body.
pub async fn initiate_upload(client: &TestServer, file_name: &str, mime_type: &str) -> Value {
    let response = client
        .post(&api_path("/cvs/upload"))
        .json(&serde_json::json!({
            "file_name": file_name,
            "mime_type": mime_type,
        }))
        .await;
    assert_eq!(response.status_code(), 200, "initiate failed: {}", response.text());
    response.json::<Value>()
}

/// Split a signed URL issued by the local backend into the receiver path and its query pairs.
pub fn split_signed_url(signed_url: &str) -> (String, Vec<(String, String)>) {
    let without_host = signed_url
        .strip_prefix(TEST_BASE_URL)
        .expect("Signed URL does not point at the test receiver");
    let (path, query) = without_host
        .split_once('?')
        .expect("Signed URL has no query string");
    let params = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    (path.to_string(), params)
}

/// Write `body` through a signed URL the way a client would.
pub async fn put_through_signed_url(
    client: &TestServer,
    signed_url: &str,
    content_type: &str,
    body: impl Into<Bytes>,
) -> axum_test::TestResponse {
    let (path, params) = split_signed_url(signed_url);
    let mut request = client
        .put(&path)
        .content_type(content_type)
        .bytes(body.into());
    for (key, value) in params {
        request = request.add_query_param(&key, value);
    }
    request.await
}
