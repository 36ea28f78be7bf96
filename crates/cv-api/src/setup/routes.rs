//! Route configuration and setup

use crate::constants::{
    API_BASE, API_PREFIX, BLOB_RECEIVER_PATH, MAX_BLOB_BODY_BYTES, MAX_JSON_BODY_BYTES,
};
use crate::handlers;
use crate::middleware::{request_id_middleware, RequestId};
use crate::setup::health::{health_check, readiness_check};
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use cv_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("-");
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route(
            &format!("{}/openapi.json", API_BASE),
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(cv_routes());

    if state.local_blobs.is_some() {
        tracing::info!(path = BLOB_RECEIVER_PATH, "Local blob receiver enabled");
        app = app.merge(blob_receiver_routes());
    }

    let app = app
        .layer(cors)
        .layer(trace_layer)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// CV lifecycle routes
fn cv_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/cvs/upload", API_PREFIX),
            post(handlers::cvs::initiate_upload),
        )
        .route(
            &format!("{}/cvs", API_PREFIX),
            get(handlers::cvs::list_cvs),
        )
        .route(
            &format!("{}/cvs/{{id}}", API_PREFIX),
            put(handlers::cvs::complete_upload).get(handlers::cvs::get_cv),
        )
        .layer(DefaultBodyLimit::max(MAX_JSON_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_JSON_BODY_BYTES))
}

/// Direct-write target for the local filesystem backend
fn blob_receiver_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/{{*key}}", BLOB_RECEIVER_PATH),
            put(handlers::blobs::put_blob),
        )
        .layer(DefaultBodyLimit::max(MAX_BLOB_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BLOB_BODY_BYTES))
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
