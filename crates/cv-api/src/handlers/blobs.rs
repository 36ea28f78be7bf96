//! Receiver for direct writes to the local filesystem backend.
//!
//! With `STORAGE_BACKEND=local` the signed URLs handed out by the upload call point here,
//! so the client's `PUT` lands on this service instead of an object store.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::rejection::QueryRejection,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use cv_core::AppError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SignedWriteParams {
    pub expires: i64,
    pub signature: String,
}

#[tracing::instrument(skip(state, params, headers, body), fields(key = %key, size_bytes = body.len()))]
pub async fn put_blob(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    params: Result<Query<SignedWriteParams>, QueryRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let local = state
        .local_blobs
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Blob receiver is not enabled".to_string()))?;
    let Query(params) = params?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    local.verify_signature(
        &Method::PUT,
        &key,
        params.expires,
        content_type,
        &params.signature,
        Utc::now(),
    )?;
    local.write_object(&key, body, content_type).await?;

    Ok(StatusCode::OK)
}
