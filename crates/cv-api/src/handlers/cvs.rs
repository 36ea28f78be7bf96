use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use cv_core::models::{
    CompleteUploadResponse, CvListResponse, CvResponse, InitiateUploadRequest,
    InitiateUploadResponse, ListCvsQuery,
};
use std::sync::Arc;
use uuid::Uuid;

/// Start a CV upload and obtain a signed URL for the direct write
#[utoipa::path(
    post,
    path = "/api/v1/cvs/upload",
    tag = "cvs",
    request_body = InitiateUploadRequest,
    responses(
        (status = 200, description = "Signed URL issued and pending record created", body = InitiateUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 503, description = "Blob or record store unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "initiate_cv_upload"))]
pub async fn initiate_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<InitiateUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let started = state.uploads.initiate(request.into()).await?;
    Ok(Json(InitiateUploadResponse::from(started)))
}

/// Confirm that the file was written and mark the CV uploaded
#[utoipa::path(
    put,
    path = "/api/v1/cvs/{id}",
    tag = "cvs",
    params(
        ("id" = Uuid, Path, description = "CV id returned by the upload call")
    ),
    responses(
        (status = 200, description = "Upload confirmed", body = CompleteUploadResponse),
        (status = 400, description = "Invalid id", body = ErrorResponse),
        (status = 404, description = "Unknown CV or file not uploaded yet", body = ErrorResponse),
        (status = 503, description = "Blob or record store unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, path), fields(operation = "complete_cv_upload"))]
pub async fn complete_upload(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Path(id) = path?;
    let record = state.uploads.finalize(id).await?;
    Ok(Json(CompleteUploadResponse::from(record)))
}

/// Get a CV record
#[utoipa::path(
    get,
    path = "/api/v1/cvs/{id}",
    tag = "cvs",
    params(
        ("id" = Uuid, Path, description = "CV id")
    ),
    responses(
        (status = 200, description = "CV record", body = CvResponse),
        (status = 404, description = "CV not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, path), fields(operation = "get_cv"))]
pub async fn get_cv(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Path(id) = path?;
    let record = state.uploads.get(id).await?;
    Ok(Json(CvResponse::from(record)))
}

/// List CV records, newest first
#[utoipa::path(
    get,
    path = "/api/v1/cvs",
    tag = "cvs",
    params(ListCvsQuery),
    responses(
        (status = 200, description = "Page of CV records", body = CvListResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "list_cvs"))]
pub async fn list_cvs(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListCvsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let page = state.uploads.list(query.into()).await?;
    Ok(Json(CvListResponse {
        items: page.records.into_iter().map(CvResponse::from).collect(),
        next_cursor: page.next_cursor,
    }))
}
