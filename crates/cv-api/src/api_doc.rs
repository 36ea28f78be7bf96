//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use cv_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CV Upload API",
        version = "0.1.0",
        description = "Two-phase CV upload: request a signed URL, write the file directly to storage, then confirm the upload."
    ),
    paths(
        handlers::cvs::initiate_upload,
        handlers::cvs::complete_upload,
        handlers::cvs::get_cv,
        handlers::cvs::list_cvs,
    ),
    components(schemas(
        models::InitiateUploadRequest,
        models::InitiateUploadResponse,
        models::CompleteUploadResponse,
        models::CvResponse,
        models::CvListResponse,
        models::CvStatus,
        error::ErrorResponse,
    )),
    tags(
        (name = "cvs", description = "CV upload lifecycle")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
