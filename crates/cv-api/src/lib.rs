//! CV upload API
//!
//! HTTP surface, application setup and the upload coordinator.

pub mod api_doc;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{CvUploadService, UploadSettings};
pub use state::AppState;
