//! Application services
//
// Two-phase upload coordinator
pub mod cv_upload;

pub use cv_upload::{CvUploadService, UploadSettings};
