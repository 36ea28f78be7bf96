//! Data models for the application
//!
//! The CV record is the only persistent entity; the remaining types are the request and
//! response shapes of the upload lifecycle.

mod cv;
mod upload;

pub use cv::*;
pub use upload::*;
