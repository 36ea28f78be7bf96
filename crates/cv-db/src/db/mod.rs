//! Record store repositories
//
// Capability trait, filter and error types
mod store;
pub use store::{CvPage, CvRecordStore, ListFilter, RecordStoreError};
//
// PostgreSQL implementation
mod cv;
pub use cv::PostgresCvRepository;
//
// In-memory implementation
mod memory;
pub use memory::InMemoryCvStore;
