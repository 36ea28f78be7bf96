//! CV Database Library
//!
//! Record store capability for CV metadata: the [`CvRecordStore`] trait, its PostgreSQL
//! implementation and an in-memory implementation for development and tests.

pub mod db;

pub use db::{
    CvPage, CvRecordStore, InMemoryCvStore, ListFilter, PostgresCvRepository, RecordStoreError,
};
