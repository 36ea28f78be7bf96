pub mod blobs;
pub mod cvs;
