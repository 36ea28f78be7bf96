//! API constants

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Versioned prefix under which every CV route is mounted
pub const API_PREFIX: &str = "/api/v1";

/// Path of the local blob receiver; `LOCAL_STORAGE_BASE_URL` should end with it
pub const BLOB_RECEIVER_PATH: &str = "/blobs";

/// Upper bound on a direct write accepted by the local blob receiver
pub const MAX_BLOB_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Upper bound on JSON request bodies
pub const MAX_JSON_BODY_BYTES: usize = 64 * 1024;
