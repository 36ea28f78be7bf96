//! Shared constants

/// Object key prefix for every uploaded CV.
pub const CV_KEY_PREFIX: &str = "cv";

/// Validity window of a signed upload URL (10 minutes).
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 600;

/// Upper bound on a single record-store or blob-store call.
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 5;

/// Default and maximum page sizes for record listing.
pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 100;
