//! Limits and fixed values shared across crates.

/// Expiry applied to an uploaded contract held in the blob cache.
pub const UPLOAD_TTL_SECS: u64 = 3600;

/// Expiry applied to a cached, serialized contract analysis.
pub const CONTRACT_CACHE_TTL_SECS: u64 = 3600;

/// The only content type accepted for contract uploads.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Multipart field carrying the uploaded contract.
pub const CONTRACT_FIELD: &str = "contract";

/// Multipart field carrying the confirmed contract type on analyze.
pub const CONTRACT_TYPE_FIELD: &str = "contractType";

/// Language tag stored with every analysis.
pub const ANALYSIS_LANGUAGE: &str = "en";

/// Number of risks and opportunities a free-tier user gets to see.
pub const FREE_TIER_PREVIEW_ITEMS: usize = 3;

/// Score thresholds used when rating an analysis.
pub const SCORE_GOOD_ABOVE: i32 = 70;
pub const SCORE_BAD_BELOW: i32 = 50;

pub const SESSION_COOKIE: &str = "session";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
