//! API constants
//!
//! Route paths shared by the router, the OpenAPI annotations and the tests.

pub const CONTRACTS_PREFIX: &str = "/contracts";
pub const AUTH_PREFIX: &str = "/auth";
pub const PAYMENTS_PREFIX: &str = "/payments";

/// Where RapiDoc fetches the generated OpenAPI document.
pub const OPENAPI_JSON_PATH: &str = "/api/openapi.json";

/// Header carrying the Stripe webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Lifetime of the OAuth `state` cookie.
pub const OAUTH_STATE_MAX_AGE_SECS: i64 = 600;

/// Headroom on top of the contract size limit for multipart framing and the type field.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
