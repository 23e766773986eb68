//! Built-in policy tables.
//!
//! # Governance
//!
//! These tables seed [`crate::SanitizePolicy::default`]. Deployments that need
//! different rules build their own policy instead of editing these; the
//! defaults are what every test in the crate is written against.
//!
//! - `DENIED_EXTENSION_KEYS`: extension fields never returned to a client
//! - `LEGACY_CODES`: deprecated raw codes still emitted by older resolvers

use crate::ErrorCode;

/// Extension keys stripped from client payloads. Matched case-sensitively.
pub const DENIED_EXTENSION_KEYS: &[&str] = &["stack", "internal", "debug", "raw", "secrets", "exception"];

/// Deprecated raw codes and the canonical code each one now means.
pub const LEGACY_CODES: &[(&str, ErrorCode)] = &[
    ("too_many_requests", ErrorCode::RateLimitExceeded),
    (
        "forbidden_action_on_arguments_associated_resources",
        ErrorCode::Unauthorized,
    ),
    ("invalid_credentials", ErrorCode::Unauthenticated),
    ("account_locked", ErrorCode::Unauthorized),
    ("unauthorized_action", ErrorCode::InsufficientPermissions),
    ("unauthorized_arguments", ErrorCode::InsufficientPermissions),
];

/// Extension key carrying the client-facing code.
pub const CODE_KEY: &str = "code";

/// Extension key carrying the request correlation id.
pub const CORRELATION_ID_KEY: &str = "correlationId";

/// Extension key carrying a per-error HTTP status override.
pub const HTTP_STATUS_KEY: &str = "httpStatus";

/// Extension key holding a nested error object.
pub const NESTED_ERROR_KEY: &str = "error";

/// Fixed message tag on every pipeline log record.
pub const LOG_MESSAGE_TAG: &str = "GraphQL error";

/// Status used when nothing else decides one.
pub const DEFAULT_STATUS: u16 = 500;
