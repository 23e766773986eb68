//! Canonical error code namespace and code normalization.
//!
//! Every error leaving the pipeline carries exactly one canonical
//! [`ErrorCode`]. Clients see a *display* code, which is usually the
//! canonical string but may be a caller-supplied custom code. Status
//! derivation and logging only ever look at the canonical one.
//!
//! # Resolution Order
//!
//! 1. Missing code → `INTERNAL_SERVER_ERROR`
//! 2. Canonical string → itself
//! 3. Legacy string → mapped canonical code (see [`crate::definitions`])
//! 4. Anything else → `INTERNAL_SERVER_ERROR` internally, raw string displayed
//!    when the policy preserves custom codes
//!
//! Lookups are case-sensitive and exact. `"not_found"` is not `NOT_FOUND`.
//!
//! # Example
//!
//! ```rust
//! use gql_error_shield::{ErrorCode, SanitizePolicy};
//!
//! let policy = SanitizePolicy::default();
//! assert_eq!(policy.normalize_code(Some("too_many_requests")), ErrorCode::RateLimitExceeded);
//! assert_eq!(policy.normalize_code(Some("NOT_FOUND")), ErrorCode::NotFound);
//! assert_eq!(policy.normalize_code(None), ErrorCode::InternalServerError);
//! assert_eq!(ErrorCode::NotFound.http_status(), 404);
//! ```

use crate::SanitizePolicy;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Declare the canonical code enum together with its wire string and HTTP status.
///
/// Keeps the three tables in one place so a code can never exist without a
/// status or a wire representation.
macro_rules! define_error_codes {
    ($( $(#[$meta:meta])* $variant:ident => ($wire:literal, $status:literal), )+) => {
        /// Canonical machine-readable error identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ErrorCode {
            $(
                $(#[$meta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl ErrorCode {
            /// Every canonical code, in declaration order.
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$variant,)+];

            /// Wire representation placed in `extensions.code`.
            #[inline]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// HTTP status the transport should answer with for this code.
            #[inline]
            pub const fn http_status(self) -> u16 {
                match self {
                    $(Self::$variant => $status,)+
                }
            }

            /// Parse a canonical wire string. Legacy aliases are NOT accepted here.
            #[inline]
            pub fn from_canonical(raw: &str) -> Option<Self> {
                match raw {
                    $($wire => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

define_error_codes! {
    /// Malformed request envelope.
    BadRequest => ("BAD_REQUEST", 400),
    /// Argument values rejected by resolver validation.
    BadUserInput => ("BAD_USER_INPUT", 400),
    /// Query document failed to parse.
    GraphqlParseFailed => ("GRAPHQL_PARSE_FAILED", 400),
    /// Query document failed schema validation.
    GraphqlValidationFailed => ("GRAPHQL_VALIDATION_FAILED", 400),
    /// Caller identity could not be established.
    Unauthenticated => ("UNAUTHENTICATED", 401),
    /// Caller is known but not allowed to act.
    Unauthorized => ("UNAUTHORIZED", 403),
    /// Operation forbidden regardless of caller.
    Forbidden => ("FORBIDDEN", 403),
    /// Caller lacks a specific permission.
    InsufficientPermissions => ("INSUFFICIENT_PERMISSIONS", 403),
    /// Target resource does not exist.
    NotFound => ("NOT_FOUND", 404),
    /// Write conflicts with current resource state.
    Conflict => ("CONFLICT", 409),
    /// Caller exceeded its request budget.
    RateLimitExceeded => ("RATE_LIMIT_EXCEEDED", 429),
    /// Catch-all for anything unclassified.
    InternalServerError => ("INTERNAL_SERVER_ERROR", 500),
    /// A dependency is temporarily unavailable.
    ServiceUnavailable => ("SERVICE_UNAVAILABLE", 503),
}

impl Default for ErrorCode {
    fn default() -> Self {
        Self::InternalServerError
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two codes derived from one raw code.
///
/// `internal` drives status derivation and logging. `display` is what the
/// client sees. They only differ for custom codes the policy preserves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeResolution<'a> {
    pub internal: ErrorCode,
    pub display: Cow<'a, str>,
}

impl<'a> CodeResolution<'a> {
    /// Resolution for a code that maps cleanly to a canonical value.
    #[inline]
    pub fn canonical(code: ErrorCode) -> Self {
        Self {
            internal: code,
            display: Cow::Borrowed(code.as_str()),
        }
    }

    /// True when the display code is a preserved custom string.
    #[inline]
    pub fn is_custom(&self) -> bool {
        self.display != self.internal.as_str()
    }
}

impl SanitizePolicy {
    /// Map a raw code to its canonical value. Pure and total.
    pub fn normalize_code(&self, raw: Option<&str>) -> ErrorCode {
        let Some(raw) = raw else {
            return ErrorCode::InternalServerError;
        };
        ErrorCode::from_canonical(raw)
            .or_else(|| self.legacy_target(raw))
            .unwrap_or(ErrorCode::InternalServerError)
    }

    /// Produce both the internal and the display code for a raw code.
    pub fn resolve_code<'a>(&self, raw: Option<&'a str>) -> CodeResolution<'a> {
        let Some(raw_str) = raw else {
            return CodeResolution::canonical(ErrorCode::InternalServerError);
        };

        if let Some(code) = ErrorCode::from_canonical(raw_str).or_else(|| self.legacy_target(raw_str)) {
            return CodeResolution::canonical(code);
        }

        if self.preserves_custom_codes() {
            CodeResolution {
                internal: ErrorCode::InternalServerError,
                display: Cow::Borrowed(raw_str),
            }
        } else {
            CodeResolution::canonical(ErrorCode::InternalServerError)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
