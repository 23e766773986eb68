//! # GQL Error Shield
//!
//! Error normalization and response sanitization for GraphQL servers, plus
//! the recipient guard of an outbound mail component.
//!
//! ## Design Philosophy
//!
//! 1. **Every error gets exactly one canonical code** for status and logging
//! 2. **Clients see only safe extension keys**, never stacks or internals
//! 3. **One batch, one status, one log record**
//! 4. **The pipeline never fails**: degenerate input has defined defaults
//! 5. **Recipient fields are screened for CR/LF** before any parsing
//!
//! ## Quick Start
//!
//! ```rust
//! use gql_error_shield::{ErrorFormatter, RawError, TracingSink};
//! use serde_json::json;
//!
//! let formatter = ErrorFormatter::default();
//! let errors = [RawError::new("User not found")
//!     .at(2, 3)
//!     .with_path(["user"])
//!     .with_extensions(json!({
//!         "code": "NOT_FOUND",
//!         "stack": "Error: User not found\n    at resolve (user.js:10)",
//!     }))];
//!
//! let outcome = formatter.format(&errors, "req-1", Some(&TracingSink), None);
//!
//! assert_eq!(outcome.status_code, 404);
//! let ext = &outcome.formatted[0].extensions;
//! assert_eq!(ext["code"], "NOT_FOUND");
//! assert_eq!(ext["correlationId"], "req-1");
//! assert!(!ext.contains_key("stack"));
//! ```
//!
//! ## Recipient Guard
//!
//! ```rust
//! use gql_error_shield::mail::validate_recipients;
//!
//! let verdict = validate_recipients("\"User One\" <a@x.com>, b@x.com");
//! assert!(verdict.is_accepted());
//!
//! let verdict = validate_recipients("user@x.com\r\nBCC: evil@example.com");
//! assert!(!verdict.is_accepted());
//! ```

#![warn(clippy::all)]

pub mod codes;
pub mod definitions;
pub mod formatter;
pub mod logging;
pub mod mail;
pub mod models;
pub mod policy;
pub mod sanitize;

pub use codes::*;
pub use formatter::*;
pub use logging::*;
pub use models::*;
pub use policy::*;
pub use sanitize::*;
