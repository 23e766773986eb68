//! Batch formatter: raw executor errors in, client-safe payload and status out.
//!
//! # Pipeline
//!
//! ```text
//! raw errors → resolve codes → sanitize extensions → derive status → log → outcome
//! ```
//!
//! The formatter never fails. Missing fields, non-object extensions and empty
//! batches all have defined defaults.
//!
//! # Status Precedence
//!
//! 1. Caller's explicit override
//! 2. First error's `extensions.httpStatus`, when it is an integral number in 100..=599
//! 3. Status table entry for the first error's canonical code
//! 4. 500
//!
//! Only the first error decides the batch status.

use crate::definitions::DEFAULT_STATUS;
use crate::logging::{emit, ErrorLogRecord, LogSink};
use crate::models::{FormatOutcome, FormattedError, RawError};
use crate::sanitize::RawExtensions;
use crate::SanitizePolicy;

/// Stateless formatter bound to one immutable policy.
///
/// Safe to share across threads and call concurrently.
#[derive(Debug, Clone, Default)]
pub struct ErrorFormatter {
    policy: SanitizePolicy,
}

impl ErrorFormatter {
    pub fn new(policy: SanitizePolicy) -> Self {
        Self { policy }
    }

    #[inline]
    pub fn policy(&self) -> &SanitizePolicy {
        &self.policy
    }

    /// Format a batch of raw errors.
    ///
    /// Emits exactly one record to `sink` when one is given, whatever the
    /// batch size. `status_override`, when given, is used verbatim.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gql_error_shield::{ErrorFormatter, RawError};
    /// use serde_json::json;
    ///
    /// let formatter = ErrorFormatter::default();
    /// let errors = [RawError::new("Too many requests")
    ///     .with_extensions(json!({ "code": "too_many_requests", "stack": "at ..." }))];
    ///
    /// let outcome = formatter.format(&errors, "req-42", None, None);
    /// assert_eq!(outcome.status_code, 429);
    /// assert_eq!(outcome.formatted[0].code(), Some("RATE_LIMIT_EXCEEDED"));
    /// assert!(!outcome.formatted[0].extensions.contains_key("stack"));
    /// ```
    pub fn format(
        &self,
        errors: &[RawError],
        correlation_id: &str,
        sink: Option<&dyn LogSink>,
        status_override: Option<u16>,
    ) -> FormatOutcome {
        let mut formatted = Vec::with_capacity(errors.len());
        let mut internal_codes = Vec::with_capacity(errors.len());
        let mut first_http_status = None;

        for (idx, raw) in errors.iter().enumerate() {
            let view = RawExtensions::read(raw.extensions.as_ref());
            let resolution = self.policy.resolve_code(view.code);
            if idx == 0 {
                first_http_status = view.status_override();
            }

            let extensions =
                self.policy
                    .sanitize_view(&view, resolution.display.as_ref(), correlation_id);
            internal_codes.push(resolution.internal);
            formatted.push(FormattedError::new(
                raw.message.clone(),
                raw.locations.clone(),
                raw.path.clone(),
                extensions,
            ));
        }

        let status_code = status_override
            .or(first_http_status)
            .or_else(|| internal_codes.first().map(|code| code.http_status()))
            .unwrap_or(DEFAULT_STATUS);

        if let Some(sink) = sink {
            let mut record = ErrorLogRecord::new(correlation_id, status_code);
            for (raw, code) in errors.iter().zip(&internal_codes) {
                record.push(&raw.message, *code);
            }
            emit(sink, &record);
        }

        FormatOutcome {
            formatted,
            status_code,
        }
    }

    /// Status a batch would get, without formatting it.
    pub fn derive_status(&self, errors: &[RawError], status_override: Option<u16>) -> u16 {
        if let Some(status) = status_override {
            return status;
        }
        let Some(first) = errors.first() else {
            return DEFAULT_STATUS;
        };
        let view = RawExtensions::read(first.extensions.as_ref());
        view.status_override()
            .unwrap_or_else(|| self.policy.normalize_code(view.code).http_status())
    }
}
