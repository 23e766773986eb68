//! Structured log records for formatted error batches.
//!
//! # Critical Properties
//!
//! - Exactly one record per `format` call, never one per error
//! - Records carry canonical codes only; custom display codes stay client-side
//! - Sinks are collaborators: they own transport and their own redaction
//! - A failing sink NEVER fails the caller. Panics are caught and dropped
//!
//! Records borrow from the batch being formatted. A sink that needs to keep
//! one past the call must copy what it needs, e.g. via [`ErrorLogRecord::to_json`].

use crate::definitions::LOG_MESSAGE_TAG;
use crate::ErrorCode;
use serde::Serialize;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Maximum length for any message in a log record (DoS prevention)
pub const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
pub const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Per-error line of a log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary<'a> {
    pub message: Cow<'a, str>,
    pub code: ErrorCode,
}

/// One structured record summarizing a formatted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLogRecord<'a> {
    pub msg: &'static str,
    pub correlation_id: &'a str,
    pub status_code: u16,
    pub errors: SmallVec<[ErrorSummary<'a>; 4]>,
}

impl<'a> ErrorLogRecord<'a> {
    pub(crate) fn new(correlation_id: &'a str, status_code: u16) -> Self {
        Self {
            msg: LOG_MESSAGE_TAG,
            correlation_id,
            status_code,
            errors: SmallVec::new(),
        }
    }

    pub(crate) fn push(&mut self, message: &'a str, code: ErrorCode) {
        self.errors.push(ErrorSummary {
            message: truncate_with_indicator(message),
            code,
        });
    }

    /// Render as a JSON value, for sinks that ship JSON lines.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Receiver of pipeline log records.
///
/// Implementations should return quickly; the formatter calls this inline.
pub trait LogSink: Send + Sync {
    fn log(&self, record: &ErrorLogRecord<'_>);
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn log(&self, record: &ErrorLogRecord<'_>) {
        (**self).log(record)
    }
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn log(&self, record: &ErrorLogRecord<'_>) {
        (**self).log(record)
    }
}

/// Sink that forwards records to `tracing` as a single `ERROR` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, record: &ErrorLogRecord<'_>) {
        let errors = record.to_json();
        tracing::error!(
            correlation_id = %record.correlation_id,
            status_code = record.status_code,
            error_count = record.errors.len(),
            errors = %errors["errors"],
            "{}",
            record.msg
        );
    }
}

/// Deliver a record, swallowing any panic raised by the sink.
pub(crate) fn emit(sink: &dyn LogSink, record: &ErrorLogRecord<'_>) {
    let _ = catch_unwind(AssertUnwindSafe(|| sink.log(record)));
}

/// Cap a log message at [`MAX_FIELD_OUTPUT_LEN`] bytes.
///
/// Oversized messages keep the longest char-aligned prefix that still leaves
/// room for [`TRUNCATION_INDICATOR`]. Short messages are borrowed untouched.
pub fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let budget = MAX_FIELD_OUTPUT_LEN - TRUNCATION_INDICATOR.len();
    let cut = s
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .take_while(|end| *end <= budget)
        .last()
        .unwrap_or(0);

    Cow::Owned([&s[..cut], TRUNCATION_INDICATOR].concat())
}
