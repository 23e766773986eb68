//! Extension redaction.
//!
//! Raw extensions are untrusted and unshaped. They are first read through
//! [`RawExtensions`], a typed view over the fields the pipeline cares about
//! (`code`, `httpStatus`, `error`) plus everything else as a residual map.
//! Sanitizing then works on that view, never on the raw value.
//!
//! # Rules
//!
//! - Deny-set keys are dropped at the top level
//! - A nested `error` object is filtered with the same deny set, recursively,
//!   and omitted when nothing safe is left
//! - `httpStatus` survives only when it is a usable status (an integral
//!   number in 100..=599). A surviving value always drives the batch status
//! - `code` and `correlationId` are written last so input cannot shadow them
//!
//! The input value is only borrowed; it is never modified.

use crate::definitions::{CODE_KEY, CORRELATION_ID_KEY, HTTP_STATUS_KEY, NESTED_ERROR_KEY};
use crate::SanitizePolicy;
use serde_json::{Map, Value};

/// Typed view over a raw extensions value.
#[derive(Debug, Default)]
pub struct RawExtensions<'a> {
    /// Raw `code`, when it is a string.
    pub code: Option<&'a str>,
    /// `httpStatus`, when it is an integral number in 100..=599.
    pub http_status: Option<u16>,
    /// Nested `error`, when it is an object.
    pub error: Option<&'a Map<String, Value>>,
    /// Every other key, in input order.
    pub rest: Vec<(&'a str, &'a Value)>,
}

impl<'a> RawExtensions<'a> {
    /// Read a raw extensions value. Non-objects yield an empty view.
    pub fn read(raw: Option<&'a Value>) -> Self {
        let Some(Value::Object(map)) = raw else {
            return Self::default();
        };

        let mut view = Self::default();
        for (key, value) in map {
            match key.as_str() {
                CODE_KEY => view.code = value.as_str(),
                HTTP_STATUS_KEY => view.http_status = as_status(value),
                NESTED_ERROR_KEY => match value {
                    Value::Object(nested) => view.error = Some(nested),
                    other => view.rest.push((key.as_str(), other)),
                },
                // Always rewritten by the pipeline.
                CORRELATION_ID_KEY => {}
                _ => view.rest.push((key.as_str(), value)),
            }
        }
        view
    }

    /// Status override carried by `httpStatus`.
    #[inline]
    pub fn status_override(&self) -> Option<u16> {
        self.http_status
    }
}

/// Read a JSON value as an HTTP status. `418` and `418.0` both qualify.
fn as_status(value: &Value) -> Option<u16> {
    let Value::Number(n) = value else {
        return None;
    };
    let status = match n.as_u64() {
        Some(int) => int,
        None => {
            let float = n.as_f64()?;
            if float.fract() != 0.0 || !(100.0..=599.0).contains(&float) {
                return None;
            }
            float as u64
        }
    };
    u16::try_from(status).ok().filter(|s| (100..=599).contains(s))
}

impl SanitizePolicy {
    /// Build client-safe extensions from a raw extensions value.
    ///
    /// Missing or non-object input yields only `code` and `correlationId`.
    pub fn sanitize_extensions(
        &self,
        raw: Option<&Value>,
        display_code: &str,
        correlation_id: &str,
    ) -> Map<String, Value> {
        self.sanitize_view(&RawExtensions::read(raw), display_code, correlation_id)
    }

    /// Build client-safe extensions from an already read view.
    pub fn sanitize_view(
        &self,
        raw: &RawExtensions<'_>,
        display_code: &str,
        correlation_id: &str,
    ) -> Map<String, Value> {
        let mut out = Map::new();

        for (key, value) in &raw.rest {
            if !self.is_denied(key) {
                out.insert((*key).to_owned(), (*value).clone());
            }
        }

        if let Some(nested) = raw.error.filter(|_| !self.is_denied(NESTED_ERROR_KEY)) {
            if let Some(clean) = self.sanitize_nested(nested) {
                out.insert(NESTED_ERROR_KEY.to_owned(), Value::Object(clean));
            }
        }

        if let Some(status) = raw.http_status.filter(|_| !self.is_denied(HTTP_STATUS_KEY)) {
            out.insert(HTTP_STATUS_KEY.to_owned(), Value::from(status));
        }

        out.insert(CODE_KEY.to_owned(), Value::String(display_code.to_owned()));
        out.insert(
            CORRELATION_ID_KEY.to_owned(),
            Value::String(correlation_id.to_owned()),
        );
        out
    }

    /// Filter a nested error object. `None` when no safe key remains.
    fn sanitize_nested(&self, nested: &Map<String, Value>) -> Option<Map<String, Value>> {
        let mut out = Map::new();
        for (key, value) in nested {
            if self.is_denied(key) {
                continue;
            }
            match value {
                Value::Object(inner) if key == NESTED_ERROR_KEY => {
                    if let Some(clean) = self.sanitize_nested(inner) {
                        out.insert(key.clone(), Value::Object(clean));
                    }
                }
                other => {
                    out.insert(key.clone(), other.clone());
                }
            }
        }
        (!out.is_empty()).then_some(out)
    }
}
