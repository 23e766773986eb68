//! Wire-facing data model for the error pipeline.
//!
//! # Trust Boundary
//!
//! - [`RawError`]: untrusted, unshaped input from the GraphQL executor. Its
//!   `extensions` may hold anything, including stack traces and secrets.
//! - [`FormattedError`]: client-safe output. Only constructible through the
//!   formatter, so a raw extensions value can never reach it unsanitized.
//!
//! Both sides use camelCase on the wire and omit absent optional fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;

/// Source location of an error inside the query document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// One step of a response path: a field name or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(u64),
    Field(String),
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        Self::Field(value.to_owned())
    }
}

impl From<u64> for PathSegment {
    fn from(value: u64) -> Self {
        Self::Index(value)
    }
}

/// Locations attached to one error. Almost always a single entry.
pub type Locations = SmallVec<[Location; 1]>;

/// Response path of one error. Inline up to four segments.
pub type ErrorPath = SmallVec<[PathSegment; 4]>;

/// Error record as produced by the execution engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Locations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<ErrorPath>,
    /// Arbitrary shape. Non-object values are treated as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl RawError {
    /// Error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attach an extensions value.
    pub fn with_extensions(mut self, extensions: Value) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Attach a response path.
    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        self.path = Some(path.into_iter().map(Into::into).collect());
        self
    }

    /// Attach one source location.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.locations
            .get_or_insert_with(SmallVec::new)
            .push(Location { line, column });
        self
    }
}

/// Client-safe error, one per raw error, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Locations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<ErrorPath>,
    pub extensions: Map<String, Value>,
}

impl FormattedError {
    pub(crate) fn new(
        message: String,
        locations: Option<Locations>,
        path: Option<ErrorPath>,
        extensions: Map<String, Value>,
    ) -> Self {
        Self {
            message,
            locations,
            path,
            extensions,
        }
    }

    /// The code shown to the client.
    pub fn code(&self) -> Option<&str> {
        self.extensions.get(crate::definitions::CODE_KEY).and_then(Value::as_str)
    }

    /// The correlation id stamped on this error.
    pub fn correlation_id(&self) -> Option<&str> {
        self.extensions
            .get(crate::definitions::CORRELATION_ID_KEY)
            .and_then(Value::as_str)
    }
}

/// Result of formatting one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOutcome {
    pub formatted: Vec<FormattedError>,
    pub status_code: u16,
}

impl FormatOutcome {
    /// True when the batch held no errors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.formatted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_error_deserializes_executor_shape() {
        let raw: RawError = serde_json::from_value(json!({
            "message": "boom",
            "locations": [{ "line": 3, "column": 7 }],
            "path": ["user", 0, "email"],
            "extensions": { "code": "NOT_FOUND" }
        }))
        .unwrap();

        assert_eq!(raw.message, "boom");
        assert_eq!(raw.locations.as_ref().unwrap()[0], Location { line: 3, column: 7 });
        let path = raw.path.unwrap();
        assert_eq!(path[0], PathSegment::Field("user".into()));
        assert_eq!(path[1], PathSegment::Index(0));
        assert_eq!(path[2], PathSegment::Field("email".into()));
    }

    #[test]
    fn raw_error_tolerates_missing_fields() {
        let raw: RawError = serde_json::from_value(json!({})).unwrap();
        assert_eq!(raw.message, "");
        assert!(raw.locations.is_none());
        assert!(raw.path.is_none());
        assert!(raw.extensions.is_none());
    }

    #[test]
    fn formatted_error_omits_absent_fields() {
        let err = FormattedError::new("nope".into(), None, None, Map::new());
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value, json!({ "message": "nope", "extensions": {} }));
    }

    #[test]
    fn outcome_uses_camel_case() {
        let outcome = FormatOutcome {
            formatted: Vec::new(),
            status_code: 500,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value, json!({ "formatted": [], "statusCode": 500 }));
    }
}
