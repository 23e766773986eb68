//! Property-based tests for gql_error_shield
//!
//! These tests use proptest to generate random inputs and verify invariants hold.

use gql_error_shield::definitions::{DENIED_EXTENSION_KEYS, LEGACY_CODES};
use gql_error_shield::mail::{validate_recipients, RejectReason};
use gql_error_shield::{ErrorCode, ErrorFormatter, ErrorLogRecord, LogSink, RawError, SanitizePolicy};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

fn canonical_code() -> impl Strategy<Value = ErrorCode> {
    prop::sample::select(ErrorCode::ALL.to_vec())
}

fn denied_key() -> impl Strategy<Value = &'static str> {
    prop::sample::select(DENIED_EXTENSION_KEYS.to_vec())
}

/// Keys that are neither denied nor interpreted by the pipeline.
fn safe_key() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,12}".prop_filter("reserved or denied key", |k| {
        !DENIED_EXTENSION_KEYS.contains(&k.as_str())
            && !["code", "correlationId", "httpStatus", "error"].contains(&k.as_str())
    })
}

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "\\PC{0,40}".prop_map(Value::String),
    ]
}

fn safe_map() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(safe_key(), leaf_value(), 0..8)
        .prop_map(|m| m.into_iter().collect())
}

#[derive(Default)]
struct CountingSink(AtomicUsize);

impl LogSink for CountingSink {
    fn log(&self, _record: &ErrorLogRecord<'_>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// CODE NORMALIZATION PROPERTIES
// ============================================================================

proptest! {
    /// Canonical codes are fixed points of normalization
    #[test]
    fn normalize_is_idempotent_on_canonical(code in canonical_code()) {
        let policy = SanitizePolicy::default();
        prop_assert_eq!(policy.normalize_code(Some(code.as_str())), code);
        let once = policy.normalize_code(Some(code.as_str()));
        prop_assert_eq!(policy.normalize_code(Some(once.as_str())), once);
    }

    /// Legacy codes hit their documented target
    #[test]
    fn legacy_codes_map_to_targets(idx in 0..LEGACY_CODES.len()) {
        let (raw, target) = LEGACY_CODES[idx];
        prop_assert_eq!(SanitizePolicy::default().normalize_code(Some(raw)), target);
    }

    /// Unknown codes never panic and always resolve to INTERNAL_SERVER_ERROR
    #[test]
    fn unknown_codes_fall_back(raw in "\\PC{0,64}") {
        let policy = SanitizePolicy::default();
        prop_assume!(ErrorCode::from_canonical(&raw).is_none());
        prop_assume!(!LEGACY_CODES.iter().any(|(legacy, _)| *legacy == raw));

        prop_assert_eq!(policy.normalize_code(Some(&raw)), ErrorCode::InternalServerError);
        let resolved = policy.resolve_code(Some(&raw));
        prop_assert_eq!(resolved.display.as_ref(), raw.as_str());
    }
}

// ============================================================================
// SANITIZATION PROPERTIES
// ============================================================================

proptest! {
    /// Denied keys never survive, whatever else is in the map
    #[test]
    fn denied_keys_are_always_removed(
        safe in safe_map(),
        denied in prop::collection::vec((denied_key(), leaf_value()), 1..6),
    ) {
        let mut ext = safe.clone();
        for (key, value) in denied {
            ext.insert(key.to_owned(), value);
        }

        let outcome = ErrorFormatter::default().format(
            &[RawError::new("m").with_extensions(Value::Object(ext))],
            "corr",
            None,
            None,
        );
        let out = &outcome.formatted[0].extensions;
        for key in DENIED_EXTENSION_KEYS {
            prop_assert!(!out.contains_key(*key));
        }
        for key in safe.keys() {
            prop_assert!(out.contains_key(key));
        }
    }

    /// Safe-only maps come back unchanged plus the forced fields
    #[test]
    fn safe_maps_pass_through(safe in safe_map(), code in canonical_code()) {
        let mut ext = safe.clone();
        ext.insert("code".into(), json!(code.as_str()));

        let outcome = ErrorFormatter::default().format(
            &[RawError::new("m").with_extensions(Value::Object(ext))],
            "corr",
            None,
            None,
        );

        let mut expected = safe;
        expected.insert("code".into(), json!(code.as_str()));
        expected.insert("correlationId".into(), json!("corr"));
        prop_assert_eq!(&outcome.formatted[0].extensions, &expected);
    }

    /// Nested error keeps exactly its safe keys, or disappears
    #[test]
    fn nested_error_filtering(
        safe in safe_map(),
        denied in prop::collection::vec((denied_key(), leaf_value()), 0..4),
    ) {
        let mut nested = safe.clone();
        for (key, value) in denied {
            nested.insert(key.to_owned(), value);
        }

        let outcome = ErrorFormatter::default().format(
            &[RawError::new("m").with_extensions(json!({ "error": nested }))],
            "corr",
            None,
            None,
        );
        let out = &outcome.formatted[0].extensions;

        if safe.is_empty() {
            prop_assert!(!out.contains_key("error"));
        } else {
            prop_assert_eq!(&out["error"], &Value::Object(safe));
        }
    }

    /// Arbitrary extension values never panic and always carry code + correlationId
    #[test]
    fn any_extensions_are_handled(ext in leaf_value(), corr in "[a-z0-9-]{1,36}") {
        let outcome = ErrorFormatter::default().format(
            &[RawError::new("m").with_extensions(ext)],
            &corr,
            None,
            None,
        );
        let err = &outcome.formatted[0];
        prop_assert_eq!(err.code(), Some("INTERNAL_SERVER_ERROR"));
        prop_assert_eq!(err.correlation_id(), Some(corr.as_str()));
        prop_assert_eq!(outcome.status_code, 500);
    }
}

// ============================================================================
// STATUS PROPERTIES
// ============================================================================

proptest! {
    /// Override beats every other source
    #[test]
    fn override_always_wins(
        code in canonical_code(),
        http_status in 100u16..600,
        override_status in 100u16..600,
    ) {
        let err = RawError::new("m").with_extensions(json!({ "code": code.as_str(), "httpStatus": http_status }));
        let outcome = ErrorFormatter::default().format(&[err], "c", None, Some(override_status));
        prop_assert_eq!(outcome.status_code, override_status);
    }

    /// httpStatus beats the code table
    #[test]
    fn http_status_beats_table(code in canonical_code(), http_status in 100u16..600) {
        let err = RawError::new("m").with_extensions(json!({ "code": code.as_str(), "httpStatus": http_status }));
        let outcome = ErrorFormatter::default().format(&[err], "c", None, None);
        prop_assert_eq!(outcome.status_code, http_status);
    }

    /// Without httpStatus the table decides
    #[test]
    fn table_decides_without_http_status(code in canonical_code()) {
        let err = RawError::new("m").with_extensions(json!({ "code": code.as_str() }));
        let outcome = ErrorFormatter::default().format(&[err], "c", None, None);
        prop_assert_eq!(outcome.status_code, code.http_status());
    }

    /// A surviving httpStatus is always the one that set the status
    #[test]
    fn payload_http_status_agrees_with_status(
        code in canonical_code(),
        raw in prop_oneof![
            (0u64..1000).prop_map(|n| json!(n)),
            (0u64..1000).prop_map(|n| json!(n as f64)),
            (-1000.0f64..1000.0).prop_map(|f| json!(f)),
        ],
    ) {
        let err = RawError::new("m").with_extensions(json!({ "code": code.as_str(), "httpStatus": raw }));
        let outcome = ErrorFormatter::default().format(&[err], "c", None, None);
        match outcome.formatted[0].extensions.get("httpStatus") {
            Some(kept) => prop_assert_eq!(kept.as_u64(), Some(u64::from(outcome.status_code))),
            None => prop_assert_eq!(outcome.status_code, code.http_status()),
        }
    }

    /// One record per call regardless of batch size
    #[test]
    fn logs_once_per_call(size in 0usize..32) {
        let sink = CountingSink::default();
        let errors: Vec<RawError> = (0..size).map(|i| RawError::new(format!("e{i}"))).collect();
        let outcome = ErrorFormatter::default().format(&errors, "c", Some(&sink), None);
        prop_assert_eq!(sink.0.load(Ordering::SeqCst), 1);
        prop_assert_eq!(outcome.formatted.len(), size);
    }
}

// ============================================================================
// RECIPIENT GUARD PROPERTIES
// ============================================================================

proptest! {
    /// A line break anywhere means rejection
    #[test]
    fn line_breaks_always_reject(
        prefix in "\\PC{0,40}",
        suffix in "\\PC{0,40}",
        brk in prop::sample::select(vec!["\r", "\n", "\r\n"]),
    ) {
        let spec = format!("{prefix}{brk}{suffix}");
        prop_assert_eq!(validate_recipients(&spec).reason(), Some(RejectReason::LineBreak));
    }

    /// Valid address lists are accepted in order
    #[test]
    fn valid_lists_keep_order(
        locals in prop::collection::vec("[a-z][a-z0-9]{0,10}", 1..6),
    ) {
        let addresses: Vec<String> = locals.iter().map(|l| format!("{l}@example.com")).collect();
        let spec = addresses.join(", ");
        let verdict = validate_recipients(&spec);

        let parsed: Vec<&str> = verdict
            .recipients()
            .unwrap_or_default()
            .iter()
            .map(|m| m.address.as_str())
            .collect();
        let expected: Vec<&str> = addresses.iter().map(String::as_str).collect();
        prop_assert_eq!(parsed, expected);
    }

    /// A broken entry never hides the valid entries after it
    #[test]
    fn unclosed_angle_does_not_hide_later_entries(
        junk in "[A-Za-z ]{0,12}",
        locals in prop::collection::vec("[a-z][a-z0-9]{0,10}", 1..5),
    ) {
        let addresses: Vec<String> = locals.iter().map(|l| format!("{l}@example.com")).collect();
        let spec = format!("{junk} <oops, {}", addresses.join(", "));
        let verdict = validate_recipients(&spec);

        let parsed: Vec<&str> = verdict
            .recipients()
            .unwrap_or_default()
            .iter()
            .map(|m| m.address.as_str())
            .collect();
        let expected: Vec<&str> = addresses.iter().map(String::as_str).collect();
        prop_assert_eq!(parsed, expected);
    }

    /// Validation never panics on arbitrary input
    #[test]
    fn validation_never_panics(spec in "\\PC{0,200}") {
        let _ = validate_recipients(&spec);
    }
}
