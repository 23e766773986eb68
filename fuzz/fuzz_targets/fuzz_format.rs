#![no_main]

use gql_error_shield::definitions::DENIED_EXTENSION_KEYS;
use gql_error_shield::{ErrorFormatter, RawError};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // Whatever JSON arrives as extensions, formatting must not panic and
    // denied keys must never reach the client.
    let Ok(extensions) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    let errors = [RawError::new("fuzz").with_extensions(extensions)];
    let outcome = ErrorFormatter::default().format(&errors, "fuzz", None, None);

    assert!((100..=599).contains(&outcome.status_code));
    let ext = &outcome.formatted[0].extensions;
    assert!(ext.contains_key("code"));
    for key in DENIED_EXTENSION_KEYS {
        assert!(!ext.contains_key(*key));
    }
});
