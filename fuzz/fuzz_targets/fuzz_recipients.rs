#![no_main]

use gql_error_shield::mail::validate_recipients;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(spec) = std::str::from_utf8(data) else {
        return;
    };

    let verdict = validate_recipients(spec);
    if spec.contains(['\r', '\n']) {
        assert!(!verdict.is_accepted());
    }
    for mailbox in verdict.recipients().unwrap_or_default() {
        assert!(!mailbox.address.contains(['\r', '\n']));
        if let Some(name) = &mailbox.name {
            assert!(!name.contains(['\r', '\n']));
        }
    }
});
