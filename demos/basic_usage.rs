use gql_error_shield::{ErrorFormatter, ErrorLogRecord, LogSink, RawError, SanitizePolicy};
use serde_json::json;

/// Prints each record as one JSON line, the way a log shipper would see it.
struct StdoutSink;

impl LogSink for StdoutSink {
    fn log(&self, record: &ErrorLogRecord<'_>) {
        println!("   {}", record.to_json());
    }
}

fn resolve_user(id: u64) -> Result<(), RawError> {
    // Simulate a resolver that leaks its internals through extensions
    Err(RawError::new(format!("User {id} not found"))
        .at(2, 3)
        .with_path(["user"])
        .with_extensions(json!({
            "code": "NOT_FOUND",
            "stack": "Error: User not found\n    at resolveUser (user.js:42:11)",
            "internal": { "sql": "SELECT * FROM users WHERE id = 7" },
            "field": "id",
        })))
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    let formatter = ErrorFormatter::default();

    let errors: Vec<RawError> = [resolve_user(7), Err(RawError::new("Session expired")
        .with_extensions(json!({ "code": "auth_expired" })))]
    .into_iter()
    .filter_map(Result::err)
    .collect();

    // 1. What operators see
    println!("1. [LOG RECORD] one record per batch:");
    let outcome = formatter.format(&errors, "req-42", Some(&StdoutSink), None);

    // 2. What the client receives
    println!("\n2. [CLIENT RESPONSE] status {}", outcome.status_code);
    match serde_json::to_string_pretty(&outcome.formatted) {
        Ok(body) => println!("{body}"),
        Err(err) => println!("   could not serialize: {err}"),
    }

    // 3. A stricter policy loaded from configuration
    println!("\n3. [CUSTOM POLICY] deny 'field' as well:");
    let policy = SanitizePolicy::from_json(r#"{ "denied_keys": ["field"] }"#);
    match policy {
        Ok(policy) => {
            let outcome = ErrorFormatter::new(policy).format(&errors, "req-43", None, None);
            for err in &outcome.formatted {
                println!("   {:?}", err.extensions);
            }
        }
        Err(err) => println!("   bad policy: {err}"),
    }
}
