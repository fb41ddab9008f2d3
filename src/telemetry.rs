//! Logging setup and PII redaction for log output.

use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fields that identify a patient and must never reach the logs.
pub const REDACTED_FIELDS: &[&str] = &["name", "email", "phone", "message"];

const REDACTED: &str = "[REDACTED]";

/// Initialise structured logging. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Default log level: info for our crate, warn for others
                "second_opinion_site=info,tower_http=debug,axum=debug,warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Copy of `value` with every PII field (at any depth) replaced.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(key, value)| {
                    let redacted = if REDACTED_FIELDS.contains(&key.as_str()) && !value.is_null() {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact(value)
                    };
                    (key.clone(), redacted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}
