//! Managed resource types
//!
//! Each resource maps a typed attribute model onto the Quismon API through
//! the shared [`quismon::Client`]. The helpers here are shared by the check
//! and notification channel resources, whose `config` maps come back from
//! the API with secrets redacted and values in their JSON types.

pub mod alert_rule;
pub mod check;
pub mod notification_channel;
pub mod organization_otlp;
pub mod plan_modifier;
pub mod signup;

pub use alert_rule::AlertRuleResource;
pub use check::CheckResource;
pub use notification_channel::NotificationChannelResource;
pub use organization_otlp::OrganizationOtlpResource;
pub use signup::SignupResource;

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Words that mark a config key as one whose value the API redacts or
/// never returns verbatim. Multi-word entries must appear adjacent.
const SENSITIVE_WORDS: &[&[&str]] = &[
    &["password"],
    &["token"],
    &["secret"],
    &["auth"],
    &["authorization"],
    &["api", "key"],
    &["routing", "key"],
    &["integration", "key"],
];

static REDACTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*+|\[?REDACTED\]?)$").expect("redaction pattern is valid")
});

/// Matches whole `_` or `-` separated words, so `author` is not `auth`.
pub fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    let words: Vec<&str> = key.split(['_', '-']).collect();
    SENSITIVE_WORDS
        .iter()
        .any(|pattern| words.windows(pattern.len()).any(|window| window == *pattern))
}

fn is_redacted(value: &Value) -> bool {
    value.as_str().is_some_and(|s| REDACTED.is_match(s.trim()))
}

/// Render a JSON value the way it is stored in a string map.
///
/// Integral numbers lose any fractional part, bools become `true`/`false`,
/// and structured values are encoded as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Whether a remote value means the same as the stored string, e.g. a JSON
/// object versus its encoded form, or `30.0` versus `"30"`.
fn semantically_equal(stored: &str, remote: &Value) -> bool {
    if stringify(remote) == stored {
        return true;
    }
    let Ok(decoded) = serde_json::from_str::<Value>(stored) else {
        return false;
    };
    match remote {
        Value::String(s) => serde_json::from_str::<Value>(s).is_ok_and(|r| r == decoded),
        other => *other == decoded,
    }
}

/// Merge a remote config map into the stored one.
///
/// Only keys already in state are considered. Secrets, redacted
/// placeholders, equivalent values and keys the API did not return keep
/// the stored value; anything else takes the remote value as a string.
pub fn reconcile_config(
    stored: &BTreeMap<String, String>,
    remote: &Map<String, Value>,
) -> BTreeMap<String, String> {
    stored
        .iter()
        .map(|(key, prior)| {
            let value = match remote.get(key) {
                None | Some(Value::Null) => prior.clone(),
                Some(_) if is_sensitive_key(key) => prior.clone(),
                Some(v) if is_redacted(v) => prior.clone(),
                Some(v) if semantically_equal(prior, v) => prior.clone(),
                Some(v) => stringify(v),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Stringify every value of a map returned by the API.
pub fn string_map(values: &Map<String, Value>) -> BTreeMap<String, String> {
    values.iter().map(|(k, v)| (k.clone(), stringify(v))).collect()
}

/// The wire form of a declared string map.
pub fn json_map(values: &BTreeMap<String, String>) -> Map<String, Value> {
    values
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Translate a client error into a framework error.
///
/// `NotFound` keeps its meaning so refresh can drop the instance; local
/// validation failures point at the attribute that caused them.
pub fn remote_error(summary: &str, resource_type: &str, err: quismon::Error) -> declarative::Error {
    match err {
        quismon::Error::NotFound { id, .. } => declarative::Error::NotFound {
            resource_type: resource_type.to_string(),
            id,
        },
        quismon::Error::InvalidConfig { field, message } => {
            declarative::Error::configuration(format!("config.{field}"), message)
        }
        quismon::Error::InvalidRegion(_) => declarative::Error::configuration("regions", err.to_string()),
        other => declarative::Error::remote(summary, other),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Client wired to a [`MockTransport`].

    use quismon::{Client, MockTransport};
    use std::sync::Arc;

    pub fn client() -> (Client, MockTransport) {
        let mock = MockTransport::new();
        let client = Client::with_transport("https://api.test", "qm_test", Arc::new(mock.clone()))
            .expect("valid base URL");
        (client, mock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!(30)), "30");
        assert_eq!(stringify(&json!(30.0)), "30");
        assert_eq!(stringify(&json!(0.5)), "0.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(stringify(&Value::Null), "");
    }

    #[test]
    fn test_sensitive_keys() {
        assert!(is_sensitive_key("password"));
        assert!(is_sensitive_key("auth_header"));
        assert!(is_sensitive_key("PagerDuty_Routing_Key"));
        assert!(!is_sensitive_key("url"));
    }

    #[test]
    fn test_sensitive_keys_match_whole_words() {
        assert!(is_sensitive_key("auth"));
        assert!(is_sensitive_key("basic_auth"));
        assert!(is_sensitive_key("bot-token"));
        assert!(is_sensitive_key("api_key"));
        assert!(!is_sensitive_key("author"));
        assert!(!is_sensitive_key("oauth_scope"));
        assert!(!is_sensitive_key("tokenizer"));
        assert!(!is_sensitive_key("key"));
    }

    #[test]
    fn test_reconcile_keeps_redacted_and_sensitive() {
        let prior = stored(&[("url", "https://hooks.example"), ("secret", "s3cr3t"), ("token", "abc")]);
        let remote = json!({"url": "https://hooks.example", "secret": "changed", "token": "****"});
        let merged = reconcile_config(&prior, remote.as_object().unwrap());
        assert_eq!(merged, prior);
    }

    #[test]
    fn test_reconcile_redacted_placeholder_on_plain_key() {
        let prior = stored(&[("webhook", "https://x")]);
        let remote = json!({"webhook": "[REDACTED]"});
        assert_eq!(reconcile_config(&prior, remote.as_object().unwrap()), prior);
    }

    #[test]
    fn test_reconcile_semantic_equality() {
        let prior = stored(&[("timeout", "30"), ("headers", r#"{"X-A": "1"}"#)]);
        let remote = json!({"timeout": 30.0, "headers": {"X-A": "1"}});
        assert_eq!(reconcile_config(&prior, remote.as_object().unwrap()), prior);
    }

    #[test]
    fn test_reconcile_takes_remote_drift() {
        let prior = stored(&[("url", "https://old"), ("method", "GET"), ("missing", "kept")]);
        let remote = json!({"url": "https://new", "method": "GET", "extra": "ignored"});
        let merged = reconcile_config(&prior, remote.as_object().unwrap());
        assert_eq!(merged["url"], "https://new");
        assert_eq!(merged["missing"], "kept");
        assert!(!merged.contains_key("extra"));
    }

    #[test]
    fn test_reconcile_takes_drift_on_lookalike_keys() {
        let prior = stored(&[("author", "alice"), ("oauth_scope", "read")]);
        let remote = json!({"author": "bob", "oauth_scope": "write"});
        let merged = reconcile_config(&prior, remote.as_object().unwrap());
        assert_eq!(merged["author"], "bob");
        assert_eq!(merged["oauth_scope"], "write");
    }

    #[test]
    fn test_remote_error_mapping() {
        let err = remote_error(
            "Error reading check",
            "quismon_check",
            quismon::Error::NotFound {
                kind: "check",
                id: "c1".into(),
            },
        );
        assert!(err.is_not_found());

        let err = remote_error("x", "quismon_check", quismon::Error::invalid_config("url", "missing"));
        assert!(matches!(err, declarative::Error::Configuration { ref attribute, .. } if attribute == "config.url"));

        let err = remote_error(
            "Error creating check",
            "quismon_check",
            quismon::Error::Api {
                status: 422,
                message: "bad".into(),
            },
        );
        assert_eq!(err.to_string(), "Error creating check: API error (422): bad");
    }
}
