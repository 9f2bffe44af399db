//! Typed view over a check's configuration map.
//!
//! The API accepts a free-form JSON object per check. The fields that must be
//! present depend on the check type, so the map is classified into a
//! [`CheckConfig`] before it is sent. Unknown keys are never dropped: every
//! variant keeps the complete wire map in `fields`, and the typed members are
//! validated views into it.

use crate::error::{Error, Result};
use crate::types::CheckType;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum CheckConfig {
    /// http, https, http3
    Http { url: String, fields: Map<String, Value> },
    /// tcp, udp
    Tcp {
        host: String,
        port: u16,
        fields: Map<String, Value>,
    },
    Ping { host: String, fields: Map<String, Value> },
    MultiStep {
        steps: Vec<Value>,
        fields: Map<String, Value>,
    },
    /// dns, ssl, smtp-imap, throughput: passed through as given.
    Opaque(Map<String, Value>),
}

impl CheckConfig {
    /// Validate `fields` against the requirements of `check_type`.
    pub fn classify(check_type: CheckType, fields: Map<String, Value>) -> Result<Self> {
        match check_type {
            CheckType::Http | CheckType::Https | CheckType::Http3 => {
                // URL syntax is left to the API.
                let url = required_string(&fields, "url")?;
                Ok(Self::Http { url, fields })
            }
            CheckType::Tcp | CheckType::Udp => {
                let host = required_string(&fields, "host")?;
                let port = port(&fields)?;
                Ok(Self::Tcp { host, port, fields })
            }
            CheckType::Ping => {
                let host = required_string(&fields, "host")?;
                Ok(Self::Ping { host, fields })
            }
            CheckType::MultiStep => {
                let steps = steps(&fields)?;
                Ok(Self::MultiStep { steps, fields })
            }
            CheckType::Dns | CheckType::Ssl | CheckType::SmtpImap | CheckType::Throughput => {
                Ok(Self::Opaque(fields))
            }
        }
    }

    /// Short description used in logs and plan output.
    pub fn target(&self) -> String {
        match self {
            Self::Http { url, .. } => url.clone(),
            Self::Tcp { host, port, .. } => format!("{host}:{port}"),
            Self::Ping { host, .. } => host.clone(),
            Self::MultiStep { steps, .. } => format!("{} steps", steps.len()),
            Self::Opaque(fields) => format!("{} keys", fields.len()),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            Self::Http { fields, .. }
            | Self::Tcp { fields, .. }
            | Self::Ping { fields, .. }
            | Self::MultiStep { fields, .. }
            | Self::Opaque(fields) => fields,
        }
    }

    /// The wire representation, exactly as it was classified.
    pub fn into_map(self) -> Map<String, Value> {
        match self {
            Self::Http { fields, .. }
            | Self::Tcp { fields, .. }
            | Self::Ping { fields, .. }
            | Self::MultiStep { fields, .. }
            | Self::Opaque(fields) => fields,
        }
    }
}

fn required_string(fields: &Map<String, Value>, key: &str) -> Result<String> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err(Error::invalid_config(key, "is required for this check type"))
        }
        Some(other) => Err(Error::invalid_config(
            key,
            format!("expected a string, got {other}"),
        )),
    }
}

/// Ports arrive as numbers from `config_json` and as strings from `config`.
fn port(fields: &Map<String, Value>) -> Result<u16> {
    let parsed = match fields.get("port") {
        Some(Value::Number(n)) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Some(Value::String(s)) => s.trim().parse::<u16>().ok(),
        None | Some(Value::Null) => {
            return Err(Error::invalid_config("port", "is required for this check type"));
        }
        Some(_) => None,
    };
    match parsed {
        Some(p) if p > 0 => Ok(p),
        _ => Err(Error::invalid_config("port", "expected a port between 1 and 65535")),
    }
}

/// Steps arrive as an array from `config_json` and as a JSON-encoded string
/// from `config`.
fn steps(fields: &Map<String, Value>) -> Result<Vec<Value>> {
    let steps = match fields.get("steps") {
        Some(Value::Array(steps)) => steps.clone(),
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Array(steps)) => steps,
            _ => return Err(Error::invalid_config("steps", "expected a JSON array")),
        },
        _ => return Err(Error::invalid_config("steps", "is required for multistep checks")),
    };
    if steps.is_empty() {
        return Err(Error::invalid_config("steps", "must contain at least one step"));
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_http_requires_url() {
        let err = CheckConfig::classify(CheckType::Https, map(json!({"method": "GET"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref field, .. } if field == "url"));
    }

    #[test]
    fn test_http_keeps_extra_keys() {
        let fields = map(json!({
            "url": "https://example.com/health",
            "method": "GET",
            "expected_status_code": "200",
            "headers": "{\"Authorization\":\"Bearer x\"}"
        }));
        let config = CheckConfig::classify(CheckType::Https, fields.clone()).unwrap();
        assert_eq!(config.target(), "https://example.com/health");
        assert_eq!(config.into_map(), fields);
    }

    #[test]
    fn test_http_url_scheme_is_not_checked_locally() {
        let config = CheckConfig::classify(CheckType::Http, map(json!({"url": "example.com/health"}))).unwrap();
        assert_eq!(config.target(), "example.com/health");

        let err = CheckConfig::classify(CheckType::Http3, map(json!({"url": "  "}))).unwrap_err();
        assert!(err.to_string().contains("url"));
    }

    #[test]
    fn test_tcp_port_from_string_or_number() {
        let from_string =
            CheckConfig::classify(CheckType::Tcp, map(json!({"host": "db.internal", "port": "5432"}))).unwrap();
        assert_eq!(from_string.target(), "db.internal:5432");

        let from_number =
            CheckConfig::classify(CheckType::Udp, map(json!({"host": "dns.internal", "port": 53}))).unwrap();
        assert!(matches!(from_number, CheckConfig::Tcp { port: 53, .. }));
    }

    #[test]
    fn test_tcp_rejects_bad_port() {
        for port in [json!("0"), json!("70000"), json!("http"), json!(true)] {
            let result = CheckConfig::classify(CheckType::Tcp, map(json!({"host": "h", "port": port})));
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_ping_requires_host() {
        assert!(CheckConfig::classify(CheckType::Ping, map(json!({"packet_count": "3"}))).is_err());
        assert!(CheckConfig::classify(CheckType::Ping, map(json!({"host": "8.8.8.8"}))).is_ok());
    }

    #[test]
    fn test_multistep_accepts_encoded_steps() {
        let config = CheckConfig::classify(
            CheckType::MultiStep,
            map(json!({"steps": "[{\"url\":\"https://a\"},{\"url\":\"https://b\"}]"})),
        )
        .unwrap();
        assert_eq!(config.target(), "2 steps");

        assert!(CheckConfig::classify(CheckType::MultiStep, map(json!({"steps": []}))).is_err());
    }

    #[test]
    fn test_other_types_are_opaque() {
        let fields = map(json!({"hostname": "example.com", "record_type": "A"}));
        let config = CheckConfig::classify(CheckType::Dns, fields.clone()).unwrap();
        assert_eq!(config, CheckConfig::Opaque(fields));
    }
}
