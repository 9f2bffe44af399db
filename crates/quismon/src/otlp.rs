//! Organization-wide OTLP export settings (`/v1/org/otlp`).
//!
//! This is a singleton: there is no id, only the current configuration.

use crate::client::Client;
use crate::error::Result;
use crate::transport::Method;
use crate::types::{OtlpConfig, OtlpConfigRequest};
use serde_json::Value;

const OTLP_PATH: &str = "/v1/org/otlp";

impl Client {
    pub fn get_otlp_config(&self) -> Result<OtlpConfig> {
        let data: Value = self.call(Method::Get, OTLP_PATH, None::<&()>)?;
        Ok(serde_json::from_value(unnest(data))?)
    }

    /// Replace the export configuration. The response body is not used;
    /// follow with [`Client::get_otlp_config`] to observe the result.
    pub fn set_otlp_config(&self, request: &OtlpConfigRequest) -> Result<()> {
        self.do_request(Method::Put, OTLP_PATH, Some(request))
            .map(|_| ())
    }

    /// Turn export off.
    pub fn disable_otlp(&self) -> Result<()> {
        self.set_otlp_config(&OtlpConfigRequest {
            enabled: false,
            endpoint: Some(String::new()),
            ..Default::default()
        })
    }
}

/// The endpoint has been observed wrapping its payload twice
/// (`{"data": {"data": {...}}}`); accept both shapes.
fn unnest(data: Value) -> Value {
    match data {
        Value::Object(mut map) if !map.contains_key("otlp_enabled") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
