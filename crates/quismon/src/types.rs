//! Wire types for the Quismon API.
//!
//! Response types are lenient (`#[serde(default)]` on everything the server
//! may omit). Request types skip optional fields that are not set, which is
//! what makes the sparse alert-rule update possible.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Enumerations
// =============================================================================

/// Kind of probe a check runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckType {
    Http,
    Https,
    Http3,
    Tcp,
    Udp,
    Ping,
    Dns,
    Ssl,
    MultiStep,
    SmtpImap,
    Throughput,
}

impl CheckType {
    pub const ALL: [CheckType; 11] = [
        Self::Http,
        Self::Https,
        Self::Tcp,
        Self::Ping,
        Self::Udp,
        Self::Dns,
        Self::Ssl,
        Self::MultiStep,
        Self::SmtpImap,
        Self::Throughput,
        Self::Http3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Http3 => "http3",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Ping => "ping",
            Self::Dns => "dns",
            Self::Ssl => "ssl",
            Self::MultiStep => "multistep",
            Self::SmtpImap => "smtp-imap",
            Self::Throughput => "throughput",
        }
    }

    /// Wire names of every check type.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(CheckType::as_str).collect()
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown check type: {s}"))
    }
}

/// Delivery mechanism of a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    Email,
    Webhook,
    Ntfy,
    Slack,
    PagerDuty,
}

impl ChannelType {
    pub const ALL: [ChannelType; 5] = [
        Self::Email,
        Self::Webhook,
        Self::Ntfy,
        Self::Slack,
        Self::PagerDuty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Webhook => "webhook",
            Self::Ntfy => "ntfy",
            Self::Slack => "slack",
            Self::PagerDuty => "pagerduty",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(ChannelType::as_str).collect()
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown notification channel type: {s}"))
    }
}

// =============================================================================
// Checks
// =============================================================================

/// A monitoring check as returned by the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Check {
    pub id: String,
    pub org_id: String,
    pub name: String,
    /// Kept as a string so unknown server-side types still decode.
    #[serde(rename = "type")]
    pub check_type: String,
    pub config: Map<String, Value>,
    pub config_hash: String,
    pub interval_seconds: i64,
    pub regions: Vec<String>,
    pub enabled: bool,
    pub inverted: bool,
    pub simultaneous_regions: bool,
    pub recheck_on_failure: bool,
    pub expires_after_seconds: Option<i64>,
    pub health_status: String,
    pub last_checked: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCheckRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub check_type: String,
    pub config: Map<String, Value>,
    pub interval_seconds: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simultaneous_regions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recheck_on_failure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UpdateCheckRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simultaneous_regions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recheck_on_failure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_after_seconds: Option<i64>,
}

// =============================================================================
// Notification channels
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationChannel {
    pub id: String,
    pub org_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub config: Map<String, Value>,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateNotificationChannelRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub config: Map<String, Value>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UpdateNotificationChannelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

// =============================================================================
// Alert rules
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertRule {
    pub id: String,
    pub check_id: String,
    pub name: String,
    pub condition: Map<String, Value>,
    pub notification_channel_ids: Vec<String>,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAlertRuleRequest {
    pub name: String,
    pub condition: Map<String, Value>,
    pub notification_channel_ids: Vec<String>,
    pub enabled: bool,
}

/// Sparse patch: unset fields are left untouched by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct UpdateAlertRuleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_channel_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl UpdateAlertRuleRequest {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// =============================================================================
// Signup
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickSignupRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct QuickSignupResponse {
    pub org_id: String,
    pub api_key: String,
    pub email: String,
    pub verification_required: bool,
}

// =============================================================================
// Organization OTLP export
// =============================================================================

/// Body of `PUT /v1/org/otlp`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct OtlpConfigRequest {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_interval_seconds: Option<i64>,
}

/// Current export configuration. Headers are write-only.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct OtlpConfig {
    pub otlp_enabled: bool,
    pub otlp_endpoint: Option<String>,
    pub otlp_headers: Option<Map<String, Value>>,
    pub otlp_export_interval_seconds: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_type_round_trip_names() {
        assert_eq!(CheckType::names().len(), 11);
        assert_eq!("smtp-imap".parse::<CheckType>().unwrap(), CheckType::SmtpImap);
        assert_eq!("multistep".parse::<CheckType>().unwrap(), CheckType::MultiStep);
        assert!("gopher".parse::<CheckType>().is_err());
    }

    #[test]
    fn test_channel_type_parse() {
        assert_eq!("pagerduty".parse::<ChannelType>().unwrap(), ChannelType::PagerDuty);
        assert!("carrier-pigeon".parse::<ChannelType>().is_err());
    }

    #[test]
    fn test_check_decodes_with_missing_fields() {
        let check: Check = serde_json::from_value(json!({
            "id": "c1",
            "name": "api",
            "type": "https",
            "interval_seconds": 60,
            "last_checked": null
        }))
        .unwrap();
        assert_eq!(check.check_type, "https");
        assert!(check.last_checked.is_none());
        assert!(check.regions.is_empty());
    }

    #[test]
    fn test_create_check_request_omits_unset_options() {
        let req = CreateCheckRequest {
            name: "api".to_string(),
            check_type: "https".to_string(),
            config: Map::new(),
            interval_seconds: 60,
            regions: vec![],
            enabled: true,
            inverted: None,
            simultaneous_regions: None,
            recheck_on_failure: Some(false),
            expires_after_seconds: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("regions"));
        assert!(!obj.contains_key("inverted"));
        assert!(!obj.contains_key("expires_after_seconds"));
        assert_eq!(obj["recheck_on_failure"], json!(false));
        assert_eq!(obj["type"], json!("https"));
    }

    #[test]
    fn test_sparse_alert_patch_serialization() {
        let patch = UpdateAlertRuleRequest {
            condition: Some(json!({"consecutive_failures": "5"}).as_object().unwrap().clone()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"condition": {"consecutive_failures": "5"}})
        );
        assert!(UpdateAlertRuleRequest::default().is_empty());
    }

    #[test]
    fn test_signup_request_omits_org_name() {
        let req = QuickSignupRequest {
            email: "ops@example.com".to_string(),
            org_name: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"email": "ops@example.com"})
        );
    }
}
