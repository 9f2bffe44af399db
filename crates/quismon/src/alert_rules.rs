//! `/v1/checks/{check_id}/alerts` endpoints.
//!
//! Alert rules are nested under their check, so every call needs both ids.

use crate::client::{Client, not_found};
use crate::error::Result;
use crate::transport::Method;
use crate::types::{AlertRule, CreateAlertRuleRequest, UpdateAlertRuleRequest};

fn alerts_path(check_id: &str) -> String {
    format!("/v1/checks/{check_id}/alerts")
}

fn alert_path(check_id: &str, id: &str) -> String {
    format!("/v1/checks/{check_id}/alerts/{id}")
}

impl Client {
    pub fn list_alert_rules(&self, check_id: &str) -> Result<Vec<AlertRule>> {
        self.call(Method::Get, &alerts_path(check_id), None::<&()>)
            .map_err(not_found("check", check_id))
    }

    pub fn get_alert_rule(&self, check_id: &str, id: &str) -> Result<AlertRule> {
        self.call(Method::Get, &alert_path(check_id, id), None::<&()>)
            .map_err(not_found("alert rule", id))
    }

    pub fn create_alert_rule(
        &self,
        check_id: &str,
        request: &CreateAlertRuleRequest,
    ) -> Result<AlertRule> {
        self.call(Method::Post, &alerts_path(check_id), Some(request))
    }

    /// Sparse update: only the fields set in `request` are sent.
    pub fn update_alert_rule(
        &self,
        check_id: &str,
        id: &str,
        request: &UpdateAlertRuleRequest,
    ) -> Result<AlertRule> {
        self.call(Method::Put, &alert_path(check_id, id), Some(request))
            .map_err(not_found("alert rule", id))
    }

    pub fn delete_alert_rule(&self, check_id: &str, id: &str) -> Result<()> {
        self.do_request(Method::Delete, &alert_path(check_id, id), None::<&()>)
            .map(|_| ())
            .map_err(not_found("alert rule", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn client() -> (Client, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let client = Client::with_transport("https://api.test", "key", mock.clone()).unwrap();
        (client, mock)
    }

    #[test]
    fn test_alert_paths_nest_under_check() {
        assert_eq!(alerts_path("c1"), "/v1/checks/c1/alerts");
        assert_eq!(alert_path("c1", "r1"), "/v1/checks/c1/alerts/r1");
    }

    #[test]
    fn test_create_alert_rule() {
        let (client, mock) = client();
        mock.push_json(
            201,
            &json!({"data": {
                "id": "r1",
                "check_id": "c1",
                "name": "down",
                "condition": {"consecutive_failures": 3},
                "notification_channel_ids": ["ch1"],
                "enabled": true
            }})
            .to_string(),
        );

        let request = CreateAlertRuleRequest {
            name: "down".to_string(),
            condition: json!({"consecutive_failures": "3"}).as_object().unwrap().clone(),
            notification_channel_ids: vec!["ch1".to_string()],
            enabled: true,
        };
        let rule = client.create_alert_rule("c1", &request).unwrap();
        assert_eq!(rule.condition["consecutive_failures"], json!(3));

        let req = mock.last_request().unwrap();
        assert_eq!(req.url, "https://api.test/v1/checks/c1/alerts");
        assert_eq!(req.json_body().unwrap()["notification_channel_ids"], json!(["ch1"]));
    }

    #[test]
    fn test_update_alert_rule_sends_only_set_fields() {
        let (client, mock) = client();
        mock.push_json(200, &json!({"data": {"id": "r1", "check_id": "c1", "name": "down"}}).to_string());

        let request = UpdateAlertRuleRequest {
            enabled: Some(false),
            ..Default::default()
        };
        client.update_alert_rule("c1", "r1", &request).unwrap();
        assert_eq!(mock.last_request().unwrap().json_body(), Some(json!({"enabled": false})));
    }

    #[test]
    fn test_get_alert_rule_not_found() {
        let (client, mock) = client();
        mock.push_json(404, "");
        let err = client.get_alert_rule("c1", "r1").unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "alert rule", .. }));
    }
}
