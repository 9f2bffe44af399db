//! `quismon_organization_otlp` - organization-wide OTLP metric export
//!
//! A singleton with no remote ID. Headers are write-only: the API never
//! returns them, so the declared value is what state records.

use super::{json_map, remote_error};
use declarative::{Attribute, Resource, Result, Schema, Validator};
use quismon::{Client, OtlpConfig, OtlpConfigRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const TYPE_NAME: &str = "quismon_organization_otlp";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationOtlpModel {
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub export_interval_seconds: Option<i64>,
}

impl OrganizationOtlpModel {
    fn observe(&mut self, remote: OtlpConfig) {
        self.enabled = remote.otlp_enabled;
        if remote.otlp_endpoint.is_some() {
            self.endpoint = remote.otlp_endpoint;
        }
        if remote.otlp_export_interval_seconds.is_some() {
            self.export_interval_seconds = remote.otlp_export_interval_seconds;
        }
    }
}

pub struct OrganizationOtlpResource {
    client: Arc<Client>,
}

impl OrganizationOtlpResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    /// PUT the declared settings, then read back what the API kept.
    fn apply(&self, mut planned: OrganizationOtlpModel, summary: &str) -> Result<OrganizationOtlpModel> {
        let request = OtlpConfigRequest {
            enabled: planned.enabled,
            endpoint: planned.endpoint.clone(),
            headers: planned.headers.as_ref().map(json_map),
            export_interval_seconds: planned.export_interval_seconds,
        };
        self.client
            .set_otlp_config(&request)
            .map_err(|err| remote_error(summary, TYPE_NAME, err))?;

        let remote = self
            .client
            .get_otlp_config()
            .map_err(|err| remote_error("Error reading OTLP configuration", TYPE_NAME, err))?;
        planned.observe(remote);
        Ok(planned)
    }
}

impl Resource for OrganizationOtlpResource {
    type Model = OrganizationOtlpModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Manages the organization's OTLP metric export.")
            .attribute(Attribute::bool("enabled").required())
            .attribute(
                Attribute::string("endpoint")
                    .optional()
                    .describe("OTLP/HTTP collector URL")
                    .validate(Validator::MinLength(1)),
            )
            .attribute(
                Attribute::string_map("headers")
                    .optional()
                    .sensitive()
                    .describe("Headers sent with every export; never read back"),
            )
            .attribute(
                Attribute::int("export_interval_seconds")
                    .optional()
                    .computed()
                    .validate(Validator::AtLeast(10)),
            )
    }

    fn create(&self, planned: OrganizationOtlpModel) -> Result<OrganizationOtlpModel> {
        self.apply(planned, "Error configuring OTLP export")
    }

    fn read(&self, mut current: OrganizationOtlpModel) -> Result<OrganizationOtlpModel> {
        let remote = self
            .client
            .get_otlp_config()
            .map_err(|err| remote_error("Error reading OTLP configuration", TYPE_NAME, err))?;
        current.observe(remote);
        Ok(current)
    }

    fn update(&self, planned: OrganizationOtlpModel, _prior: &OrganizationOtlpModel) -> Result<OrganizationOtlpModel> {
        self.apply(planned, "Error updating OTLP export")
    }

    fn delete(&self, _current: &OrganizationOtlpModel) -> Result<()> {
        self.client
            .disable_otlp()
            .map_err(|err| remote_error("Error disabling OTLP export", TYPE_NAME, err))
    }

    fn import(&self, _id: &str) -> Result<OrganizationOtlpModel> {
        self.read(OrganizationOtlpModel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::client;
    use quismon::Method;
    use serde_json::json;

    const NESTED: &str = r#"{"data": {"data": {
        "otlp_enabled": true, "otlp_endpoint": "https://otel.example/v1/metrics",
        "otlp_export_interval_seconds": 60
    }}}"#;

    fn planned() -> OrganizationOtlpModel {
        OrganizationOtlpModel {
            enabled: true,
            endpoint: Some("https://otel.example/v1/metrics".into()),
            headers: Some([("Authorization".to_string(), "Bearer otel".to_string())].into()),
            export_interval_seconds: None,
        }
    }

    #[test]
    fn test_create_puts_then_reads_back() {
        let (client, mock) = client();
        mock.push_json(200, r#"{"data": null}"#);
        mock.push_json(200, NESTED);
        let resource = OrganizationOtlpResource::new(Arc::new(client));

        let state = resource.create(planned()).unwrap();
        assert_eq!(state.export_interval_seconds, Some(60));
        assert_eq!(state.headers, planned().headers);

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Put);
        let body = requests[0].json_body().unwrap();
        assert_eq!(body["headers"], json!({"Authorization": "Bearer otel"}));
        assert!(body.get("export_interval_seconds").is_none());
        assert_eq!(requests[1].method, Method::Get);
    }

    #[test]
    fn test_delete_disables_export() {
        let (client, mock) = client();
        mock.push_json(200, r#"{"data": null}"#);
        let resource = OrganizationOtlpResource::new(Arc::new(client));

        resource.delete(&planned()).unwrap();
        let body = mock.last_request().unwrap().json_body().unwrap();
        assert_eq!(body, json!({"enabled": false, "endpoint": ""}));
    }

    #[test]
    fn test_import_reads_current_config() {
        let (client, mock) = client();
        mock.push_json(200, r#"{"data": {"otlp_enabled": false, "otlp_endpoint": null}}"#);
        let resource = OrganizationOtlpResource::new(Arc::new(client));

        let state = resource.import("anything").unwrap();
        assert!(!state.enabled);
        assert_eq!(state.endpoint, None);
        assert_eq!(mock.last_request().unwrap().method, Method::Get);
    }
}
