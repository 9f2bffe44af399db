//! `quismon_check` - a monitoring check

use super::plan_modifier::CarryForwardExpiry;
use super::{json_map, reconcile_config, remote_error};
use declarative::{
    Attribute, Diagnostic, Diagnostics, Error, Resource, Result, Schema, UseStateForUnknown, Validator,
};
use log::{debug, warn};
use quismon::regions::{DEFAULT_REGION, is_deprecated};
use quismon::{Check, CheckConfig, CheckType, Client, CreateCheckRequest, UpdateCheckRequest, validate_region};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const TYPE_NAME: &str = "quismon_check";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckModel {
    pub id: Option<String>,
    pub org_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub check_type: String,
    pub config: Option<BTreeMap<String, String>>,
    pub config_json: Option<String>,
    pub interval_seconds: i64,
    pub regions: Option<Vec<String>>,
    pub enabled: Option<bool>,
    pub simultaneous_regions: Option<bool>,
    pub recheck_on_failure: Option<bool>,
    pub inverted: Option<bool>,
    pub expires_after_seconds: Option<i64>,
    pub health_status: Option<String>,
    pub last_checked: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub config_hash: Option<String>,
}

impl CheckModel {
    fn id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::configuration("id", "check ID is missing from state"))
    }

    /// Fill the fields the API owns.
    fn set_computed(&mut self, check: &Check) {
        self.id = Some(check.id.clone());
        self.org_id = Some(check.org_id.clone());
        self.expires_after_seconds = check.expires_after_seconds;
        self.health_status = Some(check.health_status.clone());
        self.last_checked = check.last_checked.clone();
        self.created_at = Some(check.created_at.clone());
        self.updated_at = Some(check.updated_at.clone());
        self.config_hash = Some(check.config_hash.clone());
        self.regions.get_or_insert_with(|| check.regions.clone());
        self.enabled.get_or_insert(check.enabled);
        self.simultaneous_regions.get_or_insert(check.simultaneous_regions);
        self.recheck_on_failure.get_or_insert(check.recheck_on_failure);
        self.inverted.get_or_insert(check.inverted);
    }
}

/// Resolve the configuration source: a non-empty `config_json` wins over
/// the `config` map.
fn resolve_config(model: &CheckModel) -> Result<Map<String, Value>> {
    if let Some(raw) = model.config_json.as_deref().filter(|s| !s.trim().is_empty()) {
        return match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::configuration(
                "config_json",
                format!("expected a JSON object, got {other}"),
            )),
            Err(err) => Err(Error::configuration("config_json", format!("invalid JSON: {err}"))),
        };
    }
    match &model.config {
        Some(config) if !config.is_empty() => Ok(json_map(config)),
        _ => Err(Error::configuration(
            "config",
            "one of config or config_json must be set",
        )),
    }
}

/// Resolve and classify the configuration before anything is sent.
fn wire_config(model: &CheckModel) -> Result<CheckConfig> {
    let check_type: CheckType = model
        .check_type
        .parse()
        .map_err(|message: String| Error::configuration("type", message))?;
    let fields = resolve_config(model)?;
    CheckConfig::classify(check_type, fields).map_err(|err| remote_error("Invalid check configuration", TYPE_NAME, err))
}

pub struct CheckResource {
    client: Arc<Client>,
}

impl CheckResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl Resource for CheckResource {
    type Model = CheckModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Manages a Quismon monitoring check.")
            .attribute(
                Attribute::string("id")
                    .computed()
                    .describe("Check identifier")
                    .modifier(UseStateForUnknown),
            )
            .attribute(Attribute::string("org_id").computed().modifier(UseStateForUnknown))
            .attribute(Attribute::string("name").required().describe("Display name"))
            .attribute(
                Attribute::string("type")
                    .required()
                    .describe("Check type")
                    .validate(Validator::OneOf(CheckType::names())),
            )
            .attribute(
                Attribute::string_map("config")
                    .optional()
                    .describe("Type-specific configuration as a flat string map"),
            )
            .attribute(
                Attribute::string("config_json")
                    .optional()
                    .describe("Type-specific configuration as JSON; takes precedence over config"),
            )
            .attribute(
                Attribute::int("interval_seconds")
                    .required()
                    .describe("Seconds between runs")
                    .validate(Validator::AtLeast(60)),
            )
            .attribute(
                Attribute::string_list("regions")
                    .default(json!([DEFAULT_REGION]))
                    .describe("Region codes to run from"),
            )
            .attribute(Attribute::bool("enabled").default(json!(true)))
            .attribute(
                Attribute::bool("simultaneous_regions")
                    .default(json!(false))
                    .describe("Run all regions at the same time"),
            )
            .attribute(
                Attribute::bool("recheck_on_failure")
                    .default(json!(false))
                    .describe("Confirm failures from another region"),
            )
            .attribute(
                Attribute::bool("inverted")
                    .default(json!(false))
                    .describe("Treat success as failure"),
            )
            .attribute(
                Attribute::int("expires_after_seconds")
                    .optional()
                    .computed()
                    .describe("Delete the check after this many seconds")
                    .modifier(CarryForwardExpiry),
            )
            .attribute(Attribute::string("health_status").computed())
            .attribute(Attribute::string("last_checked").computed())
            .attribute(Attribute::string("created_at").computed().modifier(UseStateForUnknown))
            .attribute(Attribute::string("updated_at").computed())
            .attribute(Attribute::string("config_hash").computed())
    }

    fn validate(&self, config: &CheckModel) -> Diagnostics {
        let mut diags = Diagnostics::new();

        for region in config.regions.iter().flatten() {
            if let Err(err) = validate_region(region) {
                diags.push(Diagnostic::error("Invalid region", err.to_string()).with_attribute("regions"));
            } else if is_deprecated(region) {
                diags.push(
                    Diagnostic::warning(
                        "Deprecated region",
                        format!("{region:?} is a legacy region code and may be removed."),
                    )
                    .with_attribute("regions"),
                );
            }
        }

        if let Err(err) = wire_config(config) {
            diags.extend(err.into_diagnostics());
        }
        diags
    }

    fn create(&self, mut planned: CheckModel) -> Result<CheckModel> {
        let config = wire_config(&planned)?;
        debug!("creating check {:?} ({})", planned.name, config.target());

        let request = CreateCheckRequest {
            name: planned.name.clone(),
            check_type: planned.check_type.clone(),
            config: config.into_map(),
            interval_seconds: planned.interval_seconds,
            regions: planned
                .regions
                .clone()
                .unwrap_or_else(|| vec![DEFAULT_REGION.to_string()]),
            enabled: planned.enabled.unwrap_or(true),
            inverted: planned.inverted,
            simultaneous_regions: planned.simultaneous_regions,
            recheck_on_failure: planned.recheck_on_failure,
            expires_after_seconds: planned.expires_after_seconds.filter(|n| *n > 0),
        };
        let check = self
            .client
            .create_check(&request)
            .map_err(|err| remote_error("Error creating check", TYPE_NAME, err))?;

        planned.set_computed(&check);
        Ok(planned)
    }

    fn read(&self, current: CheckModel) -> Result<CheckModel> {
        let check = self
            .client
            .get_check(current.id()?)
            .map_err(|err| remote_error("Error reading check", TYPE_NAME, err))?;

        if let Some(recorded) = current.config_hash.as_deref()
            && !recorded.is_empty()
            && !check.config_hash.is_empty()
            && recorded != check.config_hash
        {
            warn!(
                "check {:?}: configuration changed outside of quismon-iac (sensitive fields may differ)",
                check.name
            );
        }

        let mut model = current;
        model.name = check.name.clone();
        model.check_type = check.check_type.clone();
        model.interval_seconds = check.interval_seconds;
        model.regions = Some(check.regions.clone());
        model.enabled = Some(check.enabled);
        model.simultaneous_regions = Some(check.simultaneous_regions);
        model.recheck_on_failure = Some(check.recheck_on_failure);
        model.inverted = Some(check.inverted);
        // config_json is never rewritten from the API
        if let Some(config) = &model.config {
            model.config = Some(reconcile_config(config, &check.config));
        }
        model.set_computed(&check);
        Ok(model)
    }

    /// Full replacement: every mutable field is sent.
    fn update(&self, mut planned: CheckModel, prior: &CheckModel) -> Result<CheckModel> {
        let id = prior.id()?.to_string();
        let config = wire_config(&planned)?;
        debug!("updating check {id} ({})", config.target());

        let request = UpdateCheckRequest {
            name: Some(planned.name.clone()),
            config: Some(config.into_map()),
            interval_seconds: Some(planned.interval_seconds),
            regions: planned.regions.clone(),
            enabled: planned.enabled,
            inverted: planned.inverted,
            simultaneous_regions: planned.simultaneous_regions,
            recheck_on_failure: planned.recheck_on_failure,
            expires_after_seconds: planned.expires_after_seconds.filter(|n| *n > 0),
        };
        let check = self
            .client
            .update_check(&id, &request)
            .map_err(|err| remote_error("Error updating check", TYPE_NAME, err))?;

        planned.set_computed(&check);
        Ok(planned)
    }

    fn delete(&self, current: &CheckModel) -> Result<()> {
        self.client
            .delete_check(current.id()?)
            .map_err(|err| remote_error("Error deleting check", TYPE_NAME, err))
    }

    fn import(&self, id: &str) -> Result<CheckModel> {
        Ok(CheckModel {
            id: Some(id.to_string()),
            ..CheckModel::default()
        })
    }
}
