//! `quismon_alert_rule` - alerting conditions attached to a check

use super::{json_map, remote_error, string_map};
use declarative::{Attribute, Error, RequiresReplace, Resource, Result, Schema, UseStateForUnknown};
use log::debug;
use quismon::{AlertRule, Client, CreateAlertRuleRequest, UpdateAlertRuleRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const TYPE_NAME: &str = "quismon_alert_rule";

const IMPORT_FORMAT: &str = "check_id:alert_rule_id";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertRuleModel {
    pub id: Option<String>,
    pub check_id: String,
    pub name: String,
    pub condition: BTreeMap<String, String>,
    pub notification_channel_ids: Vec<String>,
    pub enabled: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl AlertRuleModel {
    fn ids(&self) -> Result<(&str, &str)> {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() && !self.check_id.is_empty() => Ok((&self.check_id, id)),
            _ => Err(Error::configuration("id", "alert rule ID is missing from state")),
        }
    }

    fn set_computed(&mut self, rule: &AlertRule) {
        self.id = Some(rule.id.clone());
        self.enabled = Some(rule.enabled);
        self.created_at = Some(rule.created_at.clone());
        self.updated_at = Some(rule.updated_at.clone());
    }
}

/// Fields of `planned` that differ from `prior`.
fn patch(planned: &AlertRuleModel, prior: &AlertRuleModel) -> UpdateAlertRuleRequest {
    UpdateAlertRuleRequest {
        name: (planned.name != prior.name).then(|| planned.name.clone()),
        condition: (planned.condition != prior.condition).then(|| json_map(&planned.condition)),
        notification_channel_ids: (planned.notification_channel_ids != prior.notification_channel_ids)
            .then(|| planned.notification_channel_ids.clone()),
        enabled: planned.enabled.filter(|enabled| prior.enabled != Some(*enabled)),
    }
}

pub struct AlertRuleResource {
    client: Arc<Client>,
}

impl AlertRuleResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl Resource for AlertRuleResource {
    type Model = AlertRuleModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Manages an alert rule on a Quismon check.")
            .attribute(Attribute::string("id").computed().modifier(UseStateForUnknown))
            .attribute(
                Attribute::string("check_id")
                    .required()
                    .describe("Check this rule belongs to; changing it recreates the rule")
                    .modifier(RequiresReplace),
            )
            .attribute(Attribute::string("name").required())
            .attribute(
                Attribute::string_map("condition")
                    .required()
                    .describe("Trigger condition, e.g. consecutive_failures = \"3\""),
            )
            .attribute(
                Attribute::string_list("notification_channel_ids")
                    .required()
                    .describe("Channels notified when the rule fires, in order"),
            )
            .attribute(Attribute::bool("enabled").optional().computed())
            .attribute(Attribute::string("created_at").computed().modifier(UseStateForUnknown))
            .attribute(Attribute::string("updated_at").computed())
    }

    fn create(&self, mut planned: AlertRuleModel) -> Result<AlertRuleModel> {
        debug!("creating alert rule {:?} on check {}", planned.name, planned.check_id);
        let request = CreateAlertRuleRequest {
            name: planned.name.clone(),
            condition: json_map(&planned.condition),
            notification_channel_ids: planned.notification_channel_ids.clone(),
            enabled: planned.enabled.unwrap_or(false),
        };
        let rule = self
            .client
            .create_alert_rule(&planned.check_id, &request)
            .map_err(|err| remote_error("Error creating alert rule", TYPE_NAME, err))?;

        planned.set_computed(&rule);
        Ok(planned)
    }

    fn read(&self, current: AlertRuleModel) -> Result<AlertRuleModel> {
        let (check_id, id) = current.ids()?;
        let rule = self
            .client
            .get_alert_rule(check_id, id)
            .map_err(|err| remote_error("Error reading alert rule", TYPE_NAME, err))?;

        let mut model = current;
        model.name = rule.name.clone();
        model.condition = string_map(&rule.condition);
        model.notification_channel_ids = rule.notification_channel_ids.clone();
        model.set_computed(&rule);
        Ok(model)
    }

    /// Sparse patch: only fields that changed since the last apply are sent.
    fn update(&self, mut planned: AlertRuleModel, prior: &AlertRuleModel) -> Result<AlertRuleModel> {
        let (check_id, id) = prior.ids()?;
        let request = patch(&planned, prior);
        if request.is_empty() {
            debug!("alert rule {id}: nothing to send");
            planned.id = prior.id.clone();
            planned.enabled = planned.enabled.or(prior.enabled);
            planned.created_at = prior.created_at.clone();
            planned.updated_at = prior.updated_at.clone();
            return Ok(planned);
        }

        let rule = self
            .client
            .update_alert_rule(check_id, id, &request)
            .map_err(|err| remote_error("Error updating alert rule", TYPE_NAME, err))?;

        planned.set_computed(&rule);
        Ok(planned)
    }

    fn delete(&self, current: &AlertRuleModel) -> Result<()> {
        let (check_id, id) = current.ids()?;
        self.client
            .delete_alert_rule(check_id, id)
            .map_err(|err| remote_error("Error deleting alert rule", TYPE_NAME, err))
    }

    fn import(&self, id: &str) -> Result<AlertRuleModel> {
        let parts: Vec<&str> = id.split(':').collect();
        match parts.as_slice() {
            [check_id, rule_id] if !check_id.is_empty() && !rule_id.is_empty() => Ok(AlertRuleModel {
                id: Some((*rule_id).to_string()),
                check_id: (*check_id).to_string(),
                ..AlertRuleModel::default()
            }),
            _ => Err(Error::InvalidImportId {
                id: id.to_string(),
                expected: IMPORT_FORMAT.to_string(),
            }),
        }
    }
}
