//! `quismon_notification_channel` - where alerts are delivered

use super::{json_map, reconcile_config, remote_error};
use declarative::{Attribute, Error, Resource, Result, Schema, UseStateForUnknown, Validator};
use log::debug;
use quismon::{
    Client, CreateNotificationChannelRequest, NotificationChannel, UpdateNotificationChannelRequest,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const TYPE_NAME: &str = "quismon_notification_channel";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationChannelModel {
    pub id: Option<String>,
    pub org_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub config: BTreeMap<String, String>,
    pub enabled: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl NotificationChannelModel {
    fn id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::configuration("id", "notification channel ID is missing from state"))
    }

    fn set_computed(&mut self, channel: &NotificationChannel) {
        self.id = Some(channel.id.clone());
        self.org_id = Some(channel.org_id.clone());
        self.enabled = Some(channel.enabled);
        self.created_at = Some(channel.created_at.clone());
        self.updated_at = Some(channel.updated_at.clone());
    }
}

pub struct NotificationChannelResource {
    client: Arc<Client>,
}

impl NotificationChannelResource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl Resource for NotificationChannelResource {
    type Model = NotificationChannelModel;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Manages a Quismon notification channel.")
            .attribute(Attribute::string("id").computed().modifier(UseStateForUnknown))
            .attribute(Attribute::string("org_id").computed().modifier(UseStateForUnknown))
            .attribute(Attribute::string("name").required())
            .attribute(
                Attribute::string("type")
                    .required()
                    .describe("Delivery mechanism")
                    .validate(Validator::OneOf(quismon::ChannelType::names())),
            )
            .attribute(
                Attribute::string_map("config")
                    .required()
                    .describe("Channel settings; secrets are never read back"),
            )
            .attribute(Attribute::bool("enabled").optional().computed())
            .attribute(Attribute::string("created_at").computed().modifier(UseStateForUnknown))
            .attribute(Attribute::string("updated_at").computed())
    }

    fn create(&self, mut planned: NotificationChannelModel) -> Result<NotificationChannelModel> {
        debug!("creating {} channel {:?}", planned.channel_type, planned.name);
        let request = CreateNotificationChannelRequest {
            name: planned.name.clone(),
            channel_type: planned.channel_type.clone(),
            config: json_map(&planned.config),
            enabled: planned.enabled.unwrap_or(false),
        };
        let channel = self
            .client
            .create_notification_channel(&request)
            .map_err(|err| remote_error("Error creating notification channel", TYPE_NAME, err))?;

        planned.set_computed(&channel);
        Ok(planned)
    }

    fn read(&self, current: NotificationChannelModel) -> Result<NotificationChannelModel> {
        let channel = self
            .client
            .get_notification_channel(current.id()?)
            .map_err(|err| remote_error("Error reading notification channel", TYPE_NAME, err))?;

        let mut model = current;
        model.name = channel.name.clone();
        model.channel_type = channel.channel_type.clone();
        model.config = reconcile_config(&model.config, &channel.config);
        model.set_computed(&channel);
        Ok(model)
    }

    /// Full replacement of name, config and enabled.
    fn update(
        &self,
        mut planned: NotificationChannelModel,
        prior: &NotificationChannelModel,
    ) -> Result<NotificationChannelModel> {
        let id = prior.id()?.to_string();
        let request = UpdateNotificationChannelRequest {
            name: Some(planned.name.clone()),
            config: Some(json_map(&planned.config)),
            enabled: Some(planned.enabled.unwrap_or(false)),
        };
        let channel = self
            .client
            .update_notification_channel(&id, &request)
            .map_err(|err| remote_error("Error updating notification channel", TYPE_NAME, err))?;

        planned.set_computed(&channel);
        Ok(planned)
    }

    fn delete(&self, current: &NotificationChannelModel) -> Result<()> {
        self.client
            .delete_notification_channel(current.id()?)
            .map_err(|err| remote_error("Error deleting notification channel", TYPE_NAME, err))
    }

    fn import(&self, id: &str) -> Result<NotificationChannelModel> {
        Ok(NotificationChannelModel {
            id: Some(id.to_string()),
            ..NotificationChannelModel::default()
        })
    }
}
