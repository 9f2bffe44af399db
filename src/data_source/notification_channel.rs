//! `data.quismon_notification_channel` - look up a channel by name

use crate::resource::remote_error;
use declarative::{Attribute, DataSource, Result, Schema, Validator};
use quismon::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const TYPE_NAME: &str = "quismon_notification_channel";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelLookup {
    pub name: String,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub channel_type: Option<String>,
    pub enabled: Option<bool>,
}

pub struct NotificationChannelDataSource {
    client: Arc<Client>,
}

impl NotificationChannelDataSource {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }
}

impl DataSource for NotificationChannelDataSource {
    type Model = ChannelLookup;

    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        Schema::new("Looks up an existing notification channel by exact name.")
            .attribute(Attribute::string("name").required().validate(Validator::MinLength(1)))
            .attribute(Attribute::string("id").computed())
            .attribute(Attribute::string("type").computed())
            .attribute(Attribute::bool("enabled").computed())
    }

    fn read(&self, config: ChannelLookup) -> Result<ChannelLookup> {
        let channel = self
            .client
            .get_notification_channel_by_name(&config.name)
            .map_err(|err| remote_error("Error reading notification channel", TYPE_NAME, err))?;

        Ok(ChannelLookup {
            name: channel.name,
            id: Some(channel.id),
            channel_type: Some(channel.channel_type),
            enabled: Some(channel.enabled),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::client;

    #[test]
    fn test_lookup_by_name() {
        let (client, mock) = client();
        mock.push_json(
            200,
            r#"{"data": [
                {"id": "n1", "name": "ops", "type": "slack", "enabled": true},
                {"id": "n2", "name": "oncall", "type": "pagerduty", "enabled": false}
            ]}"#,
        );
        let source = NotificationChannelDataSource::new(Arc::new(client));

        let found = source
            .read(ChannelLookup {
                name: "oncall".into(),
                ..ChannelLookup::default()
            })
            .unwrap();
        assert_eq!(found.id.as_deref(), Some("n2"));
        assert_eq!(found.channel_type.as_deref(), Some("pagerduty"));
        assert_eq!(found.enabled, Some(false));
        assert!(mock.last_request().unwrap().url.ends_with("/v1/notification-channels"));
    }
}
