//! `/v1/notification-channels` endpoints.

use crate::client::{Client, not_found};
use crate::error::{Error, Result};
use crate::transport::Method;
use crate::types::{
    CreateNotificationChannelRequest, NotificationChannel, UpdateNotificationChannelRequest,
};

const CHANNELS_PATH: &str = "/v1/notification-channels";

fn channel_path(id: &str) -> String {
    format!("{CHANNELS_PATH}/{id}")
}

impl Client {
    pub fn list_notification_channels(&self) -> Result<Vec<NotificationChannel>> {
        self.call(Method::Get, CHANNELS_PATH, None::<&()>)
    }

    pub fn get_notification_channel(&self, id: &str) -> Result<NotificationChannel> {
        self.call(Method::Get, &channel_path(id), None::<&()>)
            .map_err(not_found("notification channel", id))
    }

    pub fn get_notification_channel_by_name(&self, name: &str) -> Result<NotificationChannel> {
        self.list_notification_channels()?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::NotFound {
                kind: "notification channel",
                id: name.to_string(),
            })
    }

    pub fn create_notification_channel(
        &self,
        request: &CreateNotificationChannelRequest,
    ) -> Result<NotificationChannel> {
        self.call(Method::Post, CHANNELS_PATH, Some(request))
    }

    pub fn update_notification_channel(
        &self,
        id: &str,
        request: &UpdateNotificationChannelRequest,
    ) -> Result<NotificationChannel> {
        self.call(Method::Put, &channel_path(id), Some(request))
            .map_err(not_found("notification channel", id))
    }

    pub fn delete_notification_channel(&self, id: &str) -> Result<()> {
        self.do_request(Method::Delete, &channel_path(id), None::<&()>)
            .map(|_| ())
            .map_err(not_found("notification channel", id))
    }
}
