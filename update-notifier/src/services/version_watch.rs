//! Broadcast driven by a change to the stored Android update config.
//!
//! Where the HTTP endpoint announces whatever it is told, this path compares
//! the stored config before and after a write and only announces releases
//! whose version code went up.

use serde::Deserialize;

use super::gateway::{GatewayError, PushGateway};
use crate::models::payload::{UPDATE_TITLE, UPDATE_TYPE};
use crate::models::NotificationPayload;

/// Stored `app_config/android_update` document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AndroidUpdateConfig {
    pub latest_version_code: i64,
    pub latest_version_name: String,
    #[serde(default)]
    pub update_message: Option<String>,
}

impl AndroidUpdateConfig {
    pub fn to_payload(&self) -> NotificationPayload {
        let body = match self.update_message.as_deref() {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => format!("Version {} is now available.", self.latest_version_name),
        };

        NotificationPayload::broadcast(UPDATE_TITLE, body)
            .with_data("type", UPDATE_TYPE)
            .with_data("versionCode", self.latest_version_code)
            .with_data("versionName", &self.latest_version_name)
    }
}

/// Announce `after` if its version code is strictly greater than `before`'s.
///
/// Returns the gateway message id, or `None` when nothing was sent.
pub async fn on_update_config_changed(
    before: &AndroidUpdateConfig,
    after: &AndroidUpdateConfig,
    gateway: &dyn PushGateway,
) -> Result<Option<String>, GatewayError> {
    if after.latest_version_code <= before.latest_version_code {
        tracing::info!(
            previous = before.latest_version_code,
            current = after.latest_version_code,
            "Version code not increased, skipping notification"
        );
        return Ok(None);
    }

    match gateway.send_to_topic(&after.to_payload()).await {
        Ok(message_id) => {
            tracing::info!(
                message_id = %message_id,
                version_name = %after.latest_version_name,
                "Auto notification sent for version"
            );
            Ok(Some(message_id))
        }
        Err(e) => {
            tracing::error!(error = %e, "Error sending auto notification");
            Err(e)
        }
    }
}
