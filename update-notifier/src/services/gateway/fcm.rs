use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::collections::BTreeMap;

use super::{GatewayError, PushGateway};
use crate::config::FcmConfig;
use crate::models::{AndroidDelivery, DeliveryPriority, NotificationPayload};

/// Firebase Cloud Messaging HTTP v1 topic sender.
pub struct FcmGateway {
    config: FcmConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    topic: &'a str,
    notification: FcmNotification<'a>,
    #[serde(skip_serializing_if = "no_data")]
    data: &'a BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<FcmAndroidConfig<'a>>,
}

fn no_data(data: &&BTreeMap<String, String>) -> bool {
    data.is_empty()
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmAndroidConfig<'a> {
    priority: &'static str,
    notification: FcmAndroidNotification<'a>,
}

#[derive(Debug, Serialize)]
struct FcmAndroidNotification<'a> {
    channel_id: &'a str,
    notification_priority: &'static str,
    default_vibrate_timings: bool,
    icon: &'a str,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    name: Option<String>,
    #[serde(default)]
    error: Option<FcmError>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct FcmError {
    code: i32,
    message: String,
    status: String,
}

impl<'a> From<&'a AndroidDelivery> for FcmAndroidConfig<'a> {
    fn from(android: &'a AndroidDelivery) -> Self {
        let (priority, notification_priority) = match android.priority {
            DeliveryPriority::High => ("HIGH", "PRIORITY_HIGH"),
            DeliveryPriority::Normal => ("NORMAL", "PRIORITY_DEFAULT"),
        };

        FcmAndroidConfig {
            priority,
            notification: FcmAndroidNotification {
                channel_id: &android.channel_id,
                notification_priority,
                default_vibrate_timings: android.vibrate,
                icon: &android.icon,
            },
        }
    }
}

impl<'a> From<&'a NotificationPayload> for FcmRequest<'a> {
    fn from(payload: &'a NotificationPayload) -> Self {
        FcmRequest {
            message: FcmMessage {
                topic: &payload.topic,
                notification: FcmNotification {
                    title: &payload.title,
                    body: &payload.body,
                },
                data: &payload.data,
                android: payload.android.as_ref().map(FcmAndroidConfig::from),
            },
        }
    }
}

impl FcmGateway {
    pub fn new(config: FcmConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/{}/messages:send",
            self.config.api_url.trim_end_matches('/'),
            self.config.project_id
        )
    }

    fn access_token(&self) -> Result<&str, GatewayError> {
        let token = self.config.service_account_key.expose_secret();
        if token.is_empty() {
            return Err(GatewayError::Authentication(
                "FCM service account key not configured".to_string(),
            ));
        }
        Ok(token)
    }
}

#[async_trait]
impl PushGateway for FcmGateway {
    async fn send_to_topic(&self, payload: &NotificationPayload) -> Result<String, GatewayError> {
        if self.config.project_id.is_empty() {
            return Err(GatewayError::Configuration(
                "FCM project_id is not configured".to_string(),
            ));
        }

        let access_token = self.access_token()?;
        let request = FcmRequest::from(payload);

        let response = self
            .client
            .traced_post(&self.send_url())
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(format!("Failed to connect to FCM: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::SendFailed(format!(
                "FCM API returned error status {}: {}",
                status, body
            )));
        }

        let fcm_response: FcmResponse = response.json().await.map_err(|e| {
            GatewayError::SendFailed(format!("Failed to parse FCM response: {}", e))
        })?;

        if let Some(error) = fcm_response.error {
            return Err(GatewayError::SendFailed(format!(
                "FCM error ({}): {}",
                error.status, error.message
            )));
        }

        let message_id = fcm_response.name.ok_or_else(|| {
            GatewayError::SendFailed("FCM response did not include a message name".to_string())
        })?;

        tracing::debug!(topic = %payload.topic, message_id = %message_id, "FCM accepted topic message");

        Ok(message_id)
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        if self.config.project_id.is_empty() {
            return Err(GatewayError::Configuration(
                "FCM project_id is not configured".to_string(),
            ));
        }

        self.access_token().map(|_| ())
    }
}
