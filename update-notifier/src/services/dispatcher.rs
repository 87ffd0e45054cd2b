use secrecy::{ExposeSecret, Secret};
use service_core::utils::secrets_match;
use std::sync::Arc;

use super::gateway::PushGateway;
use crate::config::{AuthConfig, DispatchConfig};
use crate::error::DispatchError;
use crate::models::{DispatchReceipt, ValidatedUpdate};

const GENERIC_GATEWAY_ERROR: &str = "Failed to send notification";

/// Authenticates callers and hands validated updates to the push gateway.
///
/// Holds no per-request state; one instance serves every request.
pub struct UpdateDispatcher {
    api_key: Option<Secret<String>>,
    settings: DispatchConfig,
    gateway: Arc<dyn PushGateway>,
}

impl UpdateDispatcher {
    pub fn new(auth: &AuthConfig, settings: DispatchConfig, gateway: Arc<dyn PushGateway>) -> Self {
        Self {
            api_key: auth.api_key.clone(),
            settings,
            gateway,
        }
    }

    pub fn gateway(&self) -> &Arc<dyn PushGateway> {
        &self.gateway
    }

    /// Check the presented secret. A server without a configured secret
    /// rejects everyone, exactly like a wrong key.
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), DispatchError> {
        let authorized = match (&self.api_key, presented) {
            (Some(expected), Some(presented)) => {
                secrets_match(expected.expose_secret(), presented)
            }
            _ => false,
        };

        if !authorized {
            tracing::warn!("Unauthorized attempt to send update notification");
            return Err(DispatchError::Unauthorized);
        }

        Ok(())
    }

    /// Broadcast the update once. Gateway failures are not retried.
    pub async fn dispatch(&self, update: ValidatedUpdate) -> Result<DispatchReceipt, DispatchError> {
        let payload = update.to_payload();

        match self.gateway.send_to_topic(&payload).await {
            Ok(message_id) => {
                tracing::info!(
                    message_id = %message_id,
                    version_name = %update.version_name,
                    version_code = %update.version_code,
                    "Update notification sent successfully"
                );
                Ok(DispatchReceipt::sent(message_id, update))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    version_name = %update.version_name,
                    version_code = %update.version_code,
                    "Error sending update notification"
                );

                let message = if self.settings.expose_gateway_errors {
                    e.message().to_string()
                } else {
                    GENERIC_GATEWAY_ERROR.to_string()
                };
                Err(DispatchError::GatewayFailure { message })
            }
        }
    }
}
