pub mod fcm;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::NotificationPayload;

pub use fcm::FcmGateway;
pub use mock::MockPushGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Authentication error: {0}")]
    Authentication(String),
}

impl GatewayError {
    /// The underlying error text, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Configuration(msg)
            | GatewayError::Connection(msg)
            | GatewayError::SendFailed(msg)
            | GatewayError::Authentication(msg) => msg,
        }
    }
}

/// A push service able to fan a message out to every subscriber of a topic.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Submit the payload once and return the gateway's message identifier.
    async fn send_to_topic(&self, payload: &NotificationPayload) -> Result<String, GatewayError>;
    async fn health_check(&self) -> Result<(), GatewayError>;
}
