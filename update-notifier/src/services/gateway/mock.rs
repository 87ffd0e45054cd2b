use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::{GatewayError, PushGateway};
use crate::models::NotificationPayload;

/// In-process gateway used when FCM is disabled and in tests.
///
/// Every payload it receives is kept so callers can inspect what would have
/// been broadcast.
pub struct MockPushGateway {
    failure: Option<String>,
    send_count: AtomicU64,
    sent: Mutex<Vec<NotificationPayload>>,
}

impl Default for MockPushGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPushGateway {
    pub fn new() -> Self {
        Self {
            failure: None,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// A gateway whose every send fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Number of send attempts, failed ones included.
    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PushGateway for MockPushGateway {
    async fn send_to_topic(&self, payload: &NotificationPayload) -> Result<String, GatewayError> {
        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(message) = &self.failure {
            return Err(GatewayError::SendFailed(message.clone()));
        }

        if let Ok(mut sent) = self.sent.lock() {
            sent.push(payload.clone());
        }

        tracing::info!(
            topic = %payload.topic,
            title = %payload.title,
            "[MOCK] Topic notification would be sent"
        );

        Ok(format!("mock-push-{}", count))
    }

    async fn health_check(&self) -> Result<(), GatewayError> {
        Ok(())
    }
}
