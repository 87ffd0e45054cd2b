use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;
use update_notifier::config::{AuthConfig, DispatchConfig, FcmConfig, UpdateNotifierConfig};
use update_notifier::services::MockPushGateway;
use update_notifier::startup::{Application, DISPATCH_ROUTE};

pub const TEST_API_KEY: &str = "test-update-key";

pub struct TestApp {
    pub http_address: String,
    pub gateway: Arc<MockPushGateway>,
}

pub fn test_config(api_key: Option<&str>) -> UpdateNotifierConfig {
    UpdateNotifierConfig {
        common: CoreConfig { port: 0 },
        auth: AuthConfig {
            api_key: api_key.map(|k| Secret::new(k.to_string())),
        },
        fcm: FcmConfig {
            project_id: "test-project".to_string(),
            service_account_key: Secret::new("test-key".to_string()),
            api_url: "http://127.0.0.1:9/v1/projects".to_string(),
            timeout: Duration::from_secs(1),
            enabled: false, // Use mock
        },
        dispatch: DispatchConfig::default(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Some(TEST_API_KEY), MockPushGateway::new()).await
    }

    pub async fn spawn_with(api_key: Option<&str>, gateway: MockPushGateway) -> Self {
        let gateway = Arc::new(gateway);

        let app = Application::build_with_gateway(test_config(api_key), gateway.clone())
            .await
            .expect("Failed to build test application");

        let http_address = format!("http://127.0.0.1:{}", app.http_port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            http_address,
            gateway,
        }
    }

    pub fn dispatch_url(&self) -> String {
        format!("{}{}", self.http_address, DISPATCH_ROUTE)
    }
}
