//! Application startup and lifecycle management.
//!
//! One HTTP server carries the dispatch endpoint plus health, readiness and
//! metrics routes.

use axum::{
    http::{header, HeaderValue},
    middleware::from_fn,
    routing::{any, get},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::UpdateNotifierConfig;
use crate::handlers::{health_check, metrics_endpoint, readiness_check, send_update_notification};
use crate::services::{FcmGateway, MockPushGateway, PushGateway, UpdateDispatcher};

pub const DISPATCH_ROUTE: &str = "/sendUpdateNotification";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<UpdateDispatcher>,
}

impl AppState {
    pub fn new(config: &UpdateNotifierConfig, gateway: Arc<dyn PushGateway>) -> Self {
        Self {
            dispatcher: Arc::new(UpdateDispatcher::new(
                &config.auth,
                config.dispatch.clone(),
                gateway,
            )),
        }
    }
}

/// Pick the push gateway the configuration asks for.
pub fn build_gateway(config: &UpdateNotifierConfig) -> Result<Arc<dyn PushGateway>, AppError> {
    if config.fcm.enabled {
        let gateway = FcmGateway::new(config.fcm.clone()).map_err(|e| {
            tracing::error!("Failed to initialize FCM gateway: {}", e);
            AppError::ConfigError(anyhow::anyhow!(e.to_string()))
        })?;
        tracing::info!(project_id = %config.fcm.project_id, "FCM push gateway initialized");
        Ok(Arc::new(gateway))
    } else {
        tracing::info!("FCM gateway disabled, using mock push gateway");
        Ok(Arc::new(MockPushGateway::new()))
    }
}

pub fn build_router(state: AppState) -> Router {
    let dispatch = any(send_update_notification).layer(SetResponseHeaderLayer::overriding(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    ));

    Router::new()
        .route(DISPATCH_ROUTE, dispatch)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_endpoint))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the span above sees the request id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the gateway the configuration selects.
    pub async fn build(config: UpdateNotifierConfig) -> Result<Self, AppError> {
        let gateway = build_gateway(&config)?;
        Self::build_with_gateway(config, gateway).await
    }

    /// Build the application around an explicit gateway.
    pub async fn build_with_gateway(
        config: UpdateNotifierConfig,
        gateway: Arc<dyn PushGateway>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(&config, gateway);

        // Port 0 picks a random port, used by tests.
        let http_addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let http_listener = TcpListener::bind(http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!("Update notifier: HTTP on port {}", http_port);

        Ok(Self {
            http_port,
            http_listener,
            state,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Run the application until the shutdown future resolves.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state);

        axum::serve(self.http_listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }
}
