//! HTTP handlers for update-notifier.

pub mod health;
pub mod update;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use update::send_update_notification;
