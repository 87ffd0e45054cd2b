pub mod dispatcher;
pub mod gateway;
pub mod metrics;
pub mod version_watch;

pub use dispatcher::UpdateDispatcher;
pub use gateway::{FcmGateway, GatewayError, MockPushGateway, PushGateway};
pub use metrics::{get_metrics, init_metrics, record_dispatch};
pub use version_watch::{on_update_config_changed, AndroidUpdateConfig};
