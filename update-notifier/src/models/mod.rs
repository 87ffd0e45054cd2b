pub mod payload;
pub mod update;

pub use payload::{AndroidDelivery, DeliveryPriority, NotificationPayload, BROADCAST_TOPIC};
pub use update::{DispatchReceipt, UpdateNotificationRequest, ValidatedUpdate, VersionCode};
