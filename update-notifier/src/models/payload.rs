use std::collections::BTreeMap;

/// Topic every app install subscribes to.
pub const BROADCAST_TOPIC: &str = "all";
pub const UPDATE_TITLE: &str = "Update Available";
pub const UPDATE_TYPE: &str = "update";
/// Tag the Flutter client uses to route a notification tap.
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
pub const UPDATE_CHANNEL_ID: &str = "update_channel";
pub const NOTIFICATION_ICON: &str = "ic_notification";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPriority {
    Normal,
    High,
}

/// Android delivery hints attached to a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidDelivery {
    pub priority: DeliveryPriority,
    pub channel_id: String,
    pub vibrate: bool,
    pub icon: String,
}

impl AndroidDelivery {
    /// High priority on the update channel, vibrating, with the app icon.
    pub fn update_channel() -> Self {
        Self {
            priority: DeliveryPriority::High,
            channel_id: UPDATE_CHANNEL_ID.to_string(),
            vibrate: true,
            icon: NOTIFICATION_ICON.to_string(),
        }
    }
}

/// A topic broadcast ready to hand to a push gateway.
///
/// Data values are always strings; push data maps carry no other type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
    pub topic: String,
    pub android: Option<AndroidDelivery>,
}

impl NotificationPayload {
    pub fn broadcast(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
            topic: BROADCAST_TOPIC.to_string(),
            android: None,
        }
    }

    pub fn with_data(mut self, key: &str, value: impl ToString) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_android(mut self, android: AndroidDelivery) -> Self {
        self.android = Some(android);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_targets_all_topic() {
        let payload = NotificationPayload::broadcast("t", "b");
        assert_eq!(payload.topic, "all");
        assert!(payload.data.is_empty());
        assert!(payload.android.is_none());
    }

    #[test]
    fn data_values_are_stringified() {
        let payload = NotificationPayload::broadcast("t", "b")
            .with_data("forceUpdate", false)
            .with_data("versionCode", 42);
        assert_eq!(payload.data["forceUpdate"], "false");
        assert_eq!(payload.data["versionCode"], "42");
    }
}
