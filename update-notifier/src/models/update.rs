use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use super::payload::{AndroidDelivery, NotificationPayload, CLICK_ACTION, UPDATE_TITLE, UPDATE_TYPE};
use crate::error::DispatchError;

/// Build number of a release. Callers send either a JSON number or a string,
/// and the original form is echoed back in the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionCode {
    Number(serde_json::Number),
    Text(String),
}

impl VersionCode {
    /// Zero and the empty string do not identify a build.
    pub fn is_blank(&self) -> bool {
        match self {
            VersionCode::Number(n) => n.as_f64() == Some(0.0),
            VersionCode::Text(s) => s.is_empty(),
        }
    }

    /// Collapse whole floats such as `42.0` or `4.2e1` to the integer `42`.
    pub fn normalized(self) -> Self {
        match self {
            VersionCode::Number(n) => match whole_number(&n) {
                Some(i) => VersionCode::Number(i.into()),
                None => VersionCode::Number(n),
            },
            text => text,
        }
    }
}

fn whole_number(n: &serde_json::Number) -> Option<i64> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for VersionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionCode::Number(n) => match whole_number(n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            VersionCode::Text(s) => write!(f, "{}", s),
        }
    }
}

fn validate_version_code(code: &VersionCode) -> Result<(), ValidationError> {
    if code.is_blank() {
        return Err(ValidationError::new("version_code_blank"));
    }
    Ok(())
}

/// Body of `POST /sendUpdateNotification`, as sent by the caller.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotificationRequest {
    #[validate(required, length(min = 1))]
    pub version_name: Option<String>,
    #[validate(required, custom(function = "validate_version_code"))]
    pub version_code: Option<VersionCode>,
    pub message: Option<String>,
    pub force_update: Option<bool>,
}

impl UpdateNotificationRequest {
    /// Parse a raw body. An empty body is an empty object.
    ///
    /// Only a JSON object carries fields; any other JSON value (array, string,
    /// number, null) names none of them.
    pub fn parse(body: &[u8]) -> Result<Self, DispatchError> {
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Self::default());
        }

        let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(error = %e, "Rejecting unparseable update request body");
            DispatchError::invalid_body()
        })?;

        if !value.is_object() {
            tracing::debug!("Rejecting update request body that is not a JSON object");
            return Err(DispatchError::missing_fields());
        }

        serde_json::from_value(value).map_err(|e| {
            tracing::debug!(error = %e, "Rejecting update request body with mistyped fields");
            DispatchError::invalid_body()
        })
    }

    /// Check required fields and apply defaults.
    pub fn into_validated(self) -> Result<ValidatedUpdate, DispatchError> {
        self.validate()
            .map_err(|_| DispatchError::missing_fields())?;

        match (self.version_name, self.version_code) {
            (Some(version_name), Some(version_code)) => Ok(ValidatedUpdate {
                version_name,
                version_code: version_code.normalized(),
                message: self.message.filter(|m| !m.is_empty()),
                force_update: self.force_update.unwrap_or(false),
            }),
            _ => Err(DispatchError::missing_fields()),
        }
    }
}

/// An update announcement that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUpdate {
    pub version_name: String,
    pub version_code: VersionCode,
    pub message: Option<String>,
    pub force_update: bool,
}

impl ValidatedUpdate {
    pub fn body(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!(
                "Version {} is now available. Tap to update.",
                self.version_name
            ),
        }
    }

    pub fn to_payload(&self) -> NotificationPayload {
        NotificationPayload::broadcast(UPDATE_TITLE, self.body())
            .with_data("type", UPDATE_TYPE)
            .with_data("versionCode", &self.version_code)
            .with_data("versionName", &self.version_name)
            .with_data("forceUpdate", self.force_update)
            .with_data("click_action", CLICK_ACTION)
            .with_android(AndroidDelivery::update_channel())
    }
}

/// Success body returned once the gateway accepted the broadcast.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReceipt {
    pub success: bool,
    pub message_id: String,
    pub version_name: String,
    pub version_code: VersionCode,
}

impl DispatchReceipt {
    pub fn sent(message_id: String, update: ValidatedUpdate) -> Self {
        Self {
            success: true,
            message_id,
            version_name: update.version_name,
            version_code: update.version_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::payload::{DeliveryPriority, BROADCAST_TOPIC};
    use serde_json::json;

    fn validated(body: serde_json::Value) -> Result<ValidatedUpdate, DispatchError> {
        UpdateNotificationRequest::parse(body.to_string().as_bytes())?.into_validated()
    }

    #[test]
    fn default_body_interpolates_version_name() {
        let update = validated(json!({ "versionName": "1.4.2", "versionCode": 42 })).unwrap();
        let payload = update.to_payload();

        assert_eq!(payload.title, "Update Available");
        assert_eq!(payload.body, "Version 1.4.2 is now available. Tap to update.");
        assert_eq!(payload.data["versionCode"], "42");
        assert_eq!(payload.data["versionName"], "1.4.2");
        assert_eq!(payload.data["forceUpdate"], "false");
        assert_eq!(payload.data["type"], "update");
        assert_eq!(payload.data["click_action"], "FLUTTER_NOTIFICATION_CLICK");
        assert_eq!(payload.topic, BROADCAST_TOPIC);
    }

    #[test]
    fn explicit_message_and_force_update() {
        let update = validated(json!({
            "versionName": "1.4.2",
            "versionCode": 42,
            "message": "Bug fixes",
            "forceUpdate": true
        }))
        .unwrap();
        let payload = update.to_payload();

        assert_eq!(payload.body, "Bug fixes");
        assert_eq!(payload.data["forceUpdate"], "true");
    }

    #[test]
    fn empty_message_falls_back_to_template() {
        let update = validated(json!({
            "versionName": "2.0.0",
            "versionCode": "200",
            "message": ""
        }))
        .unwrap();
        assert_eq!(update.body(), "Version 2.0.0 is now available. Tap to update.");
    }

    #[test]
    fn android_hints_use_update_channel() {
        let update = validated(json!({ "versionName": "1.0", "versionCode": 1 })).unwrap();
        let android = update.to_payload().android.unwrap();

        assert_eq!(android.priority, DeliveryPriority::High);
        assert_eq!(android.channel_id, "update_channel");
        assert!(android.vibrate);
        assert_eq!(android.icon, "ic_notification");
    }

    #[test]
    fn string_version_code_is_kept_as_text() {
        let update = validated(json!({ "versionName": "1.0", "versionCode": "b17" })).unwrap();
        assert_eq!(update.version_code, VersionCode::Text("b17".to_string()));
        assert_eq!(update.to_payload().data["versionCode"], "b17");
    }

    #[test]
    fn missing_fields_are_rejected() {
        for body in [
            json!({}),
            json!({ "versionName": "1.4.2" }),
            json!({ "versionCode": 42 }),
            json!({ "versionName": "", "versionCode": 42 }),
            json!({ "versionName": "1.4.2", "versionCode": 0 }),
            json!({ "versionName": "1.4.2", "versionCode": "" }),
            json!({ "versionName": null, "versionCode": 42 }),
        ] {
            let err = validated(body.clone()).unwrap_err();
            assert!(
                matches!(err, DispatchError::BadRequest { reason } if reason == "Missing required fields"),
                "expected missing fields for {body}"
            );
        }
    }

    #[test]
    fn empty_body_means_missing_fields() {
        let err = UpdateNotificationRequest::parse(b"  ")
            .unwrap()
            .into_validated()
            .unwrap_err();
        assert!(matches!(err, DispatchError::BadRequest { reason } if reason == "Missing required fields"));
    }

    #[test]
    fn malformed_body_is_invalid() {
        for body in [&b"{not json"[..], br#"{"versionName": 5}"#] {
            let err = UpdateNotificationRequest::parse(body).unwrap_err();
            assert!(matches!(err, DispatchError::BadRequest { reason } if reason == "Invalid JSON body"));
        }
    }

    #[test]
    fn non_object_bodies_carry_no_fields() {
        for body in [
            &br#"["1.4.2", 42, "hi", true]"#[..],
            br#"[1,2]"#,
            br#""1.4.2""#,
            b"42",
            b"null",
        ] {
            let err = UpdateNotificationRequest::parse(body).unwrap_err();
            assert!(
                matches!(err, DispatchError::BadRequest { reason } if reason == "Missing required fields"),
                "expected missing fields for {}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn whole_float_version_code_renders_as_integer() {
        for code in [json!(42.0), json!(4.2e1)] {
            let update = validated(json!({ "versionName": "1", "versionCode": code })).unwrap();
            assert_eq!(update.to_payload().data["versionCode"], "42");

            let receipt = DispatchReceipt::sent("msg-1".to_string(), update);
            assert_eq!(serde_json::to_value(&receipt).unwrap()["versionCode"], json!(42));
        }

        let fractional = validated(json!({ "versionName": "1", "versionCode": 4.5 })).unwrap();
        assert_eq!(fractional.to_payload().data["versionCode"], "4.5");
    }

    #[test]
    fn receipt_echoes_original_version_code_type() {
        let update = validated(json!({ "versionName": "1.4.2", "versionCode": 42 })).unwrap();
        let receipt = DispatchReceipt::sent("msg-123".to_string(), update);

        assert_eq!(
            serde_json::to_value(&receipt).unwrap(),
            json!({
                "success": true,
                "messageId": "msg-123",
                "versionName": "1.4.2",
                "versionCode": 42
            })
        );
    }
}
