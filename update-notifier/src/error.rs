use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const REQUIRED_FIELDS: [&str; 2] = ["versionName", "versionCode"];
pub const OPTIONAL_FIELDS: [&str; 2] = ["message", "forceUpdate"];

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const INVALID_BODY: &str = "Invalid JSON body";

/// Terminal failures of the dispatch endpoint.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,

    /// Missing key, wrong key and missing server configuration all land here.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{reason}")]
    BadRequest { reason: &'static str },

    #[error("{message}")]
    GatewayFailure { message: String },
}

impl DispatchError {
    pub fn missing_fields() -> Self {
        DispatchError::BadRequest {
            reason: MISSING_FIELDS,
        }
    }

    pub fn invalid_body() -> Self {
        DispatchError::BadRequest {
            reason: INVALID_BODY,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            DispatchError::Unauthorized => StatusCode::FORBIDDEN,
            DispatchError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            DispatchError::GatewayFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the dispatch outcome metric.
    pub fn outcome(&self) -> &'static str {
        match self {
            DispatchError::MethodNotAllowed => "method_not_allowed",
            DispatchError::Unauthorized => "unauthorized",
            DispatchError::BadRequest { .. } => "invalid",
            DispatchError::GatewayFailure { .. } => "failed",
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            DispatchError::MethodNotAllowed | DispatchError::Unauthorized => {
                json!({ "error": self.to_string() })
            }
            DispatchError::BadRequest { reason } => json!({
                "error": reason,
                "required": REQUIRED_FIELDS,
                "optional": OPTIONAL_FIELDS,
            }),
            DispatchError::GatewayFailure { message } => json!({
                "success": false,
                "error": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}
