use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::DispatchError;
use crate::models::{DispatchReceipt, UpdateNotificationRequest};
use crate::services::record_dispatch;
use crate::startup::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const ALLOWED_METHODS: &str = "POST";
pub const ALLOWED_HEADERS: &str = "Content-Type, x-api-key";

/// `/sendUpdateNotification`: broadcast an app update to the `all` topic.
///
/// Checks run in a fixed order (method, secret, body) and the gateway is only
/// reached once all of them pass.
#[tracing::instrument(skip_all, fields(method = %method))]
pub async fn send_update_notification(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return preflight();
    }

    match handle(&state, &method, &headers, &body).await {
        Ok(receipt) => {
            record_dispatch("sent");
            (StatusCode::OK, Json(receipt)).into_response()
        }
        Err(e) => {
            record_dispatch(e.outcome());
            e.into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<DispatchReceipt, DispatchError> {
    if *method != Method::POST {
        return Err(DispatchError::MethodNotAllowed);
    }

    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    state.dispatcher.authorize(presented)?;

    let update = UpdateNotificationRequest::parse(body)?.into_validated()?;

    state.dispatcher.dispatch(update).await
}

/// CORS preflight. Neither the secret nor the body is looked at.
fn preflight() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            ),
        ],
    )
        .into_response()
}
