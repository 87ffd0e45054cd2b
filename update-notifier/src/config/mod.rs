use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_env_flag, get_env_opt};
use service_core::error::AppError;
use std::time::Duration;

pub const DEFAULT_FCM_API_URL: &str = "https://fcm.googleapis.com/v1/projects";

#[derive(Debug, Clone)]
pub struct UpdateNotifierConfig {
    pub common: core_config::Config,
    pub auth: AuthConfig,
    pub fcm: FcmConfig,
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret expected in the `x-api-key` header.
    /// `None` rejects every dispatch request.
    pub api_key: Option<Secret<String>>,
}

#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub project_id: String,
    /// OAuth2 bearer token for the FCM v1 API.
    pub service_account_key: Secret<String>,
    pub api_url: String,
    pub timeout: Duration,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Return the gateway's error text to callers on a failed send.
    /// When false callers get a generic message; the real text is only logged.
    pub expose_gateway_errors: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            expose_gateway_errors: true,
        }
    }
}

impl UpdateNotifierConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_production();

        let fcm_enabled = get_env_flag("FCM_ENABLED", false);
        // FCM credentials only become mandatory once the real gateway is on.
        let fcm_required = is_prod && fcm_enabled;

        let api_key = get_env_opt("UPDATE_API_KEY").map(Secret::new);
        if api_key.is_none() {
            tracing::warn!("UPDATE_API_KEY is not set; all dispatch requests will be rejected");
        }

        Ok(UpdateNotifierConfig {
            common: common_config,
            auth: AuthConfig { api_key },
            fcm: FcmConfig {
                project_id: get_env("FCM_PROJECT_ID", Some(""), fcm_required)?,
                service_account_key: Secret::new(get_env(
                    "FCM_SERVICE_ACCOUNT_KEY",
                    Some(""),
                    fcm_required,
                )?),
                api_url: get_env("FCM_API_URL", Some(DEFAULT_FCM_API_URL), false)?,
                timeout: parse_timeout_secs(
                    "FCM_TIMEOUT_SECS",
                    &get_env("FCM_TIMEOUT_SECS", Some("10"), false)?,
                )?,
                enabled: fcm_enabled,
            },
            dispatch: DispatchConfig {
                expose_gateway_errors: get_env_flag("DISPATCH_EXPOSE_GATEWAY_ERRORS", true),
            },
        })
    }
}

fn parse_timeout_secs(key: &str, raw: &str) -> Result<Duration, AppError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "{} must be a whole number of seconds, got {:?}: {}",
                key,
                raw,
                e
            ))
        })
}
