//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::application::errors::{ConfigError, LinebotError};
use crate::application::webhook::{HandlerFailurePolicy, WebhookDispatcher, WebhookParser};
use crate::infrastructure::http::{ReqwestHttpClient, Timeout, DEFAULT_TIMEOUT};

/// SDK configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub channel: ChannelConfig,
    pub http: HttpConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChannelConfig {
    /// Channel secret used to verify webhook signatures
    pub secret: Option<String>,
}

/// Either `timeout-secs`, or both `connect-timeout-secs` and `read-timeout-secs`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HttpConfig {
    pub timeout_secs: Option<f64>,
    pub connect_timeout_secs: Option<f64>,
    pub read_timeout_secs: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WebhookConfig {
    pub on_handler_error: HandlerFailurePolicy,
    pub skip_signature_verification: bool,
}

fn secs(field: &str, value: f64) -> Result<Duration, ConfigError> {
    if value <= 0.0 {
        return Err(ConfigError::InvalidValue(format!("{} must be a positive number of seconds, got {}", field, value)));
    }
    Duration::try_from_secs_f64(value)
        .map_err(|e| ConfigError::InvalidValue(format!("{} = {}: {}", field, value, e)))
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();

        if let Ok(secret) = std::env::var("LINE_CHANNEL_SECRET") {
            config.channel.secret = Some(secret);
        }

        if let Ok(timeout) = std::env::var("LINE_HTTP_TIMEOUT") {
            match timeout.parse::<f64>() {
                Ok(secs) => config.http.timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring LINE_HTTP_TIMEOUT={}: not a number", timeout),
            }
        }

        config
    }

    /// Default request timeout described by the `http` section
    pub fn timeout(&self) -> Result<Timeout, ConfigError> {
        let http = &self.http;
        match (http.connect_timeout_secs, http.read_timeout_secs) {
            (Some(connect), Some(read)) => Ok(Timeout::split(
                secs("connect-timeout-secs", connect)?,
                secs("read-timeout-secs", read)?,
            )),
            (None, None) => match http.timeout_secs {
                Some(total) => Ok(Timeout::Total(secs("timeout-secs", total)?)),
                None => Ok(DEFAULT_TIMEOUT),
            },
            _ => Err(ConfigError::InvalidValue(
                "connect-timeout-secs and read-timeout-secs must be set together".to_string(),
            )),
        }
    }

    pub fn channel_secret(&self) -> Result<&str, ConfigError> {
        self.channel
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingField("channel.secret".to_string()))
    }

    /// Dispatcher with no handlers, set up from the `channel` and `webhook` sections
    pub fn dispatcher(&self) -> Result<WebhookDispatcher, ConfigError> {
        let parser = WebhookParser::new(self.channel_secret()?)
            .skip_signature_verification(self.webhook.skip_signature_verification);
        Ok(WebhookDispatcher::with_parser(parser).with_failure_policy(self.webhook.on_handler_error))
    }

    pub fn http_client(&self) -> Result<ReqwestHttpClient, LinebotError> {
        Ok(ReqwestHttpClient::with_timeout(self.timeout()?)?)
    }
}
