use std::fmt;
use std::time::Duration;

use crate::errors::FCMError;

/// Legacy FCM HTTP endpoint
pub const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// FCM client configuration
#[derive(Clone)]
pub struct FcmConfig {
    /// Legacy server key, sent as `Authorization: key=...`
    pub server_key: String,
    /// Send endpoint (overridable for staging and tests)
    pub endpoint: String,
    /// Whole-request timeout; the transport default applies when unset
    pub request_timeout: Option<Duration>,
    /// TCP connect timeout
    pub connect_timeout: Option<Duration>,
}

impl fmt::Debug for FcmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmConfig")
            .field("server_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            server_key: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: None,
            connect_timeout: None,
        }
    }
}

impl FcmConfig {
    /// Create new FCM configuration with the default endpoint
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            server_key: server_key.into(),
            ..Self::default()
        }
    }

    /// Create a new FcmConfig from environment variables
    pub fn from_env() -> Result<Self, FCMError> {
        let server_key = std::env::var("FCM_SERVER_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                FCMError::Config("FCM_SERVER_KEY environment variable not set".to_string())
            })?;

        Ok(Self {
            server_key,
            endpoint: std::env::var("FCM_ENDPOINT")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            request_timeout: std::env::var("FCM_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
            connect_timeout: std::env::var("FCM_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs),
        })
    }

    /// Override the send endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the whole-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the pooled HTTP client described by this configuration
    pub(crate) fn http_client(&self) -> Result<reqwest::Client, FCMError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| FCMError::Config(format!("failed to build HTTP client: {e}")))
    }
}
