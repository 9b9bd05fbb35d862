use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::FcmConfig;
use crate::errors::FCMError;
use crate::models::*;

/// Firebase Cloud Messaging Client (legacy server-key protocol)
///
/// Every send is one POST to the configured endpoint. Clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct FCMClient {
    server_key: Arc<str>,
    endpoint: Arc<str>,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for FCMClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FCMClient")
            .field("server_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl FCMClient {
    /// Create new FCM client against the public endpoint
    ///
    /// # Arguments
    /// * `server_key` - Legacy FCM server key
    ///
    /// # Errors
    /// `FCMError::Config` when the key is empty, same as [`FCMClient::from_config`]
    pub fn new(server_key: impl Into<String>) -> Result<Self, FCMError> {
        Self::from_config(&FcmConfig::new(server_key))
    }

    /// Create FCM client with endpoint and timeouts from configuration
    pub fn from_config(config: &FcmConfig) -> Result<Self, FCMError> {
        if config.server_key.trim().is_empty() {
            return Err(FCMError::Config("server key is empty".to_string()));
        }

        Ok(Self {
            server_key: Arc::from(config.server_key.as_str()),
            endpoint: Arc::from(config.endpoint.as_str()),
            http_client: config.http_client()?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send notification to a single device
    pub async fn send_to_device(
        &self,
        device_token: &str,
        notification: Notification,
        data: Option<HashMap<String, String>>,
    ) -> Result<FcmResponse, FCMError> {
        let message = Message::builder(Target::device(device_token), notification)
            .data(data)
            .build()?;

        self.dispatch(&message).await
    }

    /// Send multicast notification (one request, many devices)
    pub async fn send_to_devices(
        &self,
        device_tokens: &[String],
        notification: Notification,
        data: Option<HashMap<String, String>>,
    ) -> Result<FcmResponse, FCMError> {
        let message = Message::builder(Target::devices(device_tokens.iter().cloned()), notification)
            .data(data)
            .build()?;

        self.dispatch(&message).await
    }

    /// Send notification to topic subscribers
    pub async fn send_to_topic(
        &self,
        topic: &str,
        notification: Notification,
        data: Option<HashMap<String, String>>,
    ) -> Result<FcmResponse, FCMError> {
        let message = Message::builder(Target::topic(topic), notification)
            .data(data)
            .build()?;

        self.dispatch(&message).await
    }

    async fn dispatch(&self, message: &Message) -> Result<FcmResponse, FCMError> {
        let payload = serde_json::to_vec(message)?;

        debug!(
            endpoint = %self.endpoint,
            target = target_kind(message.target()),
            bytes = payload.len(),
            "Sending FCM message"
        );

        let response = self
            .http_client
            .post(&*self.endpoint)
            .header(AUTHORIZATION, format!("key={}", self.server_key))
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            let parsed = serde_json::from_str::<FcmResponse>(&body).ok();
            warn!(
                status = status.as_u16(),
                parsed = parsed.is_some(),
                "FCM request rejected"
            );
            return Err(FCMError::Api {
                status: status.as_u16(),
                response: parsed,
                body,
            });
        }

        let fcm_response: FcmResponse = serde_json::from_str(&body)?;

        debug!(
            success = fcm_response.success_count(),
            failure = fcm_response.failure_count(),
            "FCM response received"
        );

        Ok(fcm_response)
    }
}

fn target_kind(target: &Target) -> &'static str {
    match target {
        Target::Device(_) => "device",
        Target::Devices(_) => "devices",
        Target::Topic(_) => "topic",
    }
}
