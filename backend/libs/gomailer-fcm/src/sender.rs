//! Go-Mailer notification templates
//!
//! Canned welcome, campaign, bulk and event-triggered notifications built on
//! top of [`FCMClient`]. Every template plays the default sound and tags
//! `data.notification_type` so the mobile SDKs can route taps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::client::FCMClient;
use crate::errors::FCMError;
use crate::models::{FcmResponse, Notification, DEFAULT_SOUND};

const DEFAULT_BULK_CAMPAIGN: &str = "bulk_campaign";

/// Campaign content pushed to a single device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub title: String,
    pub message: String,
}

/// One addressee of a bulk send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub device_token: String,
    pub email: String,
}

/// Notification content shared by every bulk recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkNotification {
    pub title: String,
    pub body: String,
    pub campaign_id: Option<String>,
}

/// User events that have a notification template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushEvent {
    AppOpened,
    UserRegistered,
    ButtonClicked,
}

impl PushEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushEvent::AppOpened => "app_opened",
            PushEvent::UserRegistered => "user_registered",
            PushEvent::ButtonClicked => "button_clicked",
        }
    }

    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "app_opened" => Some(PushEvent::AppOpened),
            "user_registered" => Some(PushEvent::UserRegistered),
            "button_clicked" => Some(PushEvent::ButtonClicked),
            _ => None,
        }
    }

    fn notification(&self, event_data: &HashMap<String, String>) -> Notification {
        let (title, body) = match self {
            PushEvent::AppOpened => (
                "👋 Welcome back!".to_string(),
                "Thanks for using Go-Mailer. Check out what's new!".to_string(),
            ),
            PushEvent::UserRegistered => (
                "🎉 Registration Complete!".to_string(),
                "Your Go-Mailer account is ready. Start exploring now!".to_string(),
            ),
            PushEvent::ButtonClicked => {
                let button = event_data
                    .get("button")
                    .map(String::as_str)
                    .unwrap_or("unknown");
                (
                    "🔔 Action Detected".to_string(),
                    format!("You clicked: {button}. Here's what happens next..."),
                )
            }
        };

        Notification::new(title, body).with_sound(DEFAULT_SOUND)
    }
}

/// Sends Go-Mailer's templated notifications
#[derive(Debug, Clone)]
pub struct NotificationSender {
    fcm: FCMClient,
}

impl NotificationSender {
    pub fn new(fcm: FCMClient) -> Self {
        Self { fcm }
    }

    pub fn client(&self) -> &FCMClient {
        &self.fcm
    }

    /// Welcome a newly registered contact
    pub async fn send_welcome(
        &self,
        device_token: &str,
        email: &str,
    ) -> Result<FcmResponse, FCMError> {
        let notification = Notification::new(
            "🎉 Welcome to Go-Mailer!",
            format!("Hi {email}! Your account is now set up and ready to go."),
        )
        .with_sound(DEFAULT_SOUND);

        let data = string_map([
            ("notification_type", "welcome"),
            ("user_email", email),
            ("campaign_id", "welcome_campaign"),
        ]);

        let result = self
            .fcm
            .send_to_device(device_token, notification, Some(data))
            .await;
        log_outcome("welcome", &result);
        result
    }

    pub async fn send_campaign(
        &self,
        device_token: &str,
        campaign: &Campaign,
    ) -> Result<FcmResponse, FCMError> {
        let notification =
            Notification::new(campaign.title.as_str(), campaign.message.as_str())
                .with_sound(DEFAULT_SOUND);

        let data = string_map([
            ("notification_type", "campaign"),
            ("campaign_id", campaign.id.as_str()),
            ("campaign_name", campaign.name.as_str()),
        ]);

        let result = self
            .fcm
            .send_to_device(device_token, notification, Some(data))
            .await;
        log_outcome("campaign", &result);
        result
    }

    /// One multicast request covering every recipient
    pub async fn send_bulk(
        &self,
        recipients: &[Recipient],
        notification: &BulkNotification,
    ) -> Result<FcmResponse, FCMError> {
        let tokens: Vec<String> = recipients
            .iter()
            .map(|r| r.device_token.clone())
            .collect();

        let payload = Notification::new(notification.title.as_str(), notification.body.as_str())
            .with_sound(DEFAULT_SOUND);

        let campaign_id = notification
            .campaign_id
            .as_deref()
            .unwrap_or(DEFAULT_BULK_CAMPAIGN);
        let data = string_map([("notification_type", "bulk"), ("campaign_id", campaign_id)]);

        let result = self.fcm.send_to_devices(&tokens, payload, Some(data)).await;
        match &result {
            Ok(response) => info!(
                delivered = response.success_count(),
                recipients = recipients.len(),
                "Bulk notifications sent"
            ),
            Err(e) => error!(error = %e, "Failed to send bulk notifications"),
        }
        result
    }

    /// Returns `Ok(None)` without sending when `event_type` has no template
    pub async fn send_event_triggered(
        &self,
        device_token: &str,
        event_type: &str,
        event_data: &HashMap<String, String>,
    ) -> Result<Option<FcmResponse>, FCMError> {
        let Some(event) = PushEvent::from_event_type(event_type) else {
            info!(event_type, "No notification template for event");
            return Ok(None);
        };

        let mut data = string_map([
            ("notification_type", "event_triggered"),
            ("event_type", event.as_str()),
        ]);
        data.extend(event_data.iter().map(|(k, v)| (k.clone(), v.clone())));

        let result = self
            .fcm
            .send_to_device(device_token, event.notification(event_data), Some(data))
            .await;
        log_outcome(event.as_str(), &result);
        result.map(Some)
    }
}

fn string_map<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn log_outcome(kind: &str, result: &Result<FcmResponse, FCMError>) {
    match result {
        Ok(response) => info!(
            kind,
            message_ids = ?response.message_ids(),
            "Notification sent"
        ),
        Err(e) => error!(kind, error = %e, "Failed to send notification"),
    }
}
