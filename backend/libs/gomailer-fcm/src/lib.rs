//! Go-Mailer FCM Library
//!
//! Client for the legacy Firebase Cloud Messaging HTTP API
//! (`https://fcm.googleapis.com/fcm/send`, server-key auth) used by the
//! Go-Mailer backend to push notifications to Android, iOS and Flutter apps.
//!
//! It handles:
//! - Single-device, multi-device and topic sends
//! - Default sound/icon and the Flutter click action
//! - Typed multicast / single responses and error taxonomy
//! - Templated welcome, campaign, bulk and event notifications

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod sender;

pub use client::FCMClient;
pub use config::FcmConfig;
pub use errors::FCMError;
pub use models::{
    FcmResponse, Message, MessageBuilder, MulticastResult, Notification, SendResult,
    SingleResult, Target,
};
pub use sender::{BulkNotification, Campaign, NotificationSender, PushEvent, Recipient};
