use std::borrow::Cow;
use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::FCMError;

/// Data key the Flutter plugin uses to route notification taps
pub const CLICK_ACTION_KEY: &str = "click_action";
pub const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
pub const DEFAULT_SOUND: &str = "default";
pub const DEFAULT_ICON: &str = "ic_notification";
pub const TOPIC_PREFIX: &str = "/topics/";
/// Upper bound on `registration_ids` accepted by the legacy API
pub const MAX_REGISTRATION_IDS: usize = 1000;
/// Keys that only appear in the multicast reply shape
const MULTICAST_KEYS: [&str; 5] = [
    "multicast_id",
    "success",
    "failure",
    "canonical_ids",
    "results",
];

/// FCM Notification Payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            sound: None,
            icon: None,
        }
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Fill empty or missing sound/icon with the platform defaults
    fn with_defaults(mut self) -> Self {
        if self.sound.as_deref().map_or(true, str::is_empty) {
            self.sound = Some(DEFAULT_SOUND.to_string());
        }
        if self.icon.as_deref().map_or(true, str::is_empty) {
            self.icon = Some(DEFAULT_ICON.to_string());
        }
        self
    }
}

/// Who a message is addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Device(String),
    Devices(Vec<String>),
    /// Bare topic name, without the `/topics/` prefix
    Topic(String),
}

impl Target {
    pub fn device(token: impl Into<String>) -> Self {
        Target::Device(token.into())
    }

    pub fn devices<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Target::Devices(tokens.into_iter().map(Into::into).collect())
    }

    /// Topic target; a leading `/topics/` is accepted and stripped
    pub fn topic(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix(TOPIC_PREFIX) {
            Some(bare) => Target::Topic(bare.to_string()),
            None => Target::Topic(name),
        }
    }

    fn validate(&self) -> Result<(), FCMError> {
        match self {
            Target::Device(token) => validate_token(token),
            Target::Devices(tokens) => {
                if tokens.is_empty() {
                    return Err(FCMError::InvalidTarget(
                        "device token list is empty".to_string(),
                    ));
                }
                if tokens.len() > MAX_REGISTRATION_IDS {
                    return Err(FCMError::InvalidTarget(format!(
                        "{} device tokens exceeds the limit of {}",
                        tokens.len(),
                        MAX_REGISTRATION_IDS
                    )));
                }
                tokens.iter().try_for_each(|t| validate_token(t))
            }
            Target::Topic(name) => {
                if name.is_empty() {
                    return Err(FCMError::InvalidTarget("topic name is empty".to_string()));
                }
                let valid = name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'));
                if !valid {
                    return Err(FCMError::InvalidTarget(format!(
                        "topic name contains invalid characters: {name}"
                    )));
                }
                Ok(())
            }
        }
    }
}

fn validate_token(token: &str) -> Result<(), FCMError> {
    if token.trim().is_empty() {
        return Err(FCMError::InvalidTarget("device token is empty".to_string()));
    }
    Ok(())
}

/// A validated, fully defaulted FCM message.
///
/// Only [`MessageBuilder::build`] produces one, so the click action, sound and
/// icon are always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    target: Target,
    notification: Notification,
    data: HashMap<String, String>,
}

impl Message {
    pub fn builder(target: Target, notification: Notification) -> MessageBuilder {
        MessageBuilder::new(target, notification)
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn notification(&self) -> &Notification {
        &self.notification
    }

    pub fn data(&self) -> &HashMap<String, String> {
        &self.data
    }
}

/// Legacy wire shape. Single tokens and topics both travel in `to`.
#[derive(Serialize)]
struct WireMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<Cow<'a, str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    registration_ids: Option<&'a [String]>,
    notification: &'a Notification,
    data: &'a HashMap<String, String>,
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (to, registration_ids) = match &self.target {
            Target::Device(token) => (Some(Cow::Borrowed(token.as_str())), None),
            Target::Devices(tokens) => (None, Some(tokens.as_slice())),
            Target::Topic(name) => (Some(Cow::Owned(format!("{TOPIC_PREFIX}{name}"))), None),
        };

        WireMessage {
            to,
            registration_ids,
            notification: &self.notification,
            data: &self.data,
        }
        .serialize(serializer)
    }
}

/// Applies the defaulting and injection rules shared by every send
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    target: Target,
    notification: Notification,
    data: Option<HashMap<String, String>>,
}

impl MessageBuilder {
    pub fn new(target: Target, notification: Notification) -> Self {
        Self {
            target,
            notification,
            data: None,
        }
    }

    /// Replace the custom data payload
    pub fn data(mut self, data: Option<HashMap<String, String>>) -> Self {
        self.data = data;
        self
    }

    /// Add a single custom data entry
    pub fn insert_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<Message, FCMError> {
        self.target.validate()?;

        let mut data = self.data.unwrap_or_default();
        data.insert(CLICK_ACTION_KEY.to_string(), CLICK_ACTION.to_string());

        Ok(Message {
            target: self.target,
            notification: self.notification.with_defaults(),
            data,
        })
    }
}

/// Legacy FCM reply.
///
/// Device sends return the multicast shape; topic sends and top-level
/// failures return a bare `message_id` / `error`. Any multicast key in the
/// reply selects `Multicast`, so counts and results are never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FcmResponse {
    Multicast(MulticastResult),
    Single(SingleResult),
}

impl<'de> Deserialize<'de> for FcmResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let object = value
            .as_object()
            .ok_or_else(|| D::Error::custom("FCM reply is not a JSON object"))?;

        if MULTICAST_KEYS.iter().any(|key| object.contains_key(*key)) {
            serde_json::from_value(value)
                .map(FcmResponse::Multicast)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(FcmResponse::Single)
                .map_err(D::Error::custom)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastResult {
    #[serde(default)]
    pub multicast_id: i64,
    #[serde(default)]
    pub success: u32,
    #[serde(default)]
    pub failure: u32,
    #[serde(default)]
    pub canonical_ids: u32,
    /// One entry per recipient, in request order
    #[serde(default)]
    pub results: Vec<SendResult>,
    /// Top-level failure reported alongside the counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Canonical token the caller should switch to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        self.message_id.is_some() && self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FcmResponse {
    pub fn success_count(&self) -> u32 {
        match self {
            FcmResponse::Multicast(m) => m.success,
            FcmResponse::Single(s) => u32::from(s.message_id.is_some() && s.error.is_none()),
        }
    }

    pub fn failure_count(&self) -> u32 {
        match self {
            FcmResponse::Multicast(m) => m.failure,
            FcmResponse::Single(s) => u32::from(s.error.is_some()),
        }
    }

    /// At least one delivery accepted and none rejected
    pub fn is_success(&self) -> bool {
        self.success_count() > 0 && self.failure_count() == 0
    }

    pub fn message_ids(&self) -> Vec<String> {
        match self {
            FcmResponse::Multicast(m) => m
                .results
                .iter()
                .filter_map(|r| r.message_id.clone())
                .collect(),
            FcmResponse::Single(s) => s.message_id.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn errors(&self) -> Vec<&str> {
        match self {
            FcmResponse::Multicast(m) => m
                .error
                .as_deref()
                .into_iter()
                .chain(m.results.iter().filter_map(|r| r.error.as_deref()))
                .collect(),
            FcmResponse::Single(s) => s.error.as_deref().into_iter().collect(),
        }
    }
}
