use thiserror::Error;

use crate::models::FcmResponse;

/// FCM Client Error Types
#[derive(Error, Debug)]
pub enum FCMError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("FCM configuration error: {0}")]
    Config(String),

    #[error("Failed to encode or decode FCM payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("FCM send request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("FCM API error: {status} - {body}")]
    Api {
        status: u16,
        /// Decoded reply, when the provider sent JSON
        response: Option<FcmResponse>,
        body: String,
    },
}

impl FCMError {
    /// HTTP status of an API error
    pub fn status(&self) -> Option<u16> {
        match self {
            FCMError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed provider reply carried by an API error, if it decoded
    pub fn response(&self) -> Option<&FcmResponse> {
        match self {
            FCMError::Api { response, .. } => response.as_ref(),
            _ => None,
        }
    }

    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// The client never retries on its own; this is only a hint.
    pub fn is_retryable(&self) -> bool {
        match self {
            FCMError::Transport(e) => e.is_timeout() || e.is_connect(),
            FCMError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<FCMError> for String {
    fn from(err: FCMError) -> Self {
        err.to_string()
    }
}
