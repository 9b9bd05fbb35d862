//! Sends a single test notification through the legacy FCM API
//!
//! Run with:
//! ```bash
//! FCM_SERVER_KEY=... cargo run -p gomailer-fcm --example send_notification -- <device-token>
//! ```
//!
//! Set `RUST_LOG=gomailer_fcm=debug` to see the request lifecycle.

use std::collections::HashMap;

use gomailer_fcm::{FCMClient, FcmConfig, Notification};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let device_token = std::env::args()
        .nth(1)
        .ok_or("usage: send_notification <device-token>")?;

    let config = FcmConfig::from_env()?;
    println!("Using config: {:?}", config);

    let client = FCMClient::from_config(&config)?;

    let mut data = HashMap::new();
    data.insert("campaign_id".to_string(), "welcome_campaign".to_string());
    data.insert("user_id".to_string(), "user123".to_string());

    let notification = Notification::new(
        "Hello from Go-Mailer!",
        "Your notification message here",
    )
    .with_sound("default");

    match client
        .send_to_device(&device_token, notification, Some(data))
        .await
    {
        Ok(response) if response.is_success() => {
            println!("Notification sent, message ids: {:?}", response.message_ids());
        }
        Ok(response) => {
            println!("Notification rejected: {:?}", response.errors());
        }
        Err(e) => {
            eprintln!("Failed to send notification: {}", e);
            if let Some(response) = e.response() {
                eprintln!("Provider reply: {:?}", response);
            }
        }
    }

    Ok(())
}
