//! Integration tests for the FCM client against a mock FCM endpoint
//!
//! Covers:
//! - Wire format of device, multicast and topic sends
//! - Default sound/icon and click action injection
//! - Status handling (200, 4xx, 5xx) and error taxonomy
//! - Local rejection of empty targets

use std::collections::HashMap;
use std::time::Duration;

use gomailer_fcm::{FCMClient, FCMError, FcmConfig, FcmResponse, Notification};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVER_KEY: &str = "test-server-key";

fn client_for(server: &MockServer) -> FCMClient {
    let config = FcmConfig::new(SERVER_KEY).with_endpoint(format!("{}/fcm/send", server.uri()));
    FCMClient::from_config(&config).unwrap()
}

fn multicast_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "multicast_id": 1,
        "success": 1,
        "failure": 0,
        "results": [{"message_id": "abc"}]
    }))
}

async fn sent_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests[0].body_json::<Value>().unwrap()
}

#[tokio::test]
async fn test_send_to_device_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .and(header("Authorization", "key=test-server-key"))
        .and(header("Content-Type", "application/json"))
        .respond_with(multicast_ok())
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .send_to_device("device-token-1", Notification::new("Hello", "World"), None)
        .await
        .unwrap();

    match &response {
        FcmResponse::Multicast(m) => {
            assert_eq!(m.results.len(), 1);
            assert_eq!(m.results[0].message_id.as_deref(), Some("abc"));
        }
        other => panic!("expected multicast response, got {:?}", other),
    }
    assert!(response.is_success());

    let body = sent_body(&server).await;
    assert_eq!(body["to"], "device-token-1");
    assert_eq!(body["notification"]["title"], "Hello");
    assert_eq!(body["notification"]["body"], "World");
    assert_eq!(body["notification"]["sound"], "default");
    assert_eq!(body["notification"]["icon"], "ic_notification");
    assert_eq!(body["data"], json!({"click_action": "FLUTTER_NOTIFICATION_CLICK"}));
}

#[tokio::test]
async fn test_click_action_overrides_caller_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "data": {"click_action": "FLUTTER_NOTIFICATION_CLICK", "campaign_id": "welcome_campaign"}
        })))
        .respond_with(multicast_ok())
        .expect(1)
        .mount(&server)
        .await;

    let mut data = HashMap::new();
    data.insert("click_action".to_string(), "OPEN_INBOX".to_string());
    data.insert("campaign_id".to_string(), "welcome_campaign".to_string());

    let client = client_for(&server);
    let notification = Notification::new("Hi", "There")
        .with_sound("chime")
        .with_icon("");

    client
        .send_to_device("device-token-1", notification, Some(data))
        .await
        .unwrap();

    let body = sent_body(&server).await;
    assert_eq!(body["notification"]["sound"], "chime");
    assert_eq!(body["notification"]["icon"], "ic_notification");
}

#[tokio::test]
async fn test_send_to_devices_uses_registration_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/fcm/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "multicast_id": 42,
            "success": 1,
            "failure": 1,
            "canonical_ids": 0,
            "results": [{"message_id": "m-1"}, {"error": "NotRegistered"}]
        })))
        .mount(&server)
        .await;

    let tokens = vec!["token-a".to_string(), "token-b".to_string()];
    let client = client_for(&server);
    let response = client
        .send_to_devices(&tokens, Notification::new("Sale", "50% off"), None)
        .await
        .unwrap();

    assert_eq!(response.success_count(), 1);
    assert_eq!(response.failure_count(), 1);
    assert_eq!(response.errors(), vec!["NotRegistered"]);

    let body = sent_body(&server).await;
    assert_eq!(body["registration_ids"], json!(["token-a", "token-b"]));
    assert!(body.get("to").is_none());
}

#[tokio::test]
async fn test_send_to_topic_rewrites_topic_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"to": "/topics/promo"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message_id": 5_000_123})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .send_to_topic("promo", Notification::new("Promo", "New deals"), None)
        .await
        .unwrap();

    assert!(matches!(response, FcmResponse::Single(_)));
    assert_eq!(response.message_ids(), vec!["5000123".to_string()]);
}

#[tokio::test]
async fn test_unauthorized_returns_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": "InvalidAuthenticationToken"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .send_to_device("device-token-1", Notification::new("t", "b"), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    let response = err.response().expect("401 body should decode");
    assert_eq!(response.errors(), vec!["InvalidAuthenticationToken"]);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_raw() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>Unavailable</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .send_to_topic("news", Notification::new("t", "b"), None)
        .await
        .unwrap_err();

    match &err {
        FCMError::Api {
            status,
            response,
            body,
        } => {
            assert_eq!(*status, 503);
            assert!(response.is_none());
            assert_eq!(body, "<html>Unavailable</html>");
        }
        other => panic!("expected API error, got {:?}", other),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_undecodable_success_body_is_serialization_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client
        .send_to_device("device-token-1", Notification::new("t", "b"), None)
        .await;

    assert!(matches!(result, Err(FCMError::Serialization(_))));
}

#[tokio::test]
async fn test_empty_targets_never_reach_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(multicast_ok())
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let result = client
        .send_to_device("", Notification::new("t", "b"), None)
        .await;
    assert!(matches!(result, Err(FCMError::InvalidTarget(_))));

    let result = client
        .send_to_devices(&[], Notification::new("t", "b"), None)
        .await;
    assert!(matches!(result, Err(FCMError::InvalidTarget(_))));

    let result = client
        .send_to_topic("", Notification::new("t", "b"), None)
        .await;
    assert!(matches!(result, Err(FCMError::InvalidTarget(_))));
}

#[tokio::test]
async fn test_request_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(multicast_ok().set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let config = FcmConfig::new(SERVER_KEY)
        .with_endpoint(format!("{}/fcm/send", server.uri()))
        .with_request_timeout(Duration::from_secs(1));
    let client = FCMClient::from_config(&config).unwrap();

    let err = client
        .send_to_device("device-token-1", Notification::new("t", "b"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, FCMError::Transport(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_sub_second_timeout_allows_fast_replies() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(multicast_ok())
        .expect(1)
        .mount(&server)
        .await;

    let config = FcmConfig::new(SERVER_KEY)
        .with_endpoint(format!("{}/fcm/send", server.uri()))
        .with_request_timeout(Duration::from_millis(500))
        .with_connect_timeout(Duration::from_millis(500));
    let client = FCMClient::from_config(&config).unwrap();

    let response = client
        .send_to_device("device-token-1", Notification::new("t", "b"), None)
        .await
        .unwrap();

    assert_eq!(response.message_ids(), vec!["abc".to_string()]);
}

#[tokio::test]
async fn test_success_reply_without_multicast_id_keeps_counts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": 1,
            "failure": 0,
            "results": [{"message_id": "abc"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .send_to_device("device-token-1", Notification::new("t", "b"), None)
        .await
        .unwrap();

    assert!(matches!(response, FcmResponse::Multicast(_)));
    assert_eq!(response.success_count(), 1);
    assert_eq!(response.message_ids(), vec!["abc".to_string()]);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop a listener so the port is closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let config =
        FcmConfig::new(SERVER_KEY).with_endpoint(format!("http://127.0.0.1:{}/fcm/send", port));
    let client = FCMClient::from_config(&config).unwrap();

    let result = client
        .send_to_device("device-token-1", Notification::new("t", "b"), None)
        .await;

    assert!(matches!(result, Err(FCMError::Transport(_))));
}
