//! Messaging app provider against a mock API

use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

use oc_core::{ChannelProvider, DomainError};
use oc_shared::config::MessagingAppConfig;

use crate::channels::{build_http_client, MessagingAppProvider};

fn provider(api_base_url: String) -> MessagingAppProvider {
    MessagingAppProvider::new(
        build_http_client(Duration::from_secs(5)).unwrap(),
        MessagingAppConfig {
            api_base_url,
            sender_id: "1029384756".to_string(),
            access_token: "long-lived".to_string(),
        },
    )
}

#[tokio::test]
async fn test_send_reads_message_id() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("authorization", "Bearer long-lived")
                .json_body_partial(json!({ "to": "+15551234567", "type": "text" }).to_string());
            then.status(200)
                .json_body(json!({ "messages": [{ "id": "wamid.777" }] }));
        })
        .await;

    let message_id = provider(server.url("/v1"))
        .send_otp("acme", "+15551234567", "111222", Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(message_id, "wamid.777");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_token_is_configuration_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(401);
        })
        .await;

    let err = provider(server.url("/v1"))
        .send_otp("acme", "+15551234567", "111222", Duration::from_secs(60))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Configuration { .. }));
}
