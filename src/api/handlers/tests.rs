use super::*;

#[test]
fn history_url_maps_wss_to_https_and_strips_path() {
    let url = history_url("wss://relay.agentnet.example/ws/v1", "general", 20);
    assert_eq!(
        url,
        "https://relay.agentnet.example/api/rooms/general/messages?limit=20"
    );
}

#[test]
fn history_url_maps_ws_to_http() {
    let url = history_url("ws://localhost:9000/ws", "general", 5);
    assert_eq!(
        url,
        "http://localhost:9000/api/rooms/general/messages?limit=5"
    );
}

#[tokio::test]
async fn require_bearer_accepts_matching_token() {
    let result = require_bearer(Some("Bearer secret".to_string()), "secret".to_string()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn require_bearer_rejects_missing_header() {
    let result = require_bearer(None, "secret".to_string()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn require_bearer_rejects_wrong_token() {
    let result = require_bearer(Some("Bearer wrong".to_string()), "secret".to_string()).await;
    assert!(result.is_err());
}
