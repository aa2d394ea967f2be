//! End-to-end tests against a minimal in-process stub relay, covering the
//! handshake and room-operation scenarios of §8.

use ed25519_dalek::SigningKey;
use futures_util::{SinkExt, StreamExt};
use rand::rngs::OsRng;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use super::*;

type ServerStream = WebSocketStream<TcpStream>;

async fn bind_stub() -> (String, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (format!("ws://{addr}"), listener)
}

async fn accept(listener: TcpListener) -> ServerStream {
    let (stream, _) = listener.accept().await.unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

async fn recv_json(server: &mut ServerStream) -> Value {
    match server.next().await.unwrap().unwrap() {
        Message::Text(text) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text frame, got {other:?}"),
    }
}

async fn send_json(server: &mut ServerStream, value: &Value) {
    server.send(Message::Text(value.to_string())).await.unwrap();
}

/// Drives the handshake to completion with a zero-difficulty challenge,
/// which any nonce solves immediately.
async fn drive_handshake(server: &mut ServerStream) {
    let hello = recv_json(server).await;
    assert_eq!(hello["type"], "hello");

    send_json(
        server,
        &json!({"type": "pow.challenge", "challenge": "abc123", "difficulty": 0}),
    )
    .await;

    let pow_reply = recv_json(server).await;
    assert_eq!(pow_reply["type"], "hello.pow");

    send_json(server, &json!({"type": "welcome"})).await;
}

#[tokio::test]
async fn handshake_then_join_room_succeeds() {
    let (url, listener) = bind_stub().await;

    let server_task = tokio::spawn(async move {
        let mut server = accept(listener).await;
        drive_handshake(&mut server).await;

        let join = recv_json(&mut server).await;
        assert_eq!(join["type"], "room.join");
        assert_eq!(join["room"], "general");

        send_json(
            &mut server,
            &json!({
                "type": "room.joined",
                "room": "general",
                "topic": "chat",
                "tags": [],
                "members": [],
            }),
        )
        .await;
        server
    });

    let signing_key = SigningKey::generate(&mut OsRng);
    let profile = AgentProfile {
        id: "agent1".to_string(),
        name: "agent1".to_string(),
        version: "dev".to_string(),
    };
    let client = RelayClient::connect(&url, profile, signing_key).await.unwrap();

    let room = client.join_room("general").await.unwrap();
    assert_eq!(room.name, "general");
    assert!(client.joined_rooms().await.contains("general"));

    server_task.await.unwrap();
}

#[tokio::test]
async fn create_room_solves_pow_challenge_before_succeeding() {
    let (url, listener) = bind_stub().await;

    let server_task = tokio::spawn(async move {
        let mut server = accept(listener).await;
        drive_handshake(&mut server).await;

        let first = recv_json(&mut server).await;
        assert_eq!(first["type"], "room.create");
        assert!(first.get("pow").is_none());

        send_json(
            &mut server,
            &json!({"type": "pow.challenge", "challenge": "room-chal", "difficulty": 0}),
        )
        .await;

        let second = recv_json(&mut server).await;
        assert_eq!(second["type"], "room.create");
        assert!(second["pow"]["proof"].is_string());

        send_json(
            &mut server,
            &json!({
                "type": "room.joined",
                "room": "new-room",
                "topic": "topic",
                "tags": ["x"],
                "members": [],
            }),
        )
        .await;
        server
    });

    let signing_key = SigningKey::generate(&mut OsRng);
    let profile = AgentProfile {
        id: "agent1".to_string(),
        name: "agent1".to_string(),
        version: "dev".to_string(),
    };
    let client = RelayClient::connect(&url, profile, signing_key).await.unwrap();

    let room = client
        .create_room("new-room", "topic", vec!["x".to_string()])
        .await
        .unwrap();
    assert_eq!(room.name, "new-room");
    assert_eq!(room.tags, vec!["x".to_string()]);

    server_task.await.unwrap();
}

#[tokio::test]
async fn server_close_unblocks_wait() {
    let (url, listener) = bind_stub().await;

    let server_task = tokio::spawn(async move {
        let mut server = accept(listener).await;
        drive_handshake(&mut server).await;
        server.close().await.unwrap();
    });

    let signing_key = SigningKey::generate(&mut OsRng);
    let profile = AgentProfile {
        id: "agent1".to_string(),
        name: "agent1".to_string(),
        version: "dev".to_string(),
    };
    let client = RelayClient::connect(&url, profile, signing_key).await.unwrap();

    client.wait().await;
    assert!(client.is_closed());

    server_task.await.unwrap();
}

#[tokio::test]
async fn outbound_messages_carry_a_valid_signature() {
    let (url, listener) = bind_stub().await;
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();

    let server_task = tokio::spawn(async move {
        let mut server = accept(listener).await;
        let hello = recv_json(&mut server).await;

        assert!(crate::signing::verify(&verifying_key, &hello).is_ok());

        send_json(
            &mut server,
            &json!({"type": "pow.challenge", "challenge": "c", "difficulty": 0}),
        )
        .await;
        let _ = recv_json(&mut server).await;
        send_json(&mut server, &json!({"type": "welcome"})).await;
    });

    let profile = AgentProfile {
        id: "agent1".to_string(),
        name: "agent1".to_string(),
        version: "dev".to_string(),
    };
    let _client = RelayClient::connect(&url, profile, signing_key).await.unwrap();

    server_task.await.unwrap();
}
