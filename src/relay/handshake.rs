//! Handshake state machine: `Dialing -> HelloSent -> PoWSolving ->
//! PoWReplied -> Welcomed(alive)`, with terminal `Failed`. Frames are read
//! inline here, before the read loop exists — the single place where
//! unsolicited frames cannot arrive and synchronous reads are safe.

use ed25519_dalek::SigningKey;
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::frame;
use super::types::{AgentProfile, Error};
use super::WsSink;
use crate::pow;

type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

pub async fn dial_and_handshake(
    url: &str,
    profile: &AgentProfile,
    signing_key: &SigningKey,
) -> Result<(WsSink, WsStream), Error> {
    // Dialing
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| Error::Dial(e.to_string()))?;
    let (mut write, mut read) = ws_stream.split();

    // HelloSent
    let hello = frame::build(
        "hello",
        vec![(
            "profile",
            serde_json::to_value(profile).expect("profile serializes"),
        )],
        Some(signing_key),
    );
    send_json(&mut write, &hello).await?;

    let challenge_frame = read_one_frame(&mut read).await?;
    let frame_type = frame_type_of(&challenge_frame);
    if frame_type == "error" {
        return Err(Error::Auth(error_message(&challenge_frame)));
    }
    if frame_type != "pow.challenge" {
        return Err(Error::Protocol(format!(
            "expected pow.challenge, got {frame_type}"
        )));
    }

    // PoWSolving
    let challenge = challenge_frame
        .get("challenge")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Protocol("pow.challenge missing challenge".into()))?;
    let difficulty = challenge_frame
        .get("difficulty")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::Protocol("pow.challenge missing difficulty".into()))?
        as u32;

    let proof = pow::solve(challenge, difficulty);

    // PoWReplied
    let hello_pow = frame::build(
        "hello.pow",
        vec![(
            "pow",
            serde_json::json!({"challenge": challenge, "proof": proof}),
        )],
        Some(signing_key),
    );
    send_json(&mut write, &hello_pow).await?;

    let welcome_frame = read_one_frame(&mut read).await?;
    match frame_type_of(&welcome_frame).as_str() {
        // Welcomed(alive)
        "welcome" => Ok((write, read)),
        "error" => Err(Error::Auth(error_message(&welcome_frame))),
        other => Err(Error::Protocol(format!("expected welcome, got {other}"))),
    }
}

async fn send_json(write: &mut WsSink, value: &Value) -> Result<(), Error> {
    write
        .send(Message::Text(value.to_string()))
        .await
        .map_err(|e| Error::Write(e.to_string()))
}

async fn read_one_frame(read: &mut WsStream) -> Result<Value, Error> {
    loop {
        let msg = read
            .next()
            .await
            .ok_or_else(|| Error::Dial("connection closed during handshake".into()))?
            .map_err(|e| Error::Dial(e.to_string()))?;

        match msg {
            Message::Text(text) => {
                return serde_json::from_str(&text)
                    .map_err(|e| Error::Protocol(format!("invalid JSON frame: {e}")));
            }
            Message::Close(_) => {
                return Err(Error::Dial("relay closed the connection".into()));
            }
            // Ping/Pong/Binary frames never arrive unsolicited mid-handshake
            // in this protocol; skip and keep waiting for the real reply.
            _ => continue,
        }
    }
}

fn frame_type_of(value: &Value) -> String {
    value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn error_message(value: &Value) -> String {
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string()
}
