//! Synchronous request/response correlation and the room operations that
//! rely on it (§4.D "Synchronous request/response correlation").

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::SinkExt;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

use super::frame;
use super::types::{Error, Member, RoomInfo, RoomListItem};
use super::{Inner, OPERATION_TIMEOUT};
use crate::pow;

pub async fn join_room(inner: &Arc<Inner>, name: &str) -> Result<RoomInfo, Error> {
    let _guard = inner.operation_mutex.lock().await;

    let request = frame::build(
        "room.join",
        vec![("room", Value::String(name.to_string()))],
        Some(&inner.signing_key),
    );
    write(inner, &request).await?;

    let reply = await_response(inner, Some(name), &["room.joined", "error"]).await?;
    handle_room_joined(inner, reply).await
}

pub async fn create_room(
    inner: &Arc<Inner>,
    name: &str,
    topic: &str,
    tags: Vec<String>,
) -> Result<RoomInfo, Error> {
    let _guard = inner.operation_mutex.lock().await;

    let room_create = |pow_field: Option<Value>| {
        let mut fields = vec![
            ("room", Value::String(name.to_string())),
            ("topic", Value::String(topic.to_string())),
            ("tags", Value::from(tags.clone())),
        ];
        if let Some(pow) = pow_field {
            fields.push(("pow", pow));
        }
        frame::build("room.create", fields, Some(&inner.signing_key))
    };

    write(inner, &room_create(None)).await?;

    let first = await_response(
        inner,
        None,
        &["pow.challenge", "room.joined", "error"],
    )
    .await?;

    let reply = match frame_type(&first).as_str() {
        "error" => return Err(Error::Server(error_message(&first))),
        "room.joined" => first,
        "pow.challenge" => {
            let challenge = first
                .get("challenge")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Protocol("pow.challenge missing challenge".into()))?;
            let difficulty = first
                .get("difficulty")
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::Protocol("pow.challenge missing difficulty".into()))?
                as u32;
            let proof = pow::solve(challenge, difficulty);

            let second = room_create(Some(
                serde_json::json!({"challenge": challenge, "proof": proof}),
            ));
            write(inner, &second).await?;
            await_response(inner, None, &["room.joined", "error"]).await?
        }
        other => return Err(Error::Protocol(format!("unexpected frame type {other}"))),
    };

    handle_room_joined(inner, reply).await
}

pub async fn leave_room(inner: &Arc<Inner>, name: &str) -> Result<(), Error> {
    let request = frame::build(
        "room.leave",
        vec![("room", Value::String(name.to_string()))],
        Some(&inner.signing_key),
    );
    write(inner, &request).await
}

pub async fn send_message(inner: &Arc<Inner>, room: &str, text: &str) -> Result<(), Error> {
    let request = frame::build(
        "message",
        vec![
            ("room", Value::String(room.to_string())),
            (
                "content",
                serde_json::json!({"type": "text", "text": text}),
            ),
        ],
        Some(&inner.signing_key),
    );
    write(inner, &request).await
}

pub async fn list_rooms(
    inner: &Arc<Inner>,
    tags: Vec<String>,
    limit: u32,
) -> Result<Vec<RoomListItem>, Error> {
    let _guard = inner.operation_mutex.lock().await;

    // `rooms.list` is a pure-read request and is sent unsigned, a wire
    // quirk spec §4.D/§9 preserves deliberately for compatibility.
    let request = frame::build(
        "rooms.list",
        vec![("tags", Value::from(tags)), ("limit", Value::from(limit))],
        None,
    );
    write(inner, &request).await?;

    let reply = await_response(inner, None, &["rooms.list.result", "error"]).await?;
    match frame_type(&reply).as_str() {
        "error" => Err(Error::Server(error_message(&reply))),
        "rooms.list.result" => {
            let rooms = reply.get("rooms").cloned().unwrap_or(Value::Array(vec![]));
            serde_json::from_value(rooms)
                .map_err(|e| Error::Protocol(format!("invalid rooms.list.result: {e}")))
        }
        other => Err(Error::Protocol(format!("unexpected frame type {other}"))),
    }
}

async fn handle_room_joined(inner: &Arc<Inner>, reply: Value) -> Result<RoomInfo, Error> {
    match frame_type(&reply).as_str() {
        "error" => Err(Error::Server(error_message(&reply))),
        "room.joined" => {
            let room = reply
                .get("room")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Protocol("room.joined missing room".into()))?
                .to_string();
            let topic = reply
                .get("topic")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let tags: Vec<String> = reply
                .get("tags")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();
            let members: Vec<Member> = reply
                .get("members")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default();

            inner.membership.lock().await.insert(room.clone());

            Ok(RoomInfo {
                name: room,
                topic,
                tags,
                members,
            })
        }
        other => Err(Error::Protocol(format!("unexpected frame type {other}"))),
    }
}

/// Reads envelopes from the response channel until one matches
/// `want_types` (and, for `room.joined`, `want_room`). Non-matching
/// envelopes are re-enqueued so a later operation can still see them.
/// Overall deadline: 15 seconds.
async fn await_response(
    inner: &Arc<Inner>,
    want_room: Option<&str>,
    want_types: &[&str],
) -> Result<Value, Error> {
    let deadline = Instant::now() + OPERATION_TIMEOUT;
    let mut response_rx = inner.response_rx.lock().await;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining == Duration::ZERO {
            return Err(Error::Timeout);
        }

        let frame = match tokio::time::timeout(remaining, response_rx.recv()).await {
            Ok(Some(frame)) => frame,
            Ok(None) => return Err(Error::Protocol("response channel closed".into())),
            Err(_) => return Err(Error::Timeout),
        };

        let ftype = frame_type(&frame);
        let type_matches = want_types.contains(&ftype.as_str());
        let room_matches = if ftype == "room.joined" {
            match want_room {
                Some(room) => frame.get("room").and_then(Value::as_str) == Some(room),
                None => true,
            }
        } else {
            true
        };

        if type_matches && room_matches {
            return Ok(frame);
        }

        // Not the frame we're waiting for: give it back for the next
        // awaiter. `try_send` is non-blocking; if it fails (closed/full)
        // the frame is simply lost, the same as a dropped response.
        let _ = inner.response_tx.try_send(frame);
    }
}

async fn write(inner: &Arc<Inner>, value: &Value) -> Result<(), Error> {
    let mut write = inner.write.lock().await;
    write
        .send(Message::Text(value.to_string()))
        .await
        .map_err(|e| Error::Write(e.to_string()))
}

fn frame_type(value: &Value) -> String {
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
