//! Read loop and ping loop, started once the handshake completes. From this
//! point on the read loop is the only task that ever reads from the socket.

use std::sync::atomic::Ordering;

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::types::IncomingMessage;
use super::{frame, RelayClient, PING_INTERVAL};

type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

pub fn spawn_read_loop(
    client: RelayClient,
    mut read: WsStream,
    messages_tx: mpsc::Sender<IncomingMessage>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let msg = match read.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(_)) | None => break,
            };

            let text = match msg {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            let frame: Value = match serde_json::from_str(&text) {
                Ok(v) => v,
                Err(_) => continue,
            };

            let frame_type = frame.get("type").and_then(Value::as_str).unwrap_or("");

            match frame_type {
                "message" => {
                    if let Ok(incoming) = serde_json::from_value::<IncomingMessage>(frame) {
                        // Bounded insert: backpressure halts protocol
                        // processing but never corrupts state (spec §5).
                        if messages_tx.send(incoming).await.is_err() {
                            break;
                        }
                    }
                }
                "pong" => { /* liveness only */ }
                "room.member_joined" | "room.member_left" => { /* not awaited by anyone */ }
                _ => {
                    // Non-blocking publish into the response channel; if
                    // full, drop (see RESPONSE_CHANNEL_CAPACITY rationale).
                    let _ = client.inner.response_tx.try_send(frame);
                }
            }
        }

        client.inner.closed.store(true, Ordering::SeqCst);
    })
}

pub fn spawn_ping_loop(client: RelayClient) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PING_INTERVAL);
        interval.tick().await; // first tick fires immediately; skip it
        loop {
            interval.tick().await;
            if client.inner.closed.load(Ordering::SeqCst) {
                break;
            }
            let ping = frame::build("ping", vec![], None);
            let mut write = client.inner.write.lock().await;
            if write.send(Message::Text(ping.to_string())).await.is_err() {
                break;
            }
        }
    })
}
