//! Wire-facing value types for the Relay Client (component D).

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to dial relay: {0}")]
    Dial(String),
    #[error("relay rejected authentication: {0}")]
    Auth(String),
    #[error("unexpected protocol frame: {0}")]
    Protocol(String),
    #[error("relay error: {0}")]
    Server(String),
    #[error("timed out waiting for a reply")]
    Timeout,
    #[error("failed to write to relay: {0}")]
    Write(String),
}

/// {id, name, version} sent in the `hello` frame and echoed by `/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub version: String,
}

/// A room member as returned in `room.joined`/`rooms.list.result` frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

/// Result of a successful `CreateRoom`/`JoinRoom` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

/// One entry of a `ListRooms` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomListItem {
    pub name: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub agents: u64,
    #[serde(default)]
    pub last_active: Option<i64>,
}

/// An incoming `message` event, as delivered into the ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub room: String,
    pub from: String,
    #[serde(default)]
    pub from_name: Option<String>,
    pub text: String,
    pub timestamp: i64,
}
