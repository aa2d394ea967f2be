//! Wire DTOs for the local HTTP control API (§6).

use serde::{Deserialize, Serialize};

use crate::relay::{Member, RoomInfo, RoomListItem};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub connected: bool,
    pub relay: String,
    pub agent_name: String,
    pub version: String,
    pub latest_version: Option<String>,
    pub update_available: bool,
}

#[derive(Debug, Serialize)]
pub struct RoomSummary {
    pub name: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub agents: u64,
    pub last_active: Option<i64>,
}

impl From<RoomListItem> for RoomSummary {
    fn from(item: RoomListItem) -> Self {
        RoomSummary {
            name: item.name,
            topic: item.topic,
            tags: item.tags,
            agents: item.agents,
            last_active: item.last_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoomResponse {
    pub name: String,
    pub topic: String,
    pub tags: Vec<String>,
    pub members: Vec<Member>,
}

impl From<RoomInfo> for RoomResponse {
    fn from(info: RoomInfo) -> Self {
        RoomResponse {
            name: info.name,
            topic: info.topic,
            tags: info.tags,
            members: info.members,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusOk {
    pub status: &'static str,
}

impl StatusOk {
    pub fn ok() -> Self {
        StatusOk { status: "ok" }
    }

    pub fn stopping() -> Self {
        StatusOk { status: "stopping" }
    }
}

#[derive(Debug, Deserialize)]
pub struct RoomCreateRequest {
    pub room: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoomNameRequest {
    pub room: String,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub room: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub room: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub room: String,
    #[serde(default = "default_history_limit")]
    pub limit: u32,
}

fn default_history_limit() -> u32 {
    20
}
