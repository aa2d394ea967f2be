//! Endpoint handlers for the local HTTP control API (§6).

use std::convert::Infallible;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde::Deserialize;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::daemon::config::CURRENT_VERSION;
use crate::daemon::Daemon;
use crate::relay::Error as RelayError;

use super::responses::{
    HistoryQuery, MessagesQuery, RoomCreateRequest, RoomNameRequest, RoomSummary, SendRequest,
    StatusOk, StatusResponse,
};

/// Rejection for a missing/mismatched bearer token; recovered into 401.
#[derive(Debug)]
pub struct Unauthorized;
impl warp::reject::Reject for Unauthorized {}

/// Rejection for a state-mutating call with no live relay session.
#[derive(Debug)]
pub struct NotConnected;
impl warp::reject::Reject for NotConnected {}

/// Rejection wrapping a relay `error` frame or a 15-second timeout.
#[derive(Debug)]
pub struct RelayFailure(pub RelayError);
impl warp::reject::Reject for RelayFailure {}

/// Rejection for a failed `/history` upstream call.
#[derive(Debug)]
pub struct HistoryFailure(pub String);
impl warp::reject::Reject for HistoryFailure {}

pub async fn require_bearer(header: Option<String>, expected: String) -> Result<(), Rejection> {
    match header {
        Some(value) if value == format!("Bearer {expected}") => Ok(()),
        _ => Err(warp::reject::custom(Unauthorized)),
    }
}

pub async fn status(daemon: Arc<Daemon>) -> Result<impl Reply, Infallible> {
    let connected = daemon.is_connected().await;
    let latest_version = daemon.latest_version.lock().await.clone();
    let update_available = daemon
        .update_available
        .load(std::sync::atomic::Ordering::SeqCst);

    Ok(warp::reply::json(&StatusResponse {
        connected,
        relay: daemon.config.relay_url.clone(),
        agent_name: daemon.agent_name(),
        version: CURRENT_VERSION.to_string(),
        latest_version,
        update_available,
    }))
}

pub async fn list_rooms(daemon: Arc<Daemon>) -> Result<impl Reply, Rejection> {
    let client = daemon.current_client().await.ok_or_else(|| warp::reject::custom(NotConnected))?;
    let rooms = client
        .list_rooms(Vec::new(), 50)
        .await
        .map_err(|e| warp::reject::custom(RelayFailure(e)))?;
    let summaries: Vec<RoomSummary> = rooms.into_iter().map(RoomSummary::from).collect();
    Ok(warp::reply::json(&summaries))
}

pub async fn create_room(
    daemon: Arc<Daemon>,
    req: RoomCreateRequest,
) -> Result<impl Reply, Rejection> {
    let client = daemon.current_client().await.ok_or_else(|| warp::reject::custom(NotConnected))?;
    let room = client
        .create_room(&req.room, &req.topic, req.tags)
        .await
        .map_err(|e| warp::reject::custom(RelayFailure(e)))?;
    daemon.add_intent(&room.name).await;
    Ok(warp::reply::json(&super::responses::RoomResponse::from(room)))
}

pub async fn join_room(
    daemon: Arc<Daemon>,
    req: RoomNameRequest,
) -> Result<impl Reply, Rejection> {
    let client = daemon.current_client().await.ok_or_else(|| warp::reject::custom(NotConnected))?;
    let room = client
        .join_room(&req.room)
        .await
        .map_err(|e| warp::reject::custom(RelayFailure(e)))?;
    daemon.add_intent(&room.name).await;
    Ok(warp::reply::json(&super::responses::RoomResponse::from(room)))
}

pub async fn leave_room(
    daemon: Arc<Daemon>,
    req: RoomNameRequest,
) -> Result<impl Reply, Rejection> {
    let client = daemon.current_client().await.ok_or_else(|| warp::reject::custom(NotConnected))?;
    client
        .leave_room(&req.room)
        .await
        .map_err(|e| warp::reject::custom(RelayFailure(e)))?;
    daemon.remove_intent(&req.room).await;
    Ok(warp::reply::json(&StatusOk::ok()))
}

pub async fn send_message(daemon: Arc<Daemon>, req: SendRequest) -> Result<impl Reply, Rejection> {
    let client = daemon.current_client().await.ok_or_else(|| warp::reject::custom(NotConnected))?;
    client
        .send_message(&req.room, &req.text)
        .await
        .map_err(|e| warp::reject::custom(RelayFailure(e)))?;
    Ok(warp::reply::json(&StatusOk::ok()))
}

pub async fn read_messages(
    daemon: Arc<Daemon>,
    query: MessagesQuery,
) -> Result<impl Reply, Infallible> {
    let messages = daemon.drain_messages(query.room.as_deref()).await;
    Ok(warp::reply::json(&messages))
}

#[derive(Deserialize)]
struct HistoryEnvelope {
    messages: Vec<HistoryRecord>,
}

#[derive(Deserialize)]
struct HistoryRecord {
    #[allow(dead_code)]
    id: String,
    #[allow(dead_code)]
    room: String,
    from_id: String,
    from_name: Option<String>,
    content: String,
    timestamp: i64,
}

#[derive(Deserialize)]
struct HistoryContent {
    #[allow(dead_code)]
    #[serde(rename = "type")]
    kind: String,
    text: String,
}

pub async fn history(daemon: Arc<Daemon>, query: HistoryQuery) -> Result<impl Reply, Rejection> {
    let url = history_url(&daemon.config.relay_url, &query.room, query.limit);

    let envelope: HistoryEnvelope = reqwest::get(&url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| warp::reject::custom(HistoryFailure(e.to_string())))?
        .json()
        .await
        .map_err(|e| warp::reject::custom(HistoryFailure(e.to_string())))?;

    let mut transcript = String::new();
    for record in envelope.messages {
        let text = serde_json::from_str::<HistoryContent>(&record.content)
            .map(|c| c.text)
            .unwrap_or(record.content);
        let name = record.from_name.unwrap_or(record.from_id);
        let timestamp = Utc
            .timestamp_opt(record.timestamp, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown-time".to_string());
        transcript.push_str(&format!("[{timestamp}] {name}: {text}\n"));
    }

    Ok(warp::reply::with_header(
        transcript,
        "content-type",
        "text/plain; charset=utf-8",
    ))
}

/// Maps the relay's WebSocket URL to its REST API base: `wss→https`,
/// `ws→http`, path stripped to host only (§4.E `/history`).
fn history_url(relay_url: &str, room: &str, limit: u32) -> String {
    let https_base = relay_url
        .replacen("wss://", "https://", 1)
        .replacen("ws://", "http://", 1);
    let host = https_base
        .split('/')
        .take(3)
        .collect::<Vec<_>>()
        .join("/");
    format!("{host}/api/rooms/{room}/messages?limit={limit}")
}

pub async fn stop(daemon: Arc<Daemon>) -> Result<impl Reply, Infallible> {
    let _ = daemon;
    tokio::spawn(async {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        std::process::exit(0);
    });
    Ok(warp::reply::json(&StatusOk::stopping()))
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if err.find::<Unauthorized>().is_some() {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
    } else if err.find::<NotConnected>().is_some() {
        (StatusCode::SERVICE_UNAVAILABLE, "not connected".to_string())
    } else if let Some(RelayFailure(e)) = err.find::<RelayFailure>() {
        match e {
            RelayError::Timeout => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            RelayError::Server(_) => (StatusCode::BAD_REQUEST, e.to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        }
    } else if let Some(HistoryFailure(msg)) = err.find::<HistoryFailure>() {
        (StatusCode::BAD_GATEWAY, msg.clone())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "bad request".to_string())
    } else {
        (StatusCode::BAD_REQUEST, "bad request".to_string())
    };

    Ok(warp::reply::with_status(message, code))
}

#[cfg(test)]
mod tests;
