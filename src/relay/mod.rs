//! Relay Client (component D): owns a single WebSocket connection to the
//! relay, performs the handshake, and routes frames between message events,
//! response envelopes, and liveness frames.

mod frame;
mod handshake;
mod ops;
mod readloop;
pub mod types;

pub use types::{AgentProfile, Error, IncomingMessage, Member, RoomInfo, RoomListItem};

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ed25519_dalek::SigningKey;
use futures_util::stream::SplitSink;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Capacity of the bounded incoming-message channel between the read loop
/// and whoever drains `Messages()` (the Daemon), per spec §3/§5.
pub const MESSAGE_CHANNEL_CAPACITY: usize = 1000;

/// Capacity of the response-envelope channel. Spec §4.D/§9 calls for a
/// minimum of 4; we widen it, as the spec's own "hardening" suggestion,
/// since the operation mutex already guarantees at most one awaiter and a
/// larger buffer costs nothing but removes the narrow drop window a burst
/// of out-of-order envelopes could otherwise hit.
pub const RESPONSE_CHANNEL_CAPACITY: usize = 64;

const PING_INTERVAL: std::time::Duration = std::time::Duration::from_secs(25);
const OPERATION_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// A live connection to the relay. Cheaply `Clone`-able; every clone shares
/// the same underlying socket, locks, and channels.
#[derive(Clone)]
pub struct RelayClient {
    inner: Arc<Inner>,
}

struct Inner {
    write: Mutex<WsSink>,
    closed: AtomicBool,
    membership: Mutex<HashSet<String>>,
    response_rx: Mutex<mpsc::Receiver<Value>>,
    response_tx: mpsc::Sender<Value>,
    operation_mutex: Mutex<()>,
    messages_rx: Mutex<Option<mpsc::Receiver<IncomingMessage>>>,
    signing_key: SigningKey,
    profile: AgentProfile,
    read_task: Mutex<Option<JoinHandle<()>>>,
    ping_task: Mutex<Option<JoinHandle<()>>>,
}

impl RelayClient {
    /// `Connect(url, id, name, privKey)`: dials the relay, performs the
    /// handshake, and — on success — starts the read and ping loops.
    pub async fn connect(
        url: &str,
        profile: AgentProfile,
        signing_key: SigningKey,
    ) -> Result<Self, Error> {
        let (write, read) = handshake::dial_and_handshake(url, &profile, &signing_key).await?;

        let (response_tx, response_rx) = mpsc::channel(RESPONSE_CHANNEL_CAPACITY);
        let (messages_tx, messages_rx) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);

        let inner = Arc::new(Inner {
            write: Mutex::new(write),
            closed: AtomicBool::new(false),
            membership: Mutex::new(HashSet::new()),
            response_rx: Mutex::new(response_rx),
            response_tx,
            operation_mutex: Mutex::new(()),
            messages_rx: Mutex::new(Some(messages_rx)),
            signing_key,
            profile,
            read_task: Mutex::new(None),
            ping_task: Mutex::new(None),
        });

        let client = RelayClient { inner };

        let read_handle = readloop::spawn_read_loop(client.clone(), read, messages_tx);
        *client.inner.read_task.lock().await = Some(read_handle);

        let ping_handle = readloop::spawn_ping_loop(client.clone());
        *client.inner.ping_task.lock().await = Some(ping_handle);

        Ok(client)
    }

    /// `JoinRoom(name)`.
    pub async fn join_room(&self, name: &str) -> Result<RoomInfo, Error> {
        ops::join_room(&self.inner, name).await
    }

    /// `CreateRoom(name, topic, tags)`.
    pub async fn create_room(
        &self,
        name: &str,
        topic: &str,
        tags: Vec<String>,
    ) -> Result<RoomInfo, Error> {
        ops::create_room(&self.inner, name, topic, tags).await
    }

    /// `LeaveRoom(name)`: fire-and-forget signed send.
    pub async fn leave_room(&self, name: &str) -> Result<(), Error> {
        ops::leave_room(&self.inner, name).await
    }

    /// `SendMessage(room, text)`: fire-and-forget signed send.
    pub async fn send_message(&self, room: &str, text: &str) -> Result<(), Error> {
        ops::send_message(&self.inner, room, text).await
    }

    /// `ListRooms(tags, limit)`.
    pub async fn list_rooms(
        &self,
        tags: Vec<String>,
        limit: u32,
    ) -> Result<Vec<RoomListItem>, Error> {
        ops::list_rooms(&self.inner, tags, limit).await
    }

    /// `Messages()`: the lazy stream of incoming messages for this session.
    /// Can only be taken once; subsequent calls return `None`.
    pub async fn messages(&self) -> Option<ReceiverStream<IncomingMessage>> {
        self.inner
            .messages_rx
            .lock()
            .await
            .take()
            .map(ReceiverStream::new)
    }

    /// `Close()`: closes the socket; the read loop will observe the closure
    /// and `Wait()` will return.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let mut write = self.inner.write.lock().await;
        let _ = futures_util::SinkExt::close(&mut *write).await;
        if let Some(task) = self.inner.ping_task.lock().await.take() {
            task.abort();
        }
    }

    /// `Wait()`: blocks until the read loop exits (socket closed, by either
    /// party, or a read error).
    pub async fn wait(&self) {
        let handle = self.inner.read_task.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// The room names this session believes it has joined (confirmed by a
    /// `room.joined` reply during this connection's lifetime).
    pub async fn joined_rooms(&self) -> HashSet<String> {
        self.inner.membership.lock().await.clone()
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.inner.profile
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests;
