//! Daemon (component E): drives a single Relay Client instance, maintains
//! the joined-room intent set and reconnection policy, buffers incoming
//! messages, and exposes a local HTTP control API.

pub mod buffer;
pub mod config;
pub mod reconnect;
pub mod version;

use std::collections::HashSet;
use std::io::Write as _;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use log::{info, warn};
use rand::RngCore;
use tokio::sync::{Mutex, RwLock};

use crate::identity::{self, Identity};
use crate::relay::{AgentProfile, IncomingMessage, RelayClient};

use buffer::RingBuffer;
use config::{Config, CURRENT_VERSION};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("identity error: {0}")]
    Identity(#[from] identity::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("relay error: {0}")]
    Relay(#[from] crate::relay::Error),
}

pub struct Daemon {
    pub config: Config,
    identity: Identity,
    pub token: String,
    client: RwLock<Option<RelayClient>>,
    joined_intent: Mutex<HashSet<String>>,
    buffer: Mutex<RingBuffer>,
    pub latest_version: Mutex<Option<String>>,
    pub update_available: AtomicBool,
}

impl Daemon {
    /// Steps 1-2 of the startup sequence (§4.E): generate/load the bearer
    /// token and the identity. Does not connect yet.
    pub fn bootstrap(config: Config) -> Result<Self, Error> {
        std::fs::create_dir_all(&config.data_dir)?;

        let token = match &config.api_token_override {
            Some(token) => token.clone(),
            None => load_or_create_token(&config.token_path())?,
        };

        let identity = identity::load_or_create(&config.key_path())?;

        Ok(Daemon {
            config,
            identity,
            token,
            client: RwLock::new(None),
            joined_intent: Mutex::new(HashSet::new()),
            buffer: Mutex::new(RingBuffer::new()),
            latest_version: Mutex::new(None),
            update_available: AtomicBool::new(false),
        })
    }

    /// The effective agent name: the configured override, or
    /// `"agent-" + id[:8]` derived from the identity.
    pub fn agent_name(&self) -> String {
        if !self.config.agent_name.is_empty() {
            return self.config.agent_name.clone();
        }
        let id = self.identity.agent_id();
        format!("agent-{}", &id[..id.len().min(8)])
    }

    pub fn agent_id(&self) -> String {
        self.identity.agent_id()
    }

    /// Step 3 of the startup sequence: connect, then re-join every room in
    /// the intent set (logging, not failing, on a per-room join error).
    pub async fn connect_and_rejoin(self: &Arc<Self>) -> Result<(), Error> {
        let profile = AgentProfile {
            id: self.identity.agent_id(),
            name: self.agent_name(),
            version: CURRENT_VERSION.to_string(),
        };

        let signing_key =
            ed25519_dalek::SigningKey::from_bytes(&self.identity.signing_key.to_bytes());
        let client = RelayClient::connect(&self.config.relay_url, profile, signing_key).await?;

        let intent = self.joined_intent.lock().await.clone();
        for room in &intent {
            if let Err(e) = client.join_room(room).await {
                warn!("failed to rejoin room {room}: {e}");
            }
        }

        if let Some(mut messages) = client.messages().await {
            let daemon = Arc::clone(self);
            tokio::spawn(async move {
                use futures_util::StreamExt;
                while let Some(msg) = messages.next().await {
                    daemon.ingest(msg).await;
                }
            });
        }

        *self.client.write().await = Some(client);
        info!("connected to relay");
        Ok(())
    }

    async fn ingest(&self, msg: IncomingMessage) {
        self.buffer.lock().await.push(msg);
    }

    pub async fn current_client(&self) -> Option<RelayClient> {
        self.client.read().await.clone()
    }

    pub async fn clear_client(&self) {
        *self.client.write().await = None;
    }

    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }

    pub async fn add_intent(&self, room: &str) {
        self.joined_intent.lock().await.insert(room.to_string());
    }

    pub async fn remove_intent(&self, room: &str) {
        self.joined_intent.lock().await.remove(room);
    }

    pub async fn drain_messages(&self, room: Option<&str>) -> Vec<IncomingMessage> {
        self.buffer.lock().await.drain(room)
    }

    /// Step 5 of the startup sequence.
    pub fn write_pid_file(&self) -> Result<(), Error> {
        let pid = std::process::id();
        write_owner_only(&self.config.pid_path(), &pid.to_string())?;
        Ok(())
    }

    /// Starts the reconnect loop, version-check loop, and (per
    /// `src/api`) HTTP API listener; step 4 of the startup sequence.
    pub fn spawn_background_tasks(self: &Arc<Self>) {
        tokio::spawn(reconnect::run(Arc::clone(self)));
        tokio::spawn(version::run(Arc::clone(self)));
    }
}

fn load_or_create_token(path: &Path) -> Result<String, std::io::Error> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        Ok(contents.trim().to_string())
    } else {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        write_owner_only(path, &token)?;
        info!("generated API token at {}", path.display());
        Ok(token)
    }
}

#[cfg(unix)]
fn write_owner_only(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_owner_only(path: &Path, contents: &str) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

#[cfg(test)]
mod tests;
