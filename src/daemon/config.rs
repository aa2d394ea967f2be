//! Daemon configuration (§4.E, §6): sourced from environment variables
//! rather than a file, following the shape of a config struct but not its
//! loading mechanism.

use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_RELAY: &str = "wss://relay.agentnet.example/ws";
const DEFAULT_API_LISTEN: &str = "127.0.0.1:8420";
const DEFAULT_DATA_DIR: &str = "~/.agentnet";

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug)]
pub struct Config {
    /// WebSocket URL of the relay to connect to.
    pub relay_url: String,

    /// Agent name override; empty means derive from the identity's agent-ID.
    pub agent_name: String,

    /// Directory holding `agent.key`, `api.token`, `daemon.pid`.
    pub data_dir: PathBuf,

    /// Local HTTP control API listen address.
    pub api_listen: SocketAddr,

    /// Bearer token override; `None` means read (or generate) `api.token`.
    pub api_token_override: Option<String>,
}

impl Config {
    /// Builds a `Config` from environment variables, per §6.
    pub fn from_env() -> Self {
        let relay_url =
            std::env::var("AGENTNET_RELAY").unwrap_or_else(|_| DEFAULT_RELAY.to_string());
        let agent_name = std::env::var("AGENTNET_NAME").unwrap_or_default();
        let data_dir = expand_path(
            std::env::var("AGENTNET_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string()),
        );
        let api_listen = std::env::var("AGENTNET_API")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| DEFAULT_API_LISTEN.parse().expect("valid default addr"));
        let api_token_override = std::env::var("AGENTNET_TOKEN").ok();

        Config {
            relay_url,
            agent_name,
            data_dir,
            api_listen,
            api_token_override,
        }
    }

    pub fn key_path(&self) -> PathBuf {
        self.data_dir.join("agent.key")
    }

    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join("api.token")
    }

    pub fn pid_path(&self) -> PathBuf {
        self.data_dir.join("daemon.pid")
    }
}

fn expand_path(path: impl Into<PathBuf>) -> PathBuf {
    let path = path.into();
    if let Ok(p) = path.strip_prefix("~/") {
        if let Some(mut home) = dirs::home_dir() {
            home.push(p);
            return home;
        }
    }
    path
}

#[cfg(test)]
mod tests;
