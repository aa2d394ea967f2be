//! Reconnect loop (§4.E "Reconnect loop"): waits for the current session to
//! die, then redials with exponential backoff, rejoining the intent set on
//! every successful reconnect.

use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::daemon::Daemon;

const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

pub async fn run(daemon: Arc<Daemon>) {
    loop {
        let client = daemon.current_client().await;
        if let Some(client) = client {
            client.wait().await;
            info!("relay session ended, reconnecting");
        }
        daemon.clear_client().await;

        let mut backoff = INITIAL_BACKOFF;
        loop {
            match daemon.connect_and_rejoin().await {
                Ok(()) => break,
                Err(e) => {
                    warn!("reconnect attempt failed: {e}; retrying in {backoff:?}");
                    tokio::time::sleep(backoff).await;
                    backoff = next_backoff(backoff);
                }
            }
        }
    }
}

/// Doubles `current`, capped at `MAX_BACKOFF`.
fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

#[cfg(test)]
mod tests;
