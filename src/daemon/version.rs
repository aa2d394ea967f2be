//! Version-check loop (§4.E "Version check loop"): compares the running
//! binary's version against the upstream release manifest, on startup and
//! every six hours.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde::Deserialize;

use crate::daemon::config::CURRENT_VERSION;
use crate::daemon::Daemon;

const CHECK_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);
const RELEASE_MANIFEST_URL: &str =
    "https://api.github.com/repos/agentnet/agentnet/releases/latest";

#[derive(Deserialize)]
struct ReleaseManifest {
    tag_name: String,
}

pub async fn run(daemon: Arc<Daemon>) {
    loop {
        check_once(&daemon).await;
        tokio::time::sleep(CHECK_INTERVAL).await;
    }
}

async fn check_once(daemon: &Arc<Daemon>) {
    if CURRENT_VERSION == "dev" {
        return;
    }

    let manifest = match fetch_manifest().await {
        Ok(manifest) => manifest,
        Err(e) => {
            warn!("version check failed: {e}");
            return;
        }
    };

    let latest = manifest.tag_name.trim().to_string();
    let outdated = is_outdated(CURRENT_VERSION, &latest);

    *daemon.latest_version.lock().await = Some(latest.clone());
    daemon.update_available.store(outdated, Ordering::SeqCst);

    if outdated {
        info!("update available: running {CURRENT_VERSION}, latest is {latest}");
    }
}

/// Whether `latest` (a release tag, possibly with surrounding whitespace)
/// counts as newer than `current`. `dev` never reports an update.
fn is_outdated(current: &str, latest: &str) -> bool {
    current != "dev" && latest.trim() != current
}

async fn fetch_manifest() -> Result<ReleaseManifest, reqwest::Error> {
    reqwest::Client::new()
        .get(RELEASE_MANIFEST_URL)
        .header("User-Agent", "agentnetd")
        .send()
        .await?
        .json::<ReleaseManifest>()
        .await
}

#[cfg(test)]
mod tests;
