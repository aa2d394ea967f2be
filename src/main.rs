mod api;
mod canon;
mod daemon;
mod identity;
mod pow;
mod relay;
mod signing;

use std::sync::Arc;

use clap::Parser;
use log::error;

use daemon::config::Config;
use daemon::Daemon;

/// Local agent daemon: connects to a relay over a signed, proof-of-work
/// gated WebSocket and exposes a local HTTP control API.
#[derive(Parser, Debug)]
#[command(name = "agentnetd", version, about)]
struct Args {
    /// Relay WebSocket URL. Overrides AGENTNET_RELAY.
    #[arg(long, env = "AGENTNET_RELAY")]
    relay: Option<String>,

    /// Agent name override. Overrides AGENTNET_NAME.
    #[arg(long, env = "AGENTNET_NAME")]
    name: Option<String>,

    /// Directory for identity, token, and pid files.
    #[arg(long, env = "AGENTNET_DATA_DIR")]
    data_dir: Option<String>,

    /// Local HTTP API listen address.
    #[arg(long, env = "AGENTNET_API")]
    api: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Some(relay) = &args.relay {
        std::env::set_var("AGENTNET_RELAY", relay);
    }
    if let Some(name) = &args.name {
        std::env::set_var("AGENTNET_NAME", name);
    }
    if let Some(data_dir) = &args.data_dir {
        std::env::set_var("AGENTNET_DATA_DIR", data_dir);
    }
    if let Some(api) = &args.api {
        std::env::set_var("AGENTNET_API", api);
    }

    if let Err(e) = run().await {
        error!("startup failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), daemon::Error> {
    let config = Config::from_env();
    let daemon = Arc::new(Daemon::bootstrap(config)?);

    daemon.connect_and_rejoin().await?;
    daemon.spawn_background_tasks();
    daemon.write_pid_file()?;

    api::serve(daemon).await;
    Ok(())
}
