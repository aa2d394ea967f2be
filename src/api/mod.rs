//! Local HTTP control API (§6): bearer-token-authenticated warp server
//! fronting the Daemon.

mod handlers;
mod responses;
mod routes;

use std::sync::Arc;

use log::info;

use crate::daemon::Daemon;

/// Launches the API server; runs until the process exits (triggered by
/// `/stop` or by the surrounding process supervisor).
pub async fn serve(daemon: Arc<Daemon>) {
    let addr = daemon.config.api_listen;
    let routes = routes::routes(daemon);

    info!("HTTP API listening on http://{addr}");
    warp::serve(routes).run(addr).await;
}
