//! Main entrypoint for the AFK bot.
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Spawning the liveness HTTP endpoint.
//! 4. Handing control to the supervisor, which probes the server, opens the
//!    session and runs until the shutdown signal.

use afkbot::{config::Config, http, supervisor};
use afkbot_transport::{Protocol, sim::SimProtocol};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!(
        host = %config.host,
        port = config.port,
        username = %config.username,
        "AFK bot starting"
    );

    let http_port = config.http_port;
    tokio::spawn(async move {
        if let Err(err) = http::serve(http_port).await {
            warn!(error = ?err, "liveness endpoint terminated");
        }
    });

    // The wire-level backend lives outside this workspace; the simulated
    // backend keeps the binary self-contained. Any `Protocol` implementation
    // slots in here.
    let protocol: Arc<dyn Protocol> = Arc::new(SimProtocol::default());

    supervisor::run(&config, protocol).await
}
