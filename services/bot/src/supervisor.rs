//! Top-level orchestration: pre-flight probe, session startup, heartbeat and
//! graceful shutdown.
//!
//! Only startup failures (probe, initial connect) surface here and terminate
//! the process; everything after spawn is handled inside the controller.

use crate::config::Config;
use crate::controller::{ConnectionState, Controller};
use afkbot_transport::Protocol;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

/// Cadence of the observational status heartbeat.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(300);

/// Runs the bot until the operator signal arrives.
///
/// Probe or initial-connect failures return an error, which the binary maps
/// to exit code 1. A remote disconnect does not end the process; the
/// heartbeat and liveness endpoint keep running until the signal.
pub async fn run(config: &Config, protocol: Arc<dyn Protocol>) -> anyhow::Result<()> {
    info!(host = %config.host, port = config.port, "probing server before connecting");
    let metadata = protocol
        .probe(&config.host, config.port)
        .await
        .with_context(|| format!("pre-flight probe of {}:{} failed", config.host, config.port))?;
    info!(
        name = %metadata.name,
        version = %metadata.version,
        players_online = metadata.players_online,
        players_max = metadata.players_max,
        protocol_id = metadata.protocol_id,
        "server probe succeeded"
    );

    let mut controller = Controller::new(config.session_config(), protocol);
    controller
        .connect(None, None)
        .await
        .context("initial connect failed")?;

    let heartbeat = spawn_heartbeat(controller.watch_state());
    info!("bot is now running in AFK mode");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("received shutdown signal");
        }
        // drive() parks once the session is over; only the signal exits.
        _ = controller.drive() => {}
    }

    controller.disconnect().await;
    heartbeat.abort();
    info!("shut down gracefully");
    Ok(())
}

/// Low-frequency status log. Purely observational: it reads the controller's
/// published state and never touches the controller itself.
fn spawn_heartbeat(state: watch::Receiver<ConnectionState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first interval tick completes immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let current = *state.borrow();
            match current {
                ConnectionState::Connected | ConnectionState::Spawned => {
                    info!(state = %current, "bot is active and connected");
                }
                _ => info!(state = %current, "bot is not connected"),
            }
        }
    })
}
