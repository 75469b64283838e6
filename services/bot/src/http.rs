//! Liveness HTTP endpoint.
//!
//! Hosting platforms keep the process alive by pinging it; this answers those
//! pings. It reports process liveness only and is fully decoupled from the
//! game-session state.

use axum::{Router, routing::get};
use tracing::info;

const LIVENESS_MESSAGE: &str = "AFK bot is running and alive";

async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

pub fn liveness_router() -> Router {
    Router::new().route("/", get(root))
}

/// Binds the liveness endpoint and serves it for the process lifetime.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "liveness endpoint listening");
    axum::serve(listener, liveness_router()).await?;
    Ok(())
}
