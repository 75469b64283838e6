//! AFK bot service.
//!
//! Keeps a single game-server session alive by sending periodic synthetic
//! input, and exposes a liveness HTTP endpoint for hosting-platform pings.
//! The wire protocol itself lives behind the `afkbot-transport` boundary.
//!
//! - `config`: environment-driven configuration, loaded once at startup.
//! - `controller`: the session lifecycle state machine.
//! - `keepalive`: the periodic anti-idle scheduler and tick synthesis.
//! - `http`: the liveness endpoint.
//! - `supervisor`: top-level orchestration (probe, connect, shutdown).

pub mod config;
pub mod controller;
pub mod http;
pub mod keepalive;
pub mod supervisor;

#[cfg(test)]
mod testutil;
