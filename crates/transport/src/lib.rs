//! Transport boundary for the AFK bot.
//!
//! The bot never touches wire framing, handshake or encryption. Everything it
//! needs from a protocol backend is expressed through two object-safe traits:
//!
//! - [`Protocol`]: constructs sessions and answers lightweight metadata probes.
//! - [`SessionHandle`]: the live handle for an established session, used to
//!   send outbound messages and request graceful closure.
//!
//! Lifecycle events flow back to the consumer through an [`SessionEvent`]
//! channel in the order the underlying transport delivers them. The [`sim`]
//! module provides an in-process backend that drives the full lifecycle
//! without any network I/O.

pub mod sim;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// How the backend should authenticate the session identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    /// Full credential-backed authentication handled by the backend.
    Online,
    /// Offline mode: the username is taken at face value.
    Offline,
}

/// Immutable session parameters, created once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMode,
    /// Protocol version string the backend should negotiate.
    pub version: String,
}

/// Metadata reported by a server in response to a probe.
///
/// A probe against a full or whitelisted server still succeeds; these fields
/// are informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerMetadata {
    pub name: String,
    pub version: String,
    pub players_online: u32,
    pub players_max: u32,
    pub protocol_id: i32,
}

/// A chat or system text packet observed on an active session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextMessage {
    /// Originating player or system source, when the backend reports one.
    pub source: Option<String>,
    pub message: String,
}

/// Lifecycle events emitted by a session, delivered in transport order.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The transport-level connection is established.
    Connected,
    /// The server has placed the client's avatar into the world.
    Spawned {
        /// Runtime entity id assigned by the server, when known.
        runtime_id: Option<u64>,
    },
    /// A text packet arrived; observational only.
    Text(TextMessage),
    /// The server terminated the session.
    Disconnected { reason: String },
    /// The underlying connection closed without an explicit reason.
    Closed,
    /// The backend hit an unrecoverable protocol-level error.
    ProtocolError(String),
}

/// Position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

/// A synthetic player input state update.
///
/// Field layout mirrors the input packet the backend encodes; the bot only
/// ever sends semantically inert values to reset the server's idle timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInput {
    pub runtime_id: u64,
    pub position: Vec3,
    /// Heading in degrees, `[0, 360)`.
    pub yaw: f32,
    pub pitch: f32,
    pub input_flags: u64,
    pub input_mode: u32,
    pub play_mode: u32,
    /// Monotonic tick counter.
    pub tick: u64,
}

/// Messages the bot can hand to a session for transmission.
#[derive(Debug, Clone, Serialize)]
pub enum OutboundMessage {
    PlayerInput(PlayerInput),
}

/// Failure of a pre-connection metadata probe.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    #[error("target {0} is unreachable: {1}")]
    Unreachable(String, String),
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected probe response from {0}: {1}")]
    Protocol(String, String),
}

/// Failure raised by session construction or by an established session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionError {
    #[error("session construction failed: {0}")]
    Construction(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("session is closed")]
    Closed,
}

/// The live handle for an established session.
///
/// Exclusively owned by whoever created it; once the session reports
/// `Disconnected`, `Closed` or `ProtocolError` the handle is dead and must be
/// discarded, not reused.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Transmits one outbound message. Fire-and-forget from the caller's
    /// perspective; no delivery confirmation is provided.
    async fn send(&self, message: OutboundMessage) -> Result<(), SessionError>;

    /// Requests graceful closure with a human-readable reason.
    async fn close(&self, reason: &str) -> Result<(), SessionError>;
}

/// A protocol backend: the only seam between the bot and the wire.
#[async_trait]
pub trait Protocol: Send + Sync {
    /// Constructs a session. Returns the handle together with the receiver on
    /// which lifecycle events for that session will be delivered. Connection
    /// completion is observed via [`SessionEvent::Connected`], not the return
    /// value; only immediate construction failures surface here.
    async fn create_session(
        &self,
        config: &SessionConfig,
    ) -> Result<(Box<dyn SessionHandle>, mpsc::Receiver<SessionEvent>), SessionError>;

    /// Performs a single bounded-time metadata query against a target,
    /// without establishing a full session.
    async fn probe(&self, host: &str, port: u16) -> Result<ServerMetadata, ProbeError>;
}
