//! Session lifecycle management.
//!
//! The controller owns at most one live session and runs it as an explicit
//! state machine: `Idle → Connecting → Connected → Spawned → Disconnected`.
//! Lifecycle events and keep-alive firings are consumed from a single event
//! loop ([`Controller::drive`]), so every handler runs to completion before
//! the next one starts and no lock ever guards the session handle.

use crate::keepalive::{self, KeepAlive};
use afkbot_transport::{OutboundMessage, Protocol, SessionConfig, SessionError, SessionEvent, SessionHandle};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Where the controller currently stands in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Spawned,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Spawned => "spawned",
            ConnectionState::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Synchronous failures of [`Controller::connect`]. Anything that goes wrong
/// after construction arrives as a [`SessionEvent`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("a session is already active; disconnect it first")]
    AlreadyConnected,
    #[error("session construction failed: {0}")]
    Construction(#[from] SessionError),
}

enum Step {
    Event(Option<SessionEvent>),
    KeepAlive,
}

/// Owns one session end-to-end: construction, event reactions, keep-alive
/// scheduling and teardown.
pub struct Controller {
    config: SessionConfig,
    protocol: Arc<dyn Protocol>,
    session: Option<Box<dyn SessionHandle>>,
    events: Option<mpsc::Receiver<SessionEvent>>,
    keepalive: KeepAlive,
    runtime_id: Option<u64>,
    state: watch::Sender<ConnectionState>,
}

impl Controller {
    pub fn new(config: SessionConfig, protocol: Arc<dyn Protocol>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            config,
            protocol,
            session: None,
            events: None,
            keepalive: KeepAlive::new(),
            runtime_id: None,
            state,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Observational view of the lifecycle state, for the heartbeat.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self.state(),
            ConnectionState::Connected | ConnectionState::Spawned
        )
    }

    #[cfg(test)]
    pub(crate) fn keepalive_armed(&self) -> bool {
        self.keepalive.is_armed()
    }

    fn set_state(&self, next: ConnectionState) {
        let prev = self.state();
        if prev != next {
            debug!(%prev, %next, "connection state transition");
            self.state.send_replace(next);
        }
    }

    /// Constructs a session from the configured parameters, with optional
    /// per-call host/port overrides.
    ///
    /// Returns once the handle exists; connection completion is observed via
    /// lifecycle events, not the return value. A second `connect` while a
    /// session is active is rejected rather than silently replacing (and
    /// leaking) the live connection.
    pub async fn connect(&mut self, host: Option<&str>, port: Option<u16>) -> Result<(), ConnectError> {
        if self.session.is_some() {
            return Err(ConnectError::AlreadyConnected);
        }

        let mut config = self.config.clone();
        if let Some(host) = host {
            config.host = host.to_string();
        }
        if let Some(port) = port {
            config.port = port;
        }

        info!(
            host = %config.host,
            port = config.port,
            username = %config.username,
            version = %config.version,
            "attempting to connect"
        );
        let (session, events) = self.protocol.create_session(&config).await?;
        self.session = Some(session);
        self.events = Some(events);
        self.set_state(ConnectionState::Connecting);
        Ok(())
    }

    /// Reacts to one lifecycle event. Pure state transition plus a bounded
    /// side effect (arming or disarming the keep-alive scheduler).
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => {
                if self.state() == ConnectionState::Connecting {
                    info!("connected to server");
                    self.set_state(ConnectionState::Connected);
                } else {
                    debug!(state = %self.state(), "ignoring connected event");
                }
            }
            SessionEvent::Spawned { runtime_id } => {
                info!(?runtime_id, "spawned into the world; keep-alive active");
                self.runtime_id = runtime_id;
                self.set_state(ConnectionState::Spawned);
                self.keepalive.arm();
            }
            SessionEvent::Text(msg) => {
                info!(source = ?msg.source, message = %msg.message, "chat message");
            }
            SessionEvent::Disconnected { reason } => {
                info!(%reason, "disconnected by server");
                self.teardown();
            }
            SessionEvent::Closed => {
                info!("connection closed");
                self.teardown();
            }
            SessionEvent::ProtocolError(err) => {
                warn!(error = %err, "protocol error; tearing down session");
                self.teardown();
            }
        }
    }

    /// Operator-initiated graceful disconnect. Idempotent: with no active
    /// session this is a no-op.
    pub async fn disconnect(&mut self) {
        let Some(session) = self.session.take() else {
            debug!("disconnect requested with no active session");
            return;
        };
        info!("disconnecting from server");
        self.keepalive.disarm();
        if let Err(err) = session.close("bot disconnecting").await {
            warn!(error = %err, "graceful close failed");
        }
        self.set_state(ConnectionState::Disconnected);
    }

    /// Drives the session: consumes lifecycle events and keep-alive firings
    /// until there is nothing left to drive, then parks. The caller owns the
    /// process lifetime and cancels this future to shut down.
    pub async fn drive(&mut self) {
        loop {
            let step = match self.events.as_mut() {
                Some(events) => tokio::select! {
                    event = events.recv() => Step::Event(event),
                    _ = self.keepalive.tick() => Step::KeepAlive,
                },
                None => std::future::pending::<Step>().await,
            };

            match step {
                Step::Event(Some(event)) => self.handle_event(event),
                Step::Event(None) => {
                    debug!("session event channel closed");
                    if self.state() != ConnectionState::Disconnected {
                        self.handle_event(SessionEvent::Closed);
                    }
                    self.events = None;
                }
                Step::KeepAlive => self.fire_keepalive().await,
            }
        }
    }

    /// One keep-alive firing: synthesize an inert input tick and send it.
    /// A failed send is a benign race with teardown; it is logged and
    /// ignored, and only lifecycle events stop the scheduler.
    async fn fire_keepalive(&mut self) {
        if self.state() != ConnectionState::Spawned {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            debug!("keep-alive fired without a session");
            return;
        };
        let tick = keepalive::synthesize_tick(self.runtime_id.unwrap_or(1));
        match session.send(OutboundMessage::PlayerInput(tick)).await {
            Ok(()) => debug!("sent keep-alive movement"),
            Err(err) => warn!(error = %err, "could not send keep-alive movement"),
        }
    }

    fn teardown(&mut self) {
        self.keepalive.disarm();
        self.session = None;
        self.runtime_id = None;
        self.set_state(ConnectionState::Disconnected);
    }
}
