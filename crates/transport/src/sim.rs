//! Simulated in-process protocol backend.
//!
//! Stands in for a wire-level implementation: it walks a session through the
//! connect → spawn lifecycle on a timer, accepts outbound messages, and
//! answers probes with canned metadata. The shipped binary runs against it so
//! the whole lifecycle is exercisable without a server, and tests use it to
//! drive end-to-end scenarios.

use crate::{
    OutboundMessage, ProbeError, Protocol, ServerMetadata, SessionConfig, SessionError,
    SessionEvent, SessionHandle,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info};

/// Backend that simulates a cooperative server.
pub struct SimProtocol {
    /// Delay before the session reports `Connected`.
    pub connect_delay: Duration,
    /// Additional delay before the session reports `Spawned`.
    pub spawn_delay: Duration,
    /// Server name reported by probes.
    pub server_name: String,
}

impl Default for SimProtocol {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_millis(200),
            spawn_delay: Duration::from_millis(500),
            server_name: "Simulated Bedrock Server".to_string(),
        }
    }
}

#[async_trait]
impl Protocol for SimProtocol {
    async fn create_session(
        &self,
        config: &SessionConfig,
    ) -> Result<(Box<dyn SessionHandle>, mpsc::Receiver<SessionEvent>), SessionError> {
        let (events, rx) = mpsc::channel(32);
        info!(
            host = %config.host,
            port = config.port,
            username = %config.username,
            "sim backend opening session"
        );

        let connect_delay = self.connect_delay;
        let spawn_delay = self.spawn_delay;
        let script = events.clone();
        tokio::spawn(async move {
            sleep(connect_delay).await;
            if script.send(SessionEvent::Connected).await.is_err() {
                return;
            }
            sleep(spawn_delay).await;
            let _ = script
                .send(SessionEvent::Spawned { runtime_id: Some(1) })
                .await;
        });

        let session = SimSession {
            events,
            closed: AtomicBool::new(false),
            username: config.username.clone(),
        };
        Ok((Box::new(session), rx))
    }

    async fn probe(&self, host: &str, port: u16) -> Result<ServerMetadata, ProbeError> {
        debug!(%host, port, "sim backend probe");
        Ok(ServerMetadata {
            name: self.server_name.clone(),
            version: "1.21.100".to_string(),
            players_online: 0,
            players_max: 10,
            protocol_id: 819,
        })
    }
}

struct SimSession {
    events: mpsc::Sender<SessionEvent>,
    closed: AtomicBool,
    username: String,
}

#[async_trait]
impl SessionHandle for SimSession {
    async fn send(&self, message: OutboundMessage) -> Result<(), SessionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }
        debug!(username = %self.username, ?message, "sim transport accepted outbound message");
        Ok(())
    }

    async fn close(&self, reason: &str) -> Result<(), SessionError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(%reason, "sim session closing");
        let _ = self.events.send(SessionEvent::Closed).await;
        Ok(())
    }
}
