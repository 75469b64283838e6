//! Channel-backed test doubles for the protocol boundary.

use afkbot_transport::{
    AuthMode, OutboundMessage, ProbeError, Protocol, ServerMetadata, SessionConfig, SessionError,
    SessionEvent, SessionHandle,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub fn session_config() -> SessionConfig {
    SessionConfig {
        host: "localhost".to_string(),
        port: 19132,
        username: "AFKBot".to_string(),
        auth: AuthMode::Offline,
        version: "1.21.100".to_string(),
    }
}

/// Session double that records sends and counts close requests.
pub struct ScriptedSession {
    sent: mpsc::UnboundedSender<OutboundMessage>,
    close_calls: Arc<AtomicUsize>,
    fail_sends: Arc<AtomicBool>,
}

#[async_trait]
impl SessionHandle for ScriptedSession {
    async fn send(&self, message: OutboundMessage) -> Result<(), SessionError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(SessionError::Transport("scripted send failure".to_string()));
        }
        self.sent.send(message).ok();
        Ok(())
    }

    async fn close(&self, _reason: &str) -> Result<(), SessionError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Observation side of one scripted session: inject lifecycle events, watch
/// what got sent, count close requests, toggle send failures.
pub struct ScriptedHarness {
    pub events: mpsc::Sender<SessionEvent>,
    pub sent: mpsc::UnboundedReceiver<OutboundMessage>,
    pub close_calls: Arc<AtomicUsize>,
    pub fail_sends: Arc<AtomicBool>,
}

/// Protocol double that hands out at most one prepared scripted session.
pub struct ScriptedProtocol {
    prepared: Mutex<Option<(Box<dyn SessionHandle>, mpsc::Receiver<SessionEvent>)>>,
    pub create_calls: AtomicUsize,
    fail_probe: bool,
    fail_create: bool,
}

impl ScriptedProtocol {
    pub fn with_session() -> (Arc<Self>, ScriptedHarness) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let close_calls = Arc::new(AtomicUsize::new(0));
        let fail_sends = Arc::new(AtomicBool::new(false));
        let session = ScriptedSession {
            sent: sent_tx,
            close_calls: close_calls.clone(),
            fail_sends: fail_sends.clone(),
        };
        let protocol = Arc::new(Self {
            prepared: Mutex::new(Some((Box::new(session) as Box<dyn SessionHandle>, event_rx))),
            create_calls: AtomicUsize::new(0),
            fail_probe: false,
            fail_create: false,
        });
        let harness = ScriptedHarness {
            events: event_tx,
            sent: sent_rx,
            close_calls,
            fail_sends,
        };
        (protocol, harness)
    }

    /// Probe succeeds but every session construction is refused.
    pub fn refusing_connections() -> Arc<Self> {
        Arc::new(Self {
            prepared: Mutex::new(None),
            create_calls: AtomicUsize::new(0),
            fail_probe: false,
            fail_create: true,
        })
    }

    /// Every probe fails as unreachable.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            prepared: Mutex::new(None),
            create_calls: AtomicUsize::new(0),
            fail_probe: true,
            fail_create: true,
        })
    }
}

#[async_trait]
impl Protocol for ScriptedProtocol {
    async fn create_session(
        &self,
        _config: &SessionConfig,
    ) -> Result<(Box<dyn SessionHandle>, mpsc::Receiver<SessionEvent>), SessionError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(SessionError::Construction("scripted refusal".to_string()));
        }
        self.prepared
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| SessionError::Construction("session already taken".to_string()))
    }

    async fn probe(&self, host: &str, port: u16) -> Result<ServerMetadata, ProbeError> {
        if self.fail_probe {
            return Err(ProbeError::Unreachable(
                format!("{host}:{port}"),
                "scripted outage".to_string(),
            ));
        }
        Ok(ServerMetadata {
            name: "Scripted Server".to_string(),
            version: "1.21.100".to_string(),
            players_online: 1,
            players_max: 8,
            protocol_id: 819,
        })
    }
}
