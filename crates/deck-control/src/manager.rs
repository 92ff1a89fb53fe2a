//! Connection manager: owns the single OBS session.
//!
//! Reads (`is_connected`, `handle`, `status`) take a shared `parking_lot`
//! lock. `connect`/`disconnect` are serialized by an async gate and only hold
//! the write lock long enough to install or take the handle, so no remote I/O
//! ever happens under the state lock.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use deck_transport::{Connector, ObsEvent, ObsTransport, TransportError};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, instrument, warn};

use crate::config::ConnectionConfig;
use crate::errors::{ControlError, Result};

type ConnectCallback = Arc<dyn Fn() + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(ControlError) + Send + Sync>;

/// Snapshot of the connection for status endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    /// Whether a live session exists.
    pub connected: bool,
    /// Configured host.
    pub host: String,
    /// Configured port.
    pub port: u16,
    /// Whether the session was opened with a password.
    pub authenticated: bool,
    /// When the current session was established.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_since: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Session {
    transport: Option<Arc<dyn ObsTransport>>,
    /// Bumped on every successful connect so a stale watcher cannot clear a
    /// newer session.
    generation: u64,
    connected_since: Option<DateTime<Utc>>,
    authenticated: bool,
}

impl Session {
    fn live(&self) -> Option<&Arc<dyn ObsTransport>> {
        self.transport.as_ref().filter(|t| !t.is_closed())
    }

    fn take(&mut self) -> Option<Arc<dyn ObsTransport>> {
        self.connected_since = None;
        self.authenticated = false;
        self.transport.take()
    }
}

#[derive(Default)]
struct Observers {
    on_connect: Option<ConnectCallback>,
    on_error: Option<ErrorCallback>,
}

#[derive(Default)]
struct Shared {
    session: RwLock<Session>,
    observers: RwLock<Observers>,
}

impl Shared {
    fn notify_connect(&self) {
        if let Some(cb) = self.observers.read().on_connect.clone() {
            drop(tokio::spawn(async move { cb() }));
        }
    }

    fn notify_error(&self, err: ControlError) {
        if let Some(cb) = self.observers.read().on_error.clone() {
            drop(tokio::spawn(async move { cb(err) }));
        }
    }

    /// Clear the session if it still belongs to `generation`.
    fn connection_lost(&self, generation: u64, reason: &str) {
        let lost = {
            let mut session = self.session.write();
            if session.generation == generation && session.transport.is_some() {
                let _ = session.take();
                true
            } else {
                false
            }
        };
        if lost {
            warn!(%reason, "lost connection to OBS");
            self.notify_error(ControlError::transport(
                "stay connected to OBS",
                TransportError::Closed,
            ));
        }
    }
}

/// Owns the OBS session and hands out short-lived transport handles.
pub struct ConnectionManager {
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    gate: tokio::sync::Mutex<()>,
    shared: Arc<Shared>,
}

impl ConnectionManager {
    /// Create a disconnected manager.
    pub fn new(config: ConnectionConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            gate: tokio::sync::Mutex::new(()),
            shared: Arc::new(Shared::default()),
        }
    }

    /// The configuration this manager was built with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Open a session.
    ///
    /// Fails with [`ControlError::AlreadyConnected`] if one is live; the
    /// existing session is left alone.
    #[instrument(skip(self), fields(host = %self.config.host(), port = self.config.port()))]
    pub async fn connect(&self) -> Result<()> {
        let _gate = self.gate.lock().await;
        if self.shared.session.read().live().is_some() {
            return Err(ControlError::AlreadyConnected);
        }

        info!(authenticated = self.config.has_password(), "connecting to OBS");
        let opened = self
            .connector
            .connect(&self.config.connect_options())
            .await
            .and_then(|transport| {
                // Subscribe before installing so a close right after the
                // handshake is still observed.
                let events = transport.subscribe();
                if transport.is_closed() {
                    Err(TransportError::Closed)
                } else {
                    Ok((transport, events))
                }
            });

        let (transport, events) = match opened {
            Ok(opened) => opened,
            Err(source) => {
                let err = ControlError::transport(
                    format!("connect to OBS at {}:{}", self.config.host(), self.config.port()),
                    source,
                );
                warn!(error = %err, "connection failed");
                self.shared.notify_error(err.clone());
                return Err(err);
            }
        };

        let generation = {
            let mut session = self.shared.session.write();
            session.generation += 1;
            session.transport = Some(transport);
            session.connected_since = Some(Utc::now());
            session.authenticated = self.config.has_password();
            session.generation
        };
        drop(tokio::spawn(watch(Arc::downgrade(&self.shared), generation, events)));

        info!("connected to OBS");
        self.shared.notify_connect();
        Ok(())
    }

    /// Close the session. Succeeds when already disconnected.
    pub async fn disconnect(&self) -> Result<()> {
        let _gate = self.gate.lock().await;
        let transport = self.shared.session.write().take();
        match transport {
            Some(transport) => {
                transport.close().await;
                info!("disconnected from OBS");
            }
            None => debug!("disconnect requested while not connected"),
        }
        Ok(())
    }

    /// Whether a live session exists.
    pub fn is_connected(&self) -> bool {
        self.shared.session.read().live().is_some()
    }

    /// Live transport handle, if any. Use it for one operation and drop it.
    pub fn handle(&self) -> Option<Arc<dyn ObsTransport>> {
        self.shared.session.read().live().cloned()
    }

    /// Like [`handle`](Self::handle), but fails with `NotConnected`.
    pub fn require_handle(&self) -> Result<Arc<dyn ObsTransport>> {
        self.handle().ok_or(ControlError::NotConnected)
    }

    /// Current connection snapshot.
    pub fn status(&self) -> ConnectionStatus {
        let session = self.shared.session.read();
        let connected = session.live().is_some();
        ConnectionStatus {
            connected,
            host: self.config.host().to_owned(),
            port: self.config.port(),
            authenticated: connected && session.authenticated,
            connected_since: session.connected_since.filter(|_| connected),
        }
    }

    /// Subscribe to OBS events on the current session.
    pub fn subscribe_events(&self) -> Result<broadcast::Receiver<ObsEvent>> {
        Ok(self.require_handle()?.subscribe())
    }

    /// OBS version string, e.g. `30.1.2`.
    pub async fn get_version(&self) -> Result<String> {
        let obs = self.require_handle()?;
        obs.get_version()
            .await
            .map(|v| v.obs_version)
            .map_err(|e| ControlError::transport("get OBS version", e))
    }

    /// Advisory reconnect delay for callers that run their own retry loop.
    pub fn reconnect_interval(&self) -> Duration {
        self.config.reconnect_interval()
    }

    /// Advisory: whether the application should connect at startup.
    pub fn auto_connect(&self) -> bool {
        self.config.auto_connect()
    }

    /// Set the on-connect observer. Replaces any previous one.
    pub fn on_connect<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.observers.write().on_connect = Some(Arc::new(callback));
    }

    /// Set the on-error observer. Replaces any previous one.
    pub fn on_error<F>(&self, callback: F)
    where
        F: Fn(ControlError) + Send + Sync + 'static,
    {
        self.shared.observers.write().on_error = Some(Arc::new(callback));
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

/// Watch one session's events for the close notification.
async fn watch(shared: Weak<Shared>, generation: u64, mut events: broadcast::Receiver<ObsEvent>) {
    loop {
        match events.recv().await {
            Ok(ObsEvent::ConnectionClosed { reason }) => {
                if let Some(shared) = shared.upgrade() {
                    shared.connection_lost(generation, &reason);
                }
                return;
            }
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return,
        }
    }
}
