//! Connection configuration.

use std::time::Duration;

use deck_core::constants::{DEFAULT_OBS_HOST, DEFAULT_OBS_PORT, DEFAULT_RECONNECT_INTERVAL_MS};
use deck_settings::ObsSettings;
use deck_transport::ConnectOptions;

/// Where the manager connects. Fixed once built.
///
/// A zero reconnect interval becomes the default (5s) and an empty password
/// means "no password".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    password: Option<String>,
    auto_connect: bool,
    reconnect_interval: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OBS_HOST, DEFAULT_OBS_PORT)
    }
}

impl ConnectionConfig {
    /// Config for `host:port` with no password.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            password: None,
            auto_connect: true,
            reconnect_interval: Duration::from_millis(DEFAULT_RECONNECT_INTERVAL_MS),
        }
    }

    /// Build from loaded settings.
    pub fn from_settings(settings: &ObsSettings) -> Self {
        Self::new(settings.host.clone(), settings.port)
            .with_password(settings.password.clone().unwrap_or_default())
            .with_auto_connect(settings.auto_connect)
            .with_reconnect_interval(Duration::from_millis(settings.reconnect_interval_ms))
    }

    /// Set the password. Empty means none.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password = (!password.is_empty()).then_some(password);
        self
    }

    /// Set the advisory auto-connect flag.
    #[must_use]
    pub fn with_auto_connect(mut self, auto_connect: bool) -> Self {
        self.auto_connect = auto_connect;
        self
    }

    /// Set the advisory reconnect interval. Zero means the default.
    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = if interval.is_zero() {
            Duration::from_millis(DEFAULT_RECONNECT_INTERVAL_MS)
        } else {
            interval
        };
        self
    }

    /// obs-websocket host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// obs-websocket port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether a password is configured.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Advisory: the embedding application should connect at startup.
    pub fn auto_connect(&self) -> bool {
        self.auto_connect
    }

    /// Advisory: delay the embedding application should wait between attempts.
    pub fn reconnect_interval(&self) -> Duration {
        self.reconnect_interval
    }

    /// Transport options for this config.
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions::new(self.host.clone(), self.port, self.password.clone())
    }
}
