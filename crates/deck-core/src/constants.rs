//! Package-level constants.

/// Current version of obs-deck (sourced from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name.
pub const NAME: &str = "obs-deck";

/// Default obs-websocket host.
pub const DEFAULT_OBS_HOST: &str = "localhost";

/// Default obs-websocket port (obs-websocket 5.x).
pub const DEFAULT_OBS_PORT: u16 = 4455;

/// Default reconnect hint in milliseconds.
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 5_000;

/// Lowest input volume OBS accepts, in decibels.
pub const MIN_VOLUME_DB: f64 = -100.0;

/// Highest input volume OBS accepts, in decibels.
pub const MAX_VOLUME_DB: f64 = 26.0;
