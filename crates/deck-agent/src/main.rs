//! # obs-deck
//!
//! Agent binary: loads settings, connects to OBS, and keeps the connection
//! until Ctrl-C. With `--test` it prints a read-only summary of OBS and exits.

#![deny(unsafe_code)]

mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deck_control::{ConnectionConfig, ConnectionManager};
use deck_core::logging::{init_subscriber, with_startup_logging};
use deck_settings::DeckSettings;
use deck_transport::{ObsEvent, WsConnector};
use tokio::sync::broadcast::error::RecvError;

/// obs-deck agent.
#[derive(Parser, Debug)]
#[command(name = "obs-deck", version, about = "Remote control for OBS Studio")]
struct Cli {
    /// obs-websocket host (overrides settings).
    #[arg(long, env = "OBS_HOST")]
    obs_host: Option<String>,

    /// obs-websocket port (overrides settings).
    #[arg(long, env = "OBS_PORT")]
    obs_port: Option<u16>,

    /// obs-websocket password (overrides settings).
    #[arg(long, env = "OBS_PASSWORD", hide_env_values = true)]
    obs_password: Option<String>,

    /// Log level or `EnvFilter` directive (overrides settings).
    #[arg(long)]
    log_level: Option<String>,

    /// Settings file (default `~/.obs-deck/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Connect, print what OBS reports, and exit.
    #[arg(long)]
    test: bool,
}

impl Cli {
    fn settings_path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(deck_settings::settings_path)
    }

    /// Apply command-line flags over loaded settings.
    fn apply(&self, settings: &mut DeckSettings) {
        if let Some(ref host) = self.obs_host {
            settings.obs.host.clone_from(host);
        }
        if let Some(port) = self.obs_port {
            settings.obs.port = port;
        }
        if let Some(ref password) = self.obs_password {
            settings.obs.password = Some(password.clone());
        }
        if let Some(ref level) = self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

fn load_settings(cli: &Cli) -> Result<DeckSettings> {
    let path = cli.settings_path();
    let mut settings = deck_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    cli.apply(&mut settings);
    settings.validate().context("Invalid command-line override")?;
    Ok(settings)
}

/// Log program scene changes until the session ends.
async fn log_scene_changes(manager: &ConnectionManager) -> Result<()> {
    let mut events = manager.subscribe_events()?;
    drop(tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ObsEvent::CurrentProgramSceneChanged { scene_name }) => {
                    tracing::info!(scene = %scene_name, "program scene changed");
                }
                Ok(ObsEvent::ConnectionClosed { .. }) | Err(RecvError::Closed) => break,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
            }
        }
    }));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = with_startup_logging(std::io::stderr, || load_settings(&cli))?;
    init_subscriber(&settings.logging.level, settings.logging.format);

    let config = ConnectionConfig::from_settings(&settings.obs);
    tracing::info!(
        version = deck_core::constants::VERSION,
        host = %config.host(),
        port = config.port(),
        "obs-deck starting"
    );

    let manager = Arc::new(ConnectionManager::new(config, Arc::new(WsConnector)));
    manager.on_connect(|| tracing::info!("OBS connection established"));
    manager.on_error(|err| tracing::error!(code = err.code(), error = %err, "OBS connection error"));

    if cli.test {
        return summary::run(&manager).await;
    }

    if manager.auto_connect() {
        manager.connect().await.context("Failed to connect to OBS")?;
        let version = manager.get_version().await?;
        tracing::info!(obs_version = %version, "connected to OBS");
        log_scene_changes(&manager).await?;
    } else {
        tracing::info!("auto-connect disabled, not connecting to OBS");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    manager.disconnect().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
