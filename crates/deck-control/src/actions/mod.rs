//! Action dispatchers.
//!
//! Each dispatcher is a stateless façade over the shared
//! [`ConnectionManager`](crate::ConnectionManager). Every method checks the
//! connection first, then validates parameters, then makes its remote calls
//! on a snapshot of the transport handle.

mod scene;
mod source;
mod stream;

use std::future::Future;

use deck_core::constants::{MAX_VOLUME_DB, MIN_VOLUME_DB};
use deck_transport::TransportError;
use tracing::{info, warn};

use crate::errors::{ControlError, Result};

pub use scene::SceneActions;
pub use source::SourceActions;
pub use stream::StreamActions;

/// Run a state-changing remote call, logging attempt and outcome.
async fn change<T>(
    operation: String,
    call: impl Future<Output = std::result::Result<T, TransportError>>,
) -> Result<T> {
    info!(%operation, "requesting change");
    match call.await {
        Ok(value) => {
            info!(%operation, "change applied");
            Ok(value)
        }
        Err(e) => {
            warn!(%operation, error = %e, "change failed");
            Err(ControlError::transport(operation, e))
        }
    }
}

/// Run a read-only remote call. Only failures are logged.
async fn query<T>(
    operation: impl Into<String>,
    call: impl Future<Output = std::result::Result<T, TransportError>>,
) -> Result<T> {
    call.await.map_err(|e| {
        let err = ControlError::transport(operation, e);
        warn!(error = %err, "query failed");
        err
    })
}

// ── Validation ──────────────────────────────────────────────────────

fn require_name(operation: &str, what: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ControlError::invalid(operation, format!("{what} must not be empty")));
    }
    Ok(())
}

fn require_volume(operation: &str, volume_db: f64) -> Result<()> {
    if !volume_db.is_finite() || !(MIN_VOLUME_DB..=MAX_VOLUME_DB).contains(&volume_db) {
        return Err(ControlError::invalid(
            operation,
            format!("volume {volume_db} dB is outside {MIN_VOLUME_DB}..={MAX_VOLUME_DB} dB"),
        ));
    }
    Ok(())
}

fn require_item_id(operation: &str, scene_item_id: i64) -> Result<()> {
    if scene_item_id < 0 {
        return Err(ControlError::invalid(
            operation,
            format!("scene item id {scene_item_id} is negative"),
        ));
    }
    Ok(())
}
