//! Control-layer error codes and error type.

use deck_core::messages::ErrorPayload;
use deck_transport::TransportError;

// ── Error code constants ────────────────────────────────────────────

/// No OBS session.
pub const NOT_CONNECTED: &str = "NOT_CONNECTED";
/// `connect` while a session exists.
pub const ALREADY_CONNECTED: &str = "ALREADY_CONNECTED";
/// Rejected before any remote call.
pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
/// OBS or the socket failed the call.
pub const TRANSPORT_FAILURE: &str = "TRANSPORT_FAILURE";

/// Errors returned by the connection manager and the action dispatchers.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ControlError {
    /// No session is established.
    #[error("not connected to OBS")]
    NotConnected,

    /// A session is already established.
    #[error("already connected to OBS")]
    AlreadyConnected,

    /// A parameter failed validation.
    #[error("invalid parameter for {operation}: {reason}")]
    InvalidParameter {
        /// Operation that was attempted.
        operation: String,
        /// What is wrong.
        reason: String,
    },

    /// The remote call failed.
    #[error("failed to {operation}: {source}")]
    TransportFailure {
        /// Operation and target, e.g. `set volume for input "Mic/Aux"`.
        operation: String,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

/// Result type for control operations.
pub type Result<T> = std::result::Result<T, ControlError>;

impl ControlError {
    /// Build an [`ControlError::InvalidParameter`].
    pub fn invalid(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`ControlError::TransportFailure`].
    pub fn transport(operation: impl Into<String>, source: TransportError) -> Self {
        Self::TransportFailure {
            operation: operation.into(),
            source,
        }
    }

    /// Machine-readable error code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConnected => NOT_CONNECTED,
            Self::AlreadyConnected => ALREADY_CONNECTED,
            Self::InvalidParameter { .. } => INVALID_PARAMETER,
            Self::TransportFailure { .. } => TRANSPORT_FAILURE,
        }
    }

    /// Convert to the front-end error payload.
    pub fn to_error_payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_owned(),
            message: self.to_string(),
            details: match self {
                Self::TransportFailure { source, .. } => Some(source.peer_message()),
                _ => None,
            },
        }
    }
}
