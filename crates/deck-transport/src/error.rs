//! Transport error types.

use thiserror::Error;

/// Errors from talking to obs-websocket.
///
/// `Clone` so one failure can be both returned to the caller and handed to
/// an error observer.
#[derive(Clone, Debug, Error)]
pub enum TransportError {
    /// The socket could not be opened or the handshake did not complete.
    #[error("failed to connect to {url}: {reason}")]
    Connect {
        /// Endpoint we tried.
        url: String,
        /// Why it failed.
        reason: String,
    },

    /// OBS rejected (or required) a password.
    #[error("authentication failed: {reason}")]
    Authentication {
        /// Why it failed.
        reason: String,
    },

    /// OBS answered a request with a failure status.
    #[error("{request_type} failed with code {code}: {comment}")]
    Request {
        /// Request that failed (e.g. `SetCurrentProgramScene`).
        request_type: String,
        /// obs-websocket status code.
        code: u16,
        /// OBS's explanation, verbatim.
        comment: String,
    },

    /// No response within the deadline.
    #[error("timed out after {timeout_ms}ms: {context}")]
    Timeout {
        /// How long we waited.
        timeout_ms: u64,
        /// What we were waiting for.
        context: String,
    },

    /// The connection is gone.
    #[error("connection closed")]
    Closed,

    /// OBS sent something we could not make sense of.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// JSON encoding or decoding failed.
    #[error("invalid JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl TransportError {
    /// The peer's own text for request failures, otherwise the display text.
    pub fn peer_message(&self) -> String {
        match self {
            Self::Request { comment, .. } if !comment.is_empty() => comment.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_keeps_peer_text() {
        let err = TransportError::Request {
            request_type: "SetCurrentProgramScene".into(),
            code: 600,
            comment: "No source was found by the name of `Gameplay`.".into(),
        };
        assert_eq!(
            err.to_string(),
            "SetCurrentProgramScene failed with code 600: No source was found by the name of `Gameplay`."
        );
        assert_eq!(err.peer_message(), "No source was found by the name of `Gameplay`.");
    }

    #[test]
    fn empty_comment_falls_back_to_display() {
        let err = TransportError::Request {
            request_type: "StartStream".into(),
            code: 500,
            comment: String::new(),
        };
        assert_eq!(err.peer_message(), "StartStream failed with code 500: ");
    }

    #[test]
    fn timeout_display() {
        let err = TransportError::Timeout {
            timeout_ms: 30_000,
            context: "GetSceneList".into(),
        };
        assert_eq!(err.to_string(), "timed out after 30000ms: GetSceneList");
    }
}
