//! Upload error types.

use tokio_tungstenite::tungstenite;

use crate::config::ConfigError;
use crate::types::Phase;

/// Errors produced while running an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("WebSocket error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("connection closed")]
    Closed,

    #[error(
        "{phase} rejected by server{}",
        .msg.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
    )]
    Rejected { phase: Phase, msg: Option<String> },

    #[error("malformed {phase} response: {reason}")]
    Malformed { phase: Phase, reason: String },

    #[error("invalid request: {0}")]
    Precondition(String),

    #[error("invalid source: {0}")]
    InvalidSource(#[source] fbx_upload_transfer::TransferError),

    #[error("transfer error: {0}")]
    Transfer(#[from] fbx_upload_transfer::TransferError),

    #[error("protocol error: {0}")]
    Protocol(#[from] fbx_upload_protocol::ProtocolError),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{phase} acknowledgment timed out")]
    Timeout { phase: Phase },

    #[error("cancelled")]
    Cancelled,

    /// A failure with no phase of its own, raised while `phase` was running.
    #[error("{phase} failed: {source}")]
    InPhase {
        phase: Phase,
        #[source]
        source: Box<UploadError>,
    },
}

impl UploadError {
    /// Phase the error is attributed to, when it belongs to one.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            UploadError::Rejected { phase, .. }
            | UploadError::Malformed { phase, .. }
            | UploadError::Timeout { phase }
            | UploadError::InPhase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Attributes a phase-less error to `phase`. Errors that already name
    /// a phase, and cancellation, are returned unchanged.
    pub(crate) fn within(self, phase: Phase) -> Self {
        match self {
            UploadError::Cancelled => self,
            e if e.phase().is_some() => e,
            e => UploadError::InPhase {
                phase,
                source: Box::new(e),
            },
        }
    }

    /// The underlying error, looking through phase attribution.
    pub fn root(&self) -> &UploadError {
        match self {
            UploadError::InPhase { source, .. } => source.root(),
            e => e,
        }
    }

    /// Returns `true` for failures of the transport itself, including
    /// responses that could not be understood.
    pub fn is_transport(&self) -> bool {
        matches!(
            self.root(),
            UploadError::Transport(_) | UploadError::Closed | UploadError::Malformed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_error_display() {
        let err = UploadError::Closed;
        assert_eq!(err.to_string(), "connection closed");

        let err = UploadError::Rejected {
            phase: Phase::Handshake,
            msg: Some("exists".into()),
        };
        assert_eq!(err.to_string(), "handshake rejected by server: exists");

        let err = UploadError::Rejected {
            phase: Phase::Finalization,
            msg: None,
        };
        assert_eq!(err.to_string(), "finalization rejected by server");

        let err = UploadError::Timeout {
            phase: Phase::Streaming,
        };
        assert_eq!(err.to_string(), "streaming acknowledgment timed out");
    }

    #[test]
    fn phase_attribution() {
        let err = UploadError::Malformed {
            phase: Phase::Streaming,
            reason: "bad".into(),
        };
        assert_eq!(err.phase(), Some(Phase::Streaming));
        assert!(err.is_transport());
        assert_eq!(UploadError::Cancelled.phase(), None);
        assert!(!UploadError::Cancelled.is_transport());
    }

    #[test]
    fn within_attributes_phase_less_errors() {
        let err = UploadError::Closed.within(Phase::Streaming);
        assert_eq!(err.phase(), Some(Phase::Streaming));
        assert!(matches!(err.root(), UploadError::Closed));
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "streaming failed: connection closed");

        let err = UploadError::Timeout {
            phase: Phase::Handshake,
        }
        .within(Phase::Streaming);
        assert_eq!(err.phase(), Some(Phase::Handshake));

        let err = UploadError::Cancelled.within(Phase::Finalization);
        assert!(matches!(err, UploadError::Cancelled));
    }
}
