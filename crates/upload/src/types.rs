//! Public types for upload requests, progress, and results.

use std::path::PathBuf;

use fbx_upload_protocol::constants::DEFAULT_CHUNK_SIZE;
use fbx_upload_transfer::{SourceInfo, inspect_source, validate_chunk_size};

use crate::error::UploadError;

/// One of the three protocol phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Handshake,
    Streaming,
    Finalization,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Phase::Handshake => "handshake",
            Phase::Streaming => "streaming",
            Phase::Finalization => "finalization",
        })
    }
}

/// Lifecycle of an [`UploadSession`](crate::UploadSession).
///
/// Transitions only move forward; `Failed` is reachable from every
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Handshaking,
    Streaming,
    Finalizing,
    Succeeded,
    Failed,
}

impl SessionState {
    /// The phase being run in this state, if any.
    pub fn phase(self) -> Option<Phase> {
        match self {
            SessionState::Handshaking => Some(Phase::Handshake),
            SessionState::Streaming => Some(Phase::Streaming),
            SessionState::Finalizing => Some(Phase::Finalization),
            SessionState::Idle | SessionState::Succeeded | SessionState::Failed => None,
        }
    }
}

/// Session credential sent in the auth header when the socket opens.
///
/// The value is opaque to this crate and never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the auth header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Everything the caller decides about one upload.
///
/// The target base name is not part of the request: it is always the
/// source's own file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Local file to upload.
    pub source: PathBuf,
    /// Destination directory on the device.
    pub target_dir: String,
    /// Maximum payload frame size in bytes.
    pub chunk_size: usize,
    /// Replace an existing file of the same name.
    pub overwrite: bool,
    /// Caller-chosen correlation id, echoed in every control document.
    pub request_id: u64,
}

impl UploadRequest {
    /// Creates a request with the defaults: 4 KiB chunks, overwrite on,
    /// request id 1.
    pub fn new(source: impl Into<PathBuf>, target_dir: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target_dir: target_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            overwrite: true,
            request_id: 1,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_request_id(mut self, request_id: u64) -> Self {
        self.request_id = request_id;
        self
    }

    /// Checks the preconditions and inspects the source file.
    ///
    /// Performs no network activity.
    pub async fn validate(&self) -> Result<SourceInfo, UploadError> {
        validate_chunk_size(self.chunk_size)
            .map_err(|e| UploadError::Precondition(e.to_string()))?;
        if self.target_dir.is_empty() {
            return Err(UploadError::Precondition("empty target directory".into()));
        }
        inspect_source(&self.source)
            .await
            .map_err(UploadError::InvalidSource)
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub request_id: u64,
    pub filename: String,
    pub bytes_sent: u64,
    pub frames: u64,
    /// Hex SHA-256 of the streamed payload.
    pub sha256: String,
}

/// Progress notifications emitted while a session runs.
#[derive(Debug, Clone)]
pub enum UploadEvent {
    /// A phase began.
    PhaseStarted { request_id: u64, phase: Phase },
    /// A payload frame was sent.
    Progress {
        request_id: u64,
        sent: u64,
        total: u64,
    },
    /// All three phases were acknowledged.
    Finished(UploadReport),
    /// The session aborted.
    Failed {
        request_id: u64,
        phase: Option<Phase>,
        error: String,
    },
}
