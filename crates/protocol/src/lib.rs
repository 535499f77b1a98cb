//! Wire protocol types for the device's WebSocket upload endpoint.
//!
//! An upload is a strict request/acknowledgment exchange over one socket:
//! JSON control documents travel as text frames, the payload travels as
//! raw binary frames, and every control step is answered by exactly one
//! [`Acknowledgment`].

pub mod constants;
pub mod envelope;
pub mod messages;

pub use envelope::{Acknowledgment, Frame};
pub use messages::{Action, ControlMessage, ForceMode, UploadFinalize, UploadStart};

/// Errors produced while encoding or decoding wire documents.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("dirname is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
