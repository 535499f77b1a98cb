use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// One discrete message on the upload socket.
///
/// The device tells control documents and payload apart by frame type
/// alone; binary frames carry no envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A JSON control document or acknowledgment.
    Text(String),
    /// A slice of raw payload bytes.
    Binary(Vec<u8>),
}

impl Frame {
    /// Short name of the frame kind, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Text(_) => "text",
            Frame::Binary(_) => "binary",
        }
    }

    /// Number of bytes carried by the frame.
    pub fn byte_len(&self) -> usize {
        match self {
            Frame::Text(t) => t.len(),
            Frame::Binary(b) => b.len(),
        }
    }
}

/// Response the device sends after every control step.
///
/// A missing `success` field deserializes to `false`: anything short of
/// an explicit confirmation is a failure. Extra fields the device adds
/// (error codes, echoed ids) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Acknowledgment {
    /// A positive acknowledgment.
    pub fn ok() -> Self {
        Self {
            success: true,
            msg: None,
        }
    }

    /// A negative acknowledgment carrying a server message.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            msg: Some(msg.into()),
        }
    }

    /// Parses an acknowledgment from a text frame payload.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the acknowledgment to JSON text.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
