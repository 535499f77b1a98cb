use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Control documents
// ---------------------------------------------------------------------------

/// Control step named by a control document's `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    UploadStart,
    UploadFinalize,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::UploadStart => "upload_start",
            Action::UploadFinalize => "upload_finalize",
        })
    }
}

/// Overwrite policy value carried in `force`.
///
/// The field is omitted entirely when the caller does not want to replace
/// an existing file; the device refuses collisions by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    Overwrite,
}

/// Announces an upload and describes its destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStart {
    pub request_id: u64,
    pub size: u64,
    /// Target directory, base64-encoded (see [`encode_dirname`]).
    pub dirname: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<ForceMode>,
}

/// Closes an upload once the payload was acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFinalize {
    pub request_id: u64,
}

/// A control document sent as one text frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ControlMessage {
    UploadStart(UploadStart),
    UploadFinalize(UploadFinalize),
}

impl ControlMessage {
    /// Builds the `upload_start` document.
    ///
    /// `force` is set only when `overwrite` is requested.
    pub fn upload_start(
        request_id: u64,
        size: u64,
        target_dir: &str,
        filename: impl Into<String>,
        overwrite: bool,
    ) -> Self {
        ControlMessage::UploadStart(UploadStart {
            request_id,
            size,
            dirname: encode_dirname(target_dir.as_bytes()),
            filename: filename.into(),
            force: overwrite.then_some(ForceMode::Overwrite),
        })
    }

    /// Builds the `upload_finalize` document.
    pub fn upload_finalize(request_id: u64) -> Self {
        ControlMessage::UploadFinalize(UploadFinalize { request_id })
    }

    /// The document's `action`.
    pub fn action(&self) -> Action {
        match self {
            ControlMessage::UploadStart(_) => Action::UploadStart,
            ControlMessage::UploadFinalize(_) => Action::UploadFinalize,
        }
    }

    /// The correlation id carried by the document.
    pub fn request_id(&self) -> u64 {
        match self {
            ControlMessage::UploadStart(m) => m.request_id,
            ControlMessage::UploadFinalize(m) => m.request_id,
        }
    }

    /// Serializes the document to JSON text.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Encodes a directory path for the text wire format.
///
/// Paths on the device may hold arbitrary bytes, so they travel as
/// standard padded base64.
pub fn encode_dirname(dir: &[u8]) -> String {
    use base64::{Engine, engine::general_purpose::STANDARD};
    STANDARD.encode(dir)
}

/// Decodes a `dirname` field back into a UTF-8 path.
pub fn decode_dirname(encoded: &str) -> Result<String, ProtocolError> {
    use base64::{Engine, engine::general_purpose::STANDARD};
    let bytes = STANDARD.decode(encoded)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_start_field_layout() {
        let msg = ControlMessage::upload_start(42, 10_000, "/Disque dur/Vidéos", "a.mkv", false);
        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value["action"], "upload_start");
        assert_eq!(value["request_id"], 42);
        assert_eq!(value["size"], 10_000);
        assert_eq!(value["filename"], "a.mkv");
        assert_eq!(
            decode_dirname(value["dirname"].as_str().unwrap()).unwrap(),
            "/Disque dur/Vidéos"
        );
    }

    #[test]
    fn force_present_only_when_overwriting() {
        let with = ControlMessage::upload_start(1, 0, "/d", "f", true).to_json().unwrap();
        let without = ControlMessage::upload_start(1, 0, "/d", "f", false).to_json().unwrap();
        assert!(with.contains(r#""force":"overwrite""#));
        assert!(!without.contains("force"));
    }

    #[test]
    fn finalize_carries_only_action_and_id() {
        let value: serde_json::Value =
            serde_json::to_value(ControlMessage::upload_finalize(7)).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["action"], "upload_finalize");
        assert_eq!(obj["request_id"], 7);
    }

    #[test]
    fn dirname_known_vector() {
        // "/PauguySSD/Enregistrements"
        assert_eq!(
            encode_dirname(b"/PauguySSD/Enregistrements"),
            "L1BhdWd1eVNTRC9FbnJlZ2lzdHJlbWVudHM="
        );
    }

    #[test]
    fn dirname_rejects_garbage() {
        assert!(decode_dirname("***").is_err());
    }

    #[test]
    fn parse_dispatches_on_action() {
        let msg = ControlMessage::from_json(r#"{"action":"upload_finalize","request_id":3}"#)
            .unwrap();
        assert_eq!(msg.action(), Action::UploadFinalize);
        assert_eq!(msg.request_id(), 3);
    }

    #[test]
    fn parse_rejects_unknown_action() {
        assert!(ControlMessage::from_json(r#"{"action":"upload_cancel","request_id":3}"#).is_err());
    }

    #[test]
    fn action_display_matches_wire() {
        assert_eq!(Action::UploadStart.to_string(), "upload_start");
        assert_eq!(
            serde_json::to_string(&Action::UploadFinalize).unwrap(),
            r#""upload_finalize""#
        );
    }
}
