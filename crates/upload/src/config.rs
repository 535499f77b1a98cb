//! Upload client configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! host = "mafreebox.freebox.fr"
//! api_version = "latest"
//! frame_delay_ms = 10
//! tls = "accept_any"
//! zero_length_ack = "await"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fbx_upload_protocol::constants::{
    DEFAULT_API_VERSION, DEFAULT_FRAME_DELAY, DEFAULT_HOST, DEFAULT_SCHEME, WS_MAX_MESSAGE_SIZE,
    upload_path,
};

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Server identity checking on `wss` connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    /// Accept any certificate. The device presents a certificate that
    /// public roots do not vouch for; this keeps it reachable at the cost
    /// of allowing man-in-the-middle tampering on untrusted networks.
    #[default]
    AcceptAny,
    /// Verify the server against the bundled web PKI roots.
    Verify,
}

/// Whether to wait for the post-streaming acknowledgment when the source
/// is empty and no payload frame was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroLengthAck {
    /// Always wait for exactly one acknowledgment after streaming.
    #[default]
    Await,
    /// Go straight to finalization.
    Skip,
}

/// Connection and pacing settings for the upload client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// `wss`, or `ws` for plain-text test servers.
    pub scheme: String,
    /// Device host, optionally with `:port`.
    pub host: String,
    /// API version path segment.
    pub api_version: String,
    /// Pause between payload frames, in milliseconds.
    pub frame_delay_ms: u64,
    /// Per-acknowledgment deadline in seconds. Unset waits forever.
    pub ack_timeout_secs: Option<u64>,
    pub tls: TlsPolicy,
    pub zero_length_ack: ZeroLengthAck,
    /// Largest WebSocket message accepted from the device.
    pub max_message_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.into(),
            host: DEFAULT_HOST.into(),
            api_version: DEFAULT_API_VERSION.into(),
            frame_delay_ms: DEFAULT_FRAME_DELAY.as_millis() as u64,
            ack_timeout_secs: None,
            tls: TlsPolicy::default(),
            zero_length_ack: ZeroLengthAck::default(),
            max_message_size: WS_MAX_MESSAGE_SIZE,
        }
    }
}

impl UploadConfig {
    /// Loads and validates a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: UploadConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that cannot produce a usable endpoint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheme != "ws" && self.scheme != "wss" {
            return Err(ConfigError::Invalid(format!(
                "unsupported scheme: {}",
                self.scheme
            )));
        }
        if self.host.is_empty() {
            return Err(ConfigError::Invalid("empty host".into()));
        }
        if self.api_version.is_empty() || self.api_version.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "bad api version: {:?}",
                self.api_version
            )));
        }
        if self.max_message_size == 0 {
            return Err(ConfigError::Invalid("max_message_size must be > 0".into()));
        }
        Ok(())
    }

    /// Full URL of the upload socket.
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}{}",
            self.scheme,
            self.host,
            upload_path(&self.api_version)
        )
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }

    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_secs.map(Duration::from_secs)
    }
}
