//! WebSocket file upload client for the storage device.
//!
//! One upload owns one socket and walks it through three phases:
//!
//! 1. **Handshake** — `upload_start` describing the destination, then one
//!    acknowledgment. A rejection here aborts before any payload is sent.
//! 2. **Streaming** — the file as paced binary frames, then one
//!    acknowledgment for the whole payload.
//! 3. **Finalization** — `upload_finalize`, then one acknowledgment.
//!
//! [`Uploader`] opens the authenticated socket and runs an
//! [`UploadSession`] over it. The session is generic over [`Channel`] so
//! the state machine can be driven by any transport.

pub mod channel;
pub mod config;
pub mod error;
pub mod session;
mod tls;
pub mod types;
pub mod uploader;
pub mod ws_channel;

pub use channel::Channel;
pub use config::{ConfigError, TlsPolicy, UploadConfig, ZeroLengthAck};
pub use error::UploadError;
pub use fbx_upload_transfer::{SourceInfo, TransferError};
pub use session::{SessionOptions, UploadSession};
pub use types::{Phase, SessionState, SessionToken, UploadEvent, UploadReport, UploadRequest};
pub use uploader::Uploader;
pub use ws_channel::WsChannel;
