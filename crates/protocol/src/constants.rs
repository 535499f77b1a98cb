//! Endpoint coordinates and protocol defaults.

use std::time::Duration;

/// Host the device answers on inside the local network.
pub const DEFAULT_HOST: &str = "mafreebox.freebox.fr";

/// API version path segment used when the caller does not pin one.
pub const DEFAULT_API_VERSION: &str = "latest";

/// URL scheme of the upload socket.
pub const DEFAULT_SCHEME: &str = "wss";

/// Request header carrying the session token at connect time.
///
/// Kept lowercase: header names are case-insensitive on the wire and the
/// `http` crate only accepts lowercase static names.
pub const AUTH_HEADER: &str = "x-fbx-app-auth";

/// Default payload frame size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Pause between two consecutive payload frames.
///
/// The endpoint has no application-level flow control; without pacing the
/// device drops frames once its receive buffer fills.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(10);

/// Upper bound for a single WebSocket message (16 MiB).
pub const WS_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Builds the upload endpoint path for an API version.
pub fn upload_path(api_version: &str) -> String {
    format!("/api/{api_version}/ws/upload")
}
