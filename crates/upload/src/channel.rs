//! Transport seam for upload sessions.
//!
//! [`WsChannel`](crate::WsChannel) implements this on top of a real
//! WebSocket. Keeping the session generic over the trait lets the state
//! machine run against scripted channels in tests.

use std::future::Future;
use std::pin::Pin;

use fbx_upload_protocol::Frame;

use crate::error::UploadError;

/// Boxed future returned by [`Channel`] methods.
pub type ChannelFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UploadError>> + Send + 'a>>;

/// An open, authenticated, ordered message channel to the device.
///
/// Exactly one session drives a channel: every call takes `&mut self`, so
/// two writers can never interleave.
pub trait Channel: Send {
    /// Sends one frame.
    fn send(&mut self, frame: Frame) -> ChannelFuture<'_, ()>;

    /// Waits for the next data frame from the device.
    ///
    /// Keepalive traffic is consumed internally; a peer close or end of
    /// stream is [`UploadError::Closed`].
    fn recv(&mut self) -> ChannelFuture<'_, Frame>;

    /// Closes the channel. Calling it on a closed channel is a no-op.
    fn close(&mut self) -> ChannelFuture<'_, ()>;
}
