//! WebSocket implementation of [`Channel`].

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite};
use tracing::{debug, info, trace, warn};

use fbx_upload_protocol::Frame;
use fbx_upload_protocol::constants::AUTH_HEADER;

use crate::channel::{Channel, ChannelFuture};
use crate::config::{TlsPolicy, UploadConfig};
use crate::error::UploadError;
use crate::types::SessionToken;

/// Authenticated WebSocket connection to the device's upload endpoint.
///
/// Dropping the channel without calling [`Channel::close`] still tears
/// down the underlying socket.
pub struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    closed: bool,
}

impl WsChannel {
    /// Opens the upload socket, sending `token` in the auth header.
    pub async fn connect(config: &UploadConfig, token: &SessionToken) -> Result<Self, UploadError> {
        config.validate()?;
        let url = config.endpoint();

        let mut request = url.as_str().into_client_request()?;
        let auth = HeaderValue::from_str(token.expose()).map_err(|_| {
            UploadError::Precondition("session token is not a valid header value".into())
        })?;
        request.headers_mut().insert(AUTH_HEADER, auth);

        let mut ws_config = WebSocketConfig::default();
        ws_config.max_message_size = Some(config.max_message_size);
        ws_config.max_frame_size = Some(config.max_message_size);

        let connector = if config.scheme == "wss" {
            if config.tls == TlsPolicy::AcceptAny {
                warn!(
                    host = %config.host,
                    "server certificate verification disabled for upload socket"
                );
            }
            Some(crate::tls::connector(config.tls)?)
        } else {
            None
        };

        let (stream, response) = tokio_tungstenite::connect_async_tls_with_config(
            request,
            Some(ws_config),
            false,
            connector,
        )
        .await?;

        info!(url = %url, status = %response.status(), "upload socket connected");
        Ok(Self {
            stream,
            closed: false,
        })
    }
}

impl Channel for WsChannel {
    fn send(&mut self, frame: Frame) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            if self.closed {
                return Err(UploadError::Closed);
            }
            trace!(kind = frame.kind(), bytes = frame.byte_len(), "sending frame");
            let msg = match frame {
                Frame::Text(text) => tungstenite::Message::Text(text.into()),
                Frame::Binary(data) => tungstenite::Message::Binary(data.into()),
            };
            self.stream.send(msg).await?;
            Ok(())
        })
    }

    fn recv(&mut self) -> ChannelFuture<'_, Frame> {
        Box::pin(async move {
            if self.closed {
                return Err(UploadError::Closed);
            }
            loop {
                match self.stream.next().await {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        return Ok(Frame::Text(text.as_str().to_owned()));
                    }
                    Some(Ok(tungstenite::Message::Binary(data))) => {
                        return Ok(Frame::Binary(data.to_vec()));
                    }
                    // Pongs to incoming pings are queued by tungstenite itself.
                    Some(Ok(tungstenite::Message::Ping(_)))
                    | Some(Ok(tungstenite::Message::Pong(_)))
                    | Some(Ok(tungstenite::Message::Frame(_))) => {
                        trace!("skipping keepalive frame");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        debug!(?frame, "received close frame");
                        return Err(UploadError::Closed);
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        debug!("WebSocket stream ended");
                        return Err(UploadError::Closed);
                    }
                }
            }
        })
    }

    fn close(&mut self) -> ChannelFuture<'_, ()> {
        Box::pin(async move {
            if self.closed {
                return Ok(());
            }
            self.closed = true;
            match self.stream.close(None).await {
                Ok(())
                | Err(tungstenite::Error::ConnectionClosed)
                | Err(tungstenite::Error::AlreadyClosed) => {
                    debug!("upload socket closed");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        })
    }
}
