//! Entry point tying configuration, credential, socket, and session
//! together.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::session::{SessionOptions, UploadSession};
use crate::types::{SessionToken, UploadEvent, UploadReport, UploadRequest};
use crate::ws_channel::WsChannel;

/// Uploads files to the device, one socket per upload.
///
/// Retries are left to the caller: a failed upload is reported as soon
/// as any phase fails.
pub struct Uploader {
    config: UploadConfig,
    token: SessionToken,
    events_tx: Option<mpsc::Sender<UploadEvent>>,
    cancel: CancellationToken,
}

impl Uploader {
    /// Creates an uploader after validating `config`.
    pub fn new(config: UploadConfig, token: SessionToken) -> Result<Self, UploadError> {
        config.validate()?;
        Ok(Self {
            config,
            token,
            events_tx: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Forwards session progress events to `events_tx`.
    pub fn with_events(mut self, events_tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    /// Returns a token that aborts in-flight uploads when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Uploads `request.source` into `request.target_dir`.
    ///
    /// Preconditions are checked before the socket is opened; the socket
    /// is closed before this returns, whatever the outcome.
    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadReport, UploadError> {
        let source = request.validate().await?;
        debug!(
            file = %source.filename,
            size = source.size,
            target = %request.target_dir,
            request_id = request.request_id,
            "starting upload"
        );

        if self.cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let channel = WsChannel::connect(&self.config, &self.token).await?;

        let mut session = UploadSession::new(channel, SessionOptions::from(&self.config))
            .with_cancel(self.cancel.child_token());
        if let Some(tx) = &self.events_tx {
            session = session.with_events(tx.clone());
        }

        session.run_inspected(request, source).await
    }
}
