//! The three-phase upload state machine.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use fbx_upload_protocol::constants::DEFAULT_FRAME_DELAY;
use fbx_upload_protocol::{Acknowledgment, ControlMessage, Frame};
use fbx_upload_transfer::{ChunkReader, SourceInfo};

use crate::channel::Channel;
use crate::config::{UploadConfig, ZeroLengthAck};
use crate::error::UploadError;
use crate::types::{Phase, SessionState, UploadEvent, UploadReport, UploadRequest};

/// Pacing and waiting behaviour of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub frame_delay: Duration,
    pub ack_timeout: Option<Duration>,
    pub zero_length_ack: ZeroLengthAck,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            frame_delay: DEFAULT_FRAME_DELAY,
            ack_timeout: None,
            zero_length_ack: ZeroLengthAck::Await,
        }
    }
}

impl From<&UploadConfig> for SessionOptions {
    fn from(config: &UploadConfig) -> Self {
        Self {
            frame_delay: config.frame_delay(),
            ack_timeout: config.ack_timeout(),
            zero_length_ack: config.zero_length_ack,
        }
    }
}

/// Drives one upload over one exclusively owned channel.
///
/// A session runs once. Whatever the outcome, the channel is closed
/// before [`run`](Self::run) returns.
pub struct UploadSession<C: Channel> {
    channel: C,
    options: SessionOptions,
    state: SessionState,
    events: Option<mpsc::Sender<UploadEvent>>,
    cancel: CancellationToken,
}

impl<C: Channel> UploadSession<C> {
    /// Creates an idle session over `channel`.
    pub fn new(channel: C, options: SessionOptions) -> Self {
        Self {
            channel,
            options,
            state: SessionState::Idle,
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Sends progress events to `events_tx`. Delivery is best-effort.
    pub fn with_events(mut self, events_tx: mpsc::Sender<UploadEvent>) -> Self {
        self.events = Some(events_tx);
        self
    }

    /// Aborts the session when `cancel` fires.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs all three phases, then closes the channel.
    ///
    /// Succeeds only if the handshake, the payload, and the finalization
    /// were each acknowledged with `success = true`. Failures raised inside
    /// a phase, other than cancellation, report it through
    /// [`UploadError::phase`].
    pub async fn run(&mut self, request: &UploadRequest) -> Result<UploadReport, UploadError> {
        self.execute(request, None).await
    }

    /// Like [`run`](Self::run), for a source the caller already inspected
    /// with [`UploadRequest::validate`].
    pub async fn run_inspected(
        &mut self,
        request: &UploadRequest,
        source: SourceInfo,
    ) -> Result<UploadReport, UploadError> {
        self.execute(request, Some(source)).await
    }

    async fn execute(
        &mut self,
        request: &UploadRequest,
        source: Option<SourceInfo>,
    ) -> Result<UploadReport, UploadError> {
        if self.state != SessionState::Idle {
            return Err(UploadError::Precondition(
                "upload session already used".into(),
            ));
        }

        let result = match self.drive(request, source).await {
            Err(e) => match self.state.phase() {
                Some(phase) => Err(e.within(phase)),
                None => Err(e),
            },
            ok => ok,
        };

        match &result {
            Ok(report) => {
                self.state = SessionState::Succeeded;
                info!(
                    request_id = report.request_id,
                    file = %report.filename,
                    bytes = report.bytes_sent,
                    frames = report.frames,
                    "upload completed"
                );
                self.emit(UploadEvent::Finished(report.clone()));
            }
            Err(e) => {
                let failed_in = self.state;
                self.state = SessionState::Failed;
                warn!(
                    request_id = request.request_id,
                    state = ?failed_in,
                    error = %e,
                    "upload failed"
                );
                self.emit(UploadEvent::Failed {
                    request_id: request.request_id,
                    phase: e.phase().or(failed_in.phase()),
                    error: e.to_string(),
                });
            }
        }

        if let Err(e) = self.channel.close().await {
            warn!(error = %e, "failed to close upload channel");
        }

        result
    }

    async fn drive(
        &mut self,
        request: &UploadRequest,
        source: Option<SourceInfo>,
    ) -> Result<UploadReport, UploadError> {
        let source = match source {
            Some(source) => source,
            None => request.validate().await?,
        };

        self.handshake(request, &source).await?;
        let (bytes_sent, frames, sha256) = self.stream_payload(request, &source).await?;
        self.finalize(request).await?;

        Ok(UploadReport {
            request_id: request.request_id,
            filename: source.filename,
            bytes_sent,
            frames,
            sha256,
        })
    }

    // -----------------------------------------------------------------------
    // Phases
    // -----------------------------------------------------------------------

    async fn handshake(
        &mut self,
        request: &UploadRequest,
        source: &SourceInfo,
    ) -> Result<(), UploadError> {
        self.enter(SessionState::Handshaking, Phase::Handshake, request.request_id);

        let start = ControlMessage::upload_start(
            request.request_id,
            source.size,
            &request.target_dir,
            source.filename.as_str(),
            request.overwrite,
        );
        self.send_control(&start).await?;
        self.expect_ack(Phase::Handshake).await?;
        Ok(())
    }

    async fn stream_payload(
        &mut self,
        request: &UploadRequest,
        source: &SourceInfo,
    ) -> Result<(u64, u64, String), UploadError> {
        self.enter(SessionState::Streaming, Phase::Streaming, request.request_id);
        debug!(
            request_id = request.request_id,
            bytes = source.size,
            frames = source.frame_count(request.chunk_size),
            "streaming payload"
        );

        let mut reader = ChunkReader::open(&source.path, request.chunk_size).await?;
        while let Some(chunk) = reader.next_chunk().await? {
            if reader.chunks() > 1 && !self.options.frame_delay.is_zero() {
                tokio::time::sleep(self.options.frame_delay).await;
            }
            self.check_cancelled()?;

            let len = chunk.len();
            self.channel.send(Frame::Binary(chunk)).await?;
            trace!(
                request_id = request.request_id,
                frame = reader.chunks(),
                bytes = len,
                "payload frame sent"
            );
            self.emit(UploadEvent::Progress {
                request_id: request.request_id,
                sent: reader.offset(),
                total: source.size,
            });
        }

        let frames = reader.chunks();
        if frames == 0 && self.options.zero_length_ack == ZeroLengthAck::Skip {
            debug!(
                request_id = request.request_id,
                "empty payload, not waiting for streaming acknowledgment"
            );
        } else {
            self.expect_ack(Phase::Streaming).await?;
        }

        Ok((reader.offset(), frames, reader.digest()))
    }

    async fn finalize(&mut self, request: &UploadRequest) -> Result<(), UploadError> {
        self.enter(SessionState::Finalizing, Phase::Finalization, request.request_id);

        let finalize = ControlMessage::upload_finalize(request.request_id);
        self.send_control(&finalize).await?;
        self.expect_ack(Phase::Finalization).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn enter(&mut self, state: SessionState, phase: Phase, request_id: u64) {
        debug!(request_id, %phase, "entering phase");
        self.state = state;
        self.emit(UploadEvent::PhaseStarted { request_id, phase });
    }

    async fn send_control(&mut self, msg: &ControlMessage) -> Result<(), UploadError> {
        self.check_cancelled()?;
        let json = msg.to_json()?;
        debug!(action = %msg.action(), request_id = msg.request_id(), "sending control message");
        self.channel.send(Frame::Text(json)).await
    }

    /// Waits for exactly one acknowledgment and checks `success`.
    async fn expect_ack(&mut self, phase: Phase) -> Result<Acknowledgment, UploadError> {
        let cancel = self.cancel.clone();
        let ack_timeout = self.options.ack_timeout;

        let recv = async {
            match ack_timeout {
                Some(limit) => match tokio::time::timeout(limit, self.channel.recv()).await {
                    Ok(result) => result,
                    Err(_) => Err(UploadError::Timeout { phase }),
                },
                None => self.channel.recv().await,
            }
        };

        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(UploadError::Cancelled),
            result = recv => result?,
        };

        let text = match frame {
            Frame::Text(text) => text,
            other => {
                return Err(UploadError::Malformed {
                    phase,
                    reason: format!(
                        "expected text acknowledgment, got {} frame of {} bytes",
                        other.kind(),
                        other.byte_len()
                    ),
                });
            }
        };

        let ack = Acknowledgment::from_json(&text).map_err(|e| UploadError::Malformed {
            phase,
            reason: e.to_string(),
        })?;

        if !ack.success {
            return Err(UploadError::Rejected {
                phase,
                msg: ack.msg,
            });
        }

        debug!(%phase, "acknowledged");
        Ok(ack)
    }

    fn check_cancelled(&self) -> Result<(), UploadError> {
        if self.cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        Ok(())
    }

    fn emit(&self, event: UploadEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.try_send(event);
        }
    }
}
