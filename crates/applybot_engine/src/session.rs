//! The one live event-stream connection of a client.
//!
//! `start` spawns a read task that owns the transport body; `stop` cancels
//! it and waits until the body has been dropped. The phase is only ever
//! `Connecting`/`Open` while that task is alive.

use std::sync::{Arc, Mutex, PoisonError};

use applybot_core::{dispatch, Frame, FrameDecoder, Msg, StreamOutcome};
use applybot_logging::{applybot_debug, applybot_info, applybot_warn};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::auth::{require_token, CredentialStore};
use crate::transport::EventTransport;
use crate::{Flow, RequestError, SessionPhase, StartOutcome, StreamEnd};

/// Receives everything a session produces, in byte order, from the read task.
pub trait StreamSink: Send + Sync {
    /// First bytes arrived.
    fn opened(&self);
    /// One decoded frame. Returning [`Flow::Stop`] ends the session.
    fn frame(&self, frame: Frame) -> Flow;
    /// Called exactly once per started session, after the body is released.
    fn closed(&self, end: StreamEnd);
}

/// Runs frames through the dispatcher and forwards the resulting messages.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Msg>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<Msg>) -> Self {
        Self { tx }
    }
}

impl StreamSink for ChannelSink {
    fn opened(&self) {
        let _ = self.tx.send(Msg::StreamOpened);
    }

    fn frame(&self, frame: Frame) -> Flow {
        let dispatched = dispatch(frame);
        let flow = if dispatched.is_terminal() {
            Flow::Stop
        } else {
            Flow::Continue
        };
        let _ = self.tx.send(Msg::Dispatched(dispatched));
        flow
    }

    fn closed(&self, end: StreamEnd) {
        let _ = self.tx.send(Msg::StreamClosed(end.outcome()));
    }
}

impl StreamEnd {
    pub fn outcome(&self) -> StreamOutcome {
        match self {
            StreamEnd::Completed => StreamOutcome::Completed,
            StreamEnd::Terminated => StreamOutcome::Terminated,
            StreamEnd::Cancelled => StreamOutcome::Cancelled,
            StreamEnd::Failed(err) => StreamOutcome::Failed(err.failure()),
        }
    }
}

type SharedPhase = Arc<Mutex<SessionPhase>>;

fn read_phase(phase: &SharedPhase) -> SessionPhase {
    *phase.lock().unwrap_or_else(PoisonError::into_inner)
}

fn write_phase(phase: &SharedPhase, value: SessionPhase) {
    *phase.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

/// Puts the phase back to `Closed` however the read task exits.
struct PhaseGuard {
    phase: SharedPhase,
}

impl PhaseGuard {
    fn set(&self, value: SessionPhase) {
        write_phase(&self.phase, value);
    }
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        write_phase(&self.phase, SessionPhase::Closed);
    }
}

struct ActiveStream {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct StreamSession {
    transport: Arc<dyn EventTransport>,
    credentials: Arc<dyn CredentialStore>,
    token_key: String,
    phase: SharedPhase,
    active: Option<ActiveStream>,
}

impl StreamSession {
    pub fn new(
        transport: Arc<dyn EventTransport>,
        credentials: Arc<dyn CredentialStore>,
        token_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            credentials,
            token_key: token_key.into(),
            phase: Arc::new(Mutex::new(SessionPhase::Closed)),
            active: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        read_phase(&self.phase)
    }

    /// Opens the stream unless one is already connecting or open.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, sink: Arc<dyn StreamSink>) -> Result<StartOutcome, RequestError> {
        if self.phase() != SessionPhase::Closed {
            applybot_debug!("Stream already active; start ignored");
            return Ok(StartOutcome::AlreadyActive);
        }
        let bearer = require_token(self.credentials.as_ref(), &self.token_key)?;

        // A previous task has already finished; just forget its handle.
        if let Some(previous) = self.active.take() {
            previous.cancel.cancel();
        }

        write_phase(&self.phase, SessionPhase::Connecting);
        let guard = PhaseGuard {
            phase: self.phase.clone(),
        };
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_stream(
            self.transport.clone(),
            bearer,
            cancel.clone(),
            guard,
            sink,
        ));
        self.active = Some(ActiveStream { cancel, task });
        applybot_info!("Stream session started");
        Ok(StartOutcome::Started)
    }

    /// Cancels the live stream, if any, and waits until its transport is released.
    ///
    /// Idempotent; a no-op when nothing is running.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.cancel.cancel();
        if let Err(err) = active.task.await {
            applybot_warn!("Stream task ended abnormally: {}", err);
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

async fn run_stream(
    transport: Arc<dyn EventTransport>,
    bearer: String,
    cancel: CancellationToken,
    guard: PhaseGuard,
    sink: Arc<dyn StreamSink>,
) {
    let end = tokio::select! {
        biased;
        _ = cancel.cancelled() => StreamEnd::Cancelled,
        end = pump(transport.as_ref(), &bearer, &guard, sink.as_ref()) => end,
    };

    // Closed before the sink hears about it, so a reaction to `closed` can restart.
    drop(guard);
    match &end {
        StreamEnd::Failed(err) => applybot_warn!("Stream session failed: {}", err),
        other => applybot_info!("Stream session ended: {:?}", other),
    }
    sink.closed(end);
}

async fn pump(
    transport: &dyn EventTransport,
    bearer: &str,
    guard: &PhaseGuard,
    sink: &dyn StreamSink,
) -> StreamEnd {
    let mut body = match transport.open(bearer).await {
        Ok(body) => body,
        Err(err) => return StreamEnd::Failed(err),
    };

    let mut decoder = FrameDecoder::new();
    let mut opened = false;
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => return StreamEnd::Failed(err),
        };
        if chunk.is_empty() {
            continue;
        }
        if !opened {
            opened = true;
            guard.set(SessionPhase::Open);
            sink.opened();
        }
        decoder.push_bytes(&chunk);
        for frame in decoder.frames() {
            if sink.frame(frame) == Flow::Stop {
                return StreamEnd::Terminated;
            }
        }
    }

    if decoder.residual_len() > 0 {
        applybot_debug!(
            "Stream ended with {} undelimited byte(s); discarded",
            decoder.residual_len()
        );
    }
    StreamEnd::Completed
}
