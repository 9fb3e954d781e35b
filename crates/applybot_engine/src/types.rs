use std::fmt;

use applybot_core::RequestFailure;

/// Lifecycle of the single live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Closed,
    Connecting,
    Open,
}

/// Result of [`crate::StreamSession::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A stream was already connecting or open; nothing was done.
    AlreadyActive,
}

/// Returned by a [`crate::StreamSink`] after each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// How a stream session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server finished the body.
    Completed,
    /// The sink asked to stop (terminal frame).
    Terminated,
    /// `stop()` was called or the session was dropped.
    Cancelled,
    Failed(RequestError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RequestError {
    pub kind: FailureKind,
    pub message: String,
}

impl RequestError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Stable failure class for the state machine.
    pub fn failure(&self) -> RequestFailure {
        match self.kind {
            FailureKind::MissingCredential => RequestFailure::Unauthenticated,
            FailureKind::HttpStatus(code) => RequestFailure::HttpStatus(code),
            FailureKind::Timeout => RequestFailure::Timeout,
            FailureKind::InvalidUrl | FailureKind::Network => RequestFailure::Network,
            FailureKind::InvalidResponse => RequestFailure::InvalidResponse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingCredential,
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MissingCredential => write!(f, "missing credential"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, err.to_string());
    }
    if let Some(status) = err.status() {
        return RequestError::new(FailureKind::HttpStatus(status.as_u16()), err.to_string());
    }
    RequestError::new(FailureKind::Network, err.to_string())
}
