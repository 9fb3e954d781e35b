use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{LaunchError, RequestFailure};
use crate::view_model::AppViewModel;

/// Coarse lifecycle of a triggered search-and-apply run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Finished,
    Failed,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
        }
    }
}

/// Counters reported by the backend for the current run.
///
/// Always replaced wholesale; never merged field by field. A counter or text
/// field of the wrong type reads as its default instead of failing the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub jobs_found: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_one_click: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub applied_ok: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub attempted_apply: u32,
    #[serde(default, deserialize_with = "lenient_text")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub finished_at: Option<String>,
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let count = match &value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .map(|n| n as u64)
            })
            .unwrap_or(0),
        _ => 0,
    };
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

/// Point-in-time status as carried by a `status` frame or the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(rename = "status")]
    pub state: RunState,
    #[serde(flatten)]
    pub stats: RunStats,
}

impl StatusSnapshot {
    /// Snapshot used when the backend reports that no job has ever run.
    pub fn idle() -> Self {
        Self::default()
    }
}

/// One entry of the run log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    pub message: String,
}

impl LogEntry {
    /// Fallback entry for payloads that do not look like a structured log line.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            ts: None,
            level: None,
            message: text.into(),
        }
    }
}

/// The core's view of the stream session, used for ownership hand-off with the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    #[default]
    Closed,
    Connecting,
    Open,
}

/// How a stream session ended, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The server closed the body without a terminal frame.
    Completed,
    /// A `done` frame was dispatched.
    Terminated,
    /// The session was stopped on request.
    Cancelled,
    /// Transport failure, including a refused start.
    Failed(RequestFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    run_state: RunState,
    stats: RunStats,
    logs: Vec<LogEntry>,
    stream: StreamPhase,
    launching: bool,
    stream_error: Option<RequestFailure>,
    poll_error: Option<RequestFailure>,
    launch_error: Option<LaunchError>,
    /// The current or last stream delivered at least one frame.
    stream_productive: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            run_state: self.run_state,
            stats: self.stats.clone(),
            logs: self.logs.clone(),
            stream: self.stream,
            launching: self.launching,
            stream_error: self.stream_error.clone(),
            poll_error: self.poll_error.clone(),
            launch_error: self.launch_error.clone(),
            dirty: self.dirty,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn stream_phase(&self) -> StreamPhase {
        self.stream
    }

    pub fn is_launching(&self) -> bool {
        self.launching
    }

    pub fn stream_error(&self) -> Option<&RequestFailure> {
        self.stream_error.as_ref()
    }

    pub fn poll_error(&self) -> Option<&RequestFailure> {
        self.poll_error.as_ref()
    }

    pub fn launch_error(&self) -> Option<&LaunchError> {
        self.launch_error.as_ref()
    }

    /// Returns whether the state changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn apply_status(&mut self, snapshot: StatusSnapshot) {
        // State and stats move together.
        self.run_state = snapshot.state;
        self.stats = snapshot.stats;
        self.dirty = true;
    }

    pub(crate) fn append_log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        self.dirty = true;
    }

    pub(crate) fn stream_productive(&self) -> bool {
        self.stream_productive
    }

    pub(crate) fn set_stream_productive(&mut self, productive: bool) {
        self.stream_productive = productive;
    }

    pub(crate) fn set_stream_phase(&mut self, phase: StreamPhase) {
        if self.stream != phase {
            self.stream = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn begin_launch(&mut self) {
        self.launching = true;
        self.launch_error = None;
        self.dirty = true;
    }

    /// The server accepted a new run: previous run data is discarded.
    pub(crate) fn accept_launch(&mut self) {
        self.launching = false;
        self.run_state = RunState::Running;
        self.stats = RunStats::default();
        self.logs.clear();
        self.stream_error = None;
        self.poll_error = None;
        self.launch_error = None;
        self.dirty = true;
    }

    /// The submission finished without success.
    pub(crate) fn reject_launch(&mut self, error: LaunchError) {
        self.launching = false;
        self.set_launch_error(error);
    }

    /// Local refusal; an in-flight submission keeps running.
    pub(crate) fn set_launch_error(&mut self, error: LaunchError) {
        self.launch_error = Some(error);
        self.dirty = true;
    }

    pub(crate) fn set_stream_error(&mut self, error: Option<RequestFailure>) {
        if self.stream_error != error {
            self.stream_error = error;
            self.dirty = true;
        }
    }

    pub(crate) fn set_poll_error(&mut self, error: Option<RequestFailure>) {
        if self.poll_error != error {
            self.poll_error = error;
            self.dirty = true;
        }
    }
}
