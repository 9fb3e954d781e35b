use crate::error::{LaunchError, RequestFailure};
use crate::state::{LogEntry, RunState, RunStats, StreamPhase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub run_state: RunState,
    pub stats: RunStats,
    pub logs: Vec<LogEntry>,
    pub stream: StreamPhase,
    pub launching: bool,
    pub stream_error: Option<RequestFailure>,
    pub poll_error: Option<RequestFailure>,
    pub launch_error: Option<LaunchError>,
    pub dirty: bool,
}

impl AppViewModel {
    /// Nothing is in flight: no stream, no pending launch.
    pub fn is_settled(&self) -> bool {
        self.stream == StreamPhase::Closed && !self.launching
    }

    /// Nothing is following a run the backend still reports as running.
    pub fn lost_live_run(&self) -> bool {
        self.run_state == RunState::Running && self.is_settled()
    }

    /// Whether the session ended in a state a caller should treat as failure.
    pub fn has_failure(&self) -> bool {
        self.run_state == RunState::Failed
            || self.lost_live_run()
            || self.stream_error.is_some()
            || self.poll_error.is_some()
            || self.launch_error.is_some()
    }
}
