use crate::dispatch::Dispatch;
use crate::error::RequestFailure;
use crate::launch::LaunchForm;
use crate::state::{StatusSnapshot, StreamOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted the launch form.
    LaunchRequested(LaunchForm),
    /// Server accepted the start request.
    LaunchAccepted,
    /// Server (or transport) refused the start request.
    LaunchRejected(RequestFailure),
    /// First bytes arrived on the stream.
    StreamOpened,
    /// One frame, already mapped by the dispatcher.
    Dispatched(Dispatch),
    /// The stream session ended.
    StreamClosed(StreamOutcome),
    /// User asked for a status refresh.
    PollRequested,
    /// Status endpoint answered.
    PollCompleted(StatusSnapshot),
    /// Status endpoint could not be reached.
    PollFailed(RequestFailure),
    /// User asked to reconnect after a stream error.
    RetryStream,
    /// Front end is going away; the stream must be released.
    Teardown,
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
