//! Applybot core: pure state machine, event-stream decoding and launch validation.
mod dispatch;
mod effect;
mod error;
mod frame;
mod launch;
mod msg;
mod state;
mod update;
mod view_model;

pub use dispatch::{dispatch, Dispatch, DONE_EVENT, LOG_EVENT, STATUS_EVENT};
pub use effect::Effect;
pub use error::{LaunchError, RequestFailure, ValidationError};
pub use frame::{Frame, FrameDecoder, Payload, DEFAULT_EVENT};
pub use launch::{LaunchForm, LaunchParams, MAX_LIMIT, MIN_LIMIT};
pub use msg::Msg;
pub use state::{
    AppState, LogEntry, RunState, RunStats, StatusSnapshot, StreamOutcome, StreamPhase,
};
pub use update::update;
pub use view_model::AppViewModel;
