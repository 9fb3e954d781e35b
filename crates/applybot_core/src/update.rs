use applybot_logging::applybot_debug;

use crate::{
    AppState, Dispatch, Effect, LaunchError, Msg, RunState, StreamOutcome, StreamPhase,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::LaunchRequested(form) => {
            if state.is_launching() || state.run_state() == RunState::Running {
                state.set_launch_error(LaunchError::Busy);
                return (state, Vec::new());
            }
            match form.validate() {
                Ok(params) => {
                    state.begin_launch();
                    vec![Effect::SubmitLaunch(params)]
                }
                Err(errors) => {
                    state.set_launch_error(LaunchError::Invalid(errors));
                    Vec::new()
                }
            }
        }
        Msg::LaunchAccepted => {
            if !state.is_launching() {
                return (state, Vec::new());
            }
            state.accept_launch();
            open_stream(&mut state)
        }
        Msg::LaunchRejected(failure) => {
            if state.is_launching() {
                state.reject_launch(LaunchError::Rejected(failure));
            }
            Vec::new()
        }
        Msg::StreamOpened => {
            if state.stream_phase() == StreamPhase::Connecting {
                state.set_stream_phase(StreamPhase::Open);
            }
            Vec::new()
        }
        Msg::Dispatched(dispatch) => {
            if state.stream_phase() == StreamPhase::Closed {
                applybot_debug!("Discarding frame that arrived with no open stream");
                return (state, Vec::new());
            }
            state.set_stream_productive(true);
            match dispatch {
                Dispatch::Status(snapshot) => {
                    state.apply_status(snapshot);
                    if state.run_state() == RunState::Running {
                        Vec::new()
                    } else {
                        vec![Effect::CloseStream]
                    }
                }
                Dispatch::Log(entry) => {
                    state.append_log(entry);
                    Vec::new()
                }
                Dispatch::Done => vec![Effect::CloseStream],
                Dispatch::Ignored => Vec::new(),
            }
        }
        Msg::StreamClosed(outcome) => {
            state.set_stream_phase(StreamPhase::Closed);
            match outcome {
                StreamOutcome::Cancelled => Vec::new(),
                StreamOutcome::Failed(failure) => {
                    state.set_stream_error(Some(failure));
                    resync(&state)
                }
                StreamOutcome::Completed | StreamOutcome::Terminated => resync(&state),
            }
        }
        Msg::PollRequested => {
            if state.stream_phase() == StreamPhase::Closed {
                vec![Effect::PollStatus]
            } else {
                Vec::new()
            }
        }
        Msg::PollCompleted(snapshot) => {
            if state.stream_phase() != StreamPhase::Closed {
                applybot_debug!("Discarding poll result while the stream owns run state");
                return (state, Vec::new());
            }
            let was_running = state.run_state() == RunState::Running;
            state.set_poll_error(None);
            state.apply_status(snapshot);
            if state.run_state() != RunState::Running {
                Vec::new()
            } else if !was_running {
                open_stream(&mut state)
            } else if state.stream_error().is_none() && state.stream_productive() {
                // The stream ended quietly but the run is live: follow it again.
                // A reopened stream that closes before any frame is not retried.
                applybot_debug!("Run still live after stream close; reopening");
                open_stream(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::PollFailed(failure) => {
            state.set_poll_error(Some(failure));
            Vec::new()
        }
        Msg::RetryStream => {
            if state.run_state() == RunState::Running
                && state.stream_phase() == StreamPhase::Closed
            {
                state.set_stream_error(None);
                open_stream(&mut state)
            } else {
                Vec::new()
            }
        }
        Msg::Teardown => {
            if state.stream_phase() == StreamPhase::Closed {
                Vec::new()
            } else {
                vec![Effect::CloseStream]
            }
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn open_stream(state: &mut AppState) -> Vec<Effect> {
    if state.stream_phase() != StreamPhase::Closed {
        return Vec::new();
    }
    state.set_stream_phase(StreamPhase::Connecting);
    state.set_stream_productive(false);
    vec![Effect::OpenStream]
}

/// A stream that ended while the run still looks live gets one status poll.
fn resync(state: &AppState) -> Vec<Effect> {
    if state.run_state() == RunState::Running {
        vec![Effect::PollStatus]
    } else {
        Vec::new()
    }
}
