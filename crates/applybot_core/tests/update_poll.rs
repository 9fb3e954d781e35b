use applybot_core::{
    update, AppState, Dispatch, Effect, LogEntry, Msg, RequestFailure, RunState, RunStats,
    StatusSnapshot, StreamOutcome, StreamPhase,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    applybot_logging::initialize_for_tests();
}

fn snapshot(state: RunState) -> StatusSnapshot {
    StatusSnapshot {
        state,
        stats: RunStats {
            jobs_found: 7,
            applied_ok: 3,
            ..RunStats::default()
        },
    }
}

#[test]
fn initial_poll_hydrates_idle_state() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::PollRequested);
    assert_eq!(effects, vec![Effect::PollStatus]);

    let (mut state, effects) = update(state, Msg::PollCompleted(StatusSnapshot::idle()));
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Idle);
    assert!(state.poll_error().is_none());
    assert!(state.consume_dirty());
}

#[test]
fn poll_reporting_running_opens_the_stream() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::PollCompleted(snapshot(RunState::Running)));

    assert_eq!(effects, vec![Effect::OpenStream]);
    assert_eq!(state.run_state(), RunState::Running);
    assert_eq!(state.stream_phase(), StreamPhase::Connecting);
    assert_eq!(state.stats().jobs_found, 7);
}

#[test]
fn finished_poll_keeps_final_stats() {
    init_logging();
    let (state, effects) =
        update(AppState::new(), Msg::PollCompleted(snapshot(RunState::Finished)));
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Finished);
    assert_eq!(state.stats().applied_ok, 3);
}

#[test]
fn poll_results_are_discarded_while_stream_owns_state() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PollCompleted(snapshot(RunState::Running)));
    let (state, _) = update(state, Msg::StreamOpened);
    let (state, _) = update(state, Msg::Dispatched(Dispatch::Log(LogEntry::raw("hi"))));

    let (state, effects) = update(state, Msg::PollRequested);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::PollCompleted(snapshot(RunState::Failed)));
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Running);
    assert_eq!(state.logs().len(), 1);
}

#[test]
fn resync_after_stream_failure_does_not_reopen() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PollCompleted(snapshot(RunState::Running)));
    let (state, _) = update(state, Msg::StreamOpened);
    let (state, effects) = update(
        state,
        Msg::StreamClosed(StreamOutcome::Failed(RequestFailure::Timeout)),
    );
    assert_eq!(effects, vec![Effect::PollStatus]);

    let (state, effects) = update(state, Msg::PollCompleted(snapshot(RunState::Running)));
    assert!(effects.is_empty(), "reconnecting is the user's call");
    assert_eq!(state.stream_error(), Some(&RequestFailure::Timeout));

    let (_state, effects) = update(state, Msg::RetryStream);
    assert_eq!(effects, vec![Effect::OpenStream]);
}

#[test]
fn poll_failure_is_recorded_and_cleared_by_next_success() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::PollFailed(RequestFailure::HttpStatus(503)));
    assert!(effects.is_empty());
    assert_eq!(state.poll_error(), Some(&RequestFailure::HttpStatus(503)));
    assert!(state.view().has_failure());

    let (state, _) = update(state, Msg::PollCompleted(StatusSnapshot::idle()));
    assert!(state.poll_error().is_none());
    assert!(state.view().is_settled());
}

#[test]
fn retry_is_ignored_when_not_running() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::RetryStream);
    assert!(effects.is_empty());
    assert_eq!(state, AppState::new());
}

#[test]
fn quiet_close_of_live_run_reopens_once() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PollCompleted(snapshot(RunState::Running)));
    let (state, _) = update(state, Msg::StreamOpened);
    let (state, _) = update(
        state,
        Msg::Dispatched(Dispatch::Status(snapshot(RunState::Running))),
    );
    let (state, effects) = update(state, Msg::StreamClosed(StreamOutcome::Completed));
    assert_eq!(effects, vec![Effect::PollStatus]);

    let (state, effects) = update(state, Msg::PollCompleted(snapshot(RunState::Running)));
    assert_eq!(effects, vec![Effect::OpenStream]);
    assert_eq!(state.stream_phase(), StreamPhase::Connecting);

    // The reopened stream closes before delivering anything.
    let (state, effects) = update(state, Msg::StreamClosed(StreamOutcome::Completed));
    assert_eq!(effects, vec![Effect::PollStatus]);
    let (state, effects) = update(state, Msg::PollCompleted(snapshot(RunState::Running)));
    assert!(effects.is_empty());

    let view = state.view();
    assert!(view.is_settled());
    assert!(view.lost_live_run());
    assert!(view.has_failure());
}

#[test]
fn settled_finished_run_is_not_a_lost_run() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::PollCompleted(snapshot(RunState::Finished)));
    let view = state.view();
    assert!(!view.lost_live_run());
    assert!(!view.has_failure());
}
