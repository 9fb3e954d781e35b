//! Maps decoded frames to state actions.

use applybot_logging::applybot_debug;
use serde_json::Value;

use crate::frame::{Frame, Payload};
use crate::state::{LogEntry, StatusSnapshot};

pub const STATUS_EVENT: &str = "status";
pub const LOG_EVENT: &str = "log";
pub const DONE_EVENT: &str = "done";

/// Action derived from one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Replace run state and stats together.
    Status(StatusSnapshot),
    /// Append to the run log.
    Log(LogEntry),
    /// End of stream; nothing after it is processed.
    Done,
    /// Unknown event type or unrecognisable status payload.
    Ignored,
}

impl Dispatch {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Never fails: anything it cannot interpret becomes [`Dispatch::Ignored`]
/// or, for logs, a raw entry.
pub fn dispatch(frame: Frame) -> Dispatch {
    match frame.event.as_str() {
        STATUS_EVENT => match status_from_payload(&frame.data) {
            Some(snapshot) => Dispatch::Status(snapshot),
            None => {
                applybot_debug!("Ignoring status frame without a recognisable run state");
                Dispatch::Ignored
            }
        },
        LOG_EVENT => Dispatch::Log(log_from_payload(frame.data)),
        DONE_EVENT => Dispatch::Done,
        other => {
            applybot_debug!("Ignoring event-stream frame of unknown type {:?}", other);
            Dispatch::Ignored
        }
    }
}

fn status_from_payload(payload: &Payload) -> Option<StatusSnapshot> {
    let Payload::Structured(value) = payload else {
        return None;
    };
    serde_json::from_value(value.clone()).ok()
}

fn log_from_payload(payload: Payload) -> LogEntry {
    if let Payload::Structured(Value::Object(fields)) = &payload {
        if let Some(message) = fields.get("message").and_then(Value::as_str) {
            return LogEntry {
                ts: fields.get("ts").and_then(scalar_text),
                level: fields.get("level").and_then(scalar_text),
                message: message.to_string(),
            };
        }
    }
    LogEntry::raw(payload.to_text())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{RunState, RunStats};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn structured(event: &str, value: Value) -> Frame {
        Frame::new(event, Payload::Structured(value))
    }

    #[test]
    fn status_frame_carries_state_and_stats() {
        let frame = structured(
            "status",
            json!({
                "status": "finished",
                "jobs_found": 12,
                "total_one_click": 5,
                "applied_ok": 4,
                "attempted_apply": 5,
                "finished_at": "2026-10-01T10:00:00Z"
            }),
        );
        assert_eq!(
            dispatch(frame),
            Dispatch::Status(StatusSnapshot {
                state: RunState::Finished,
                stats: RunStats {
                    jobs_found: 12,
                    total_one_click: 5,
                    applied_ok: 4,
                    attempted_apply: 5,
                    error: None,
                    finished_at: Some("2026-10-01T10:00:00Z".to_string()),
                },
            })
        );
    }

    #[test]
    fn badly_typed_counters_do_not_drop_the_status() {
        let frame = structured(
            "status",
            json!({
                "status": "running",
                "jobs_found": null,
                "applied_ok": "3",
                "attempted_apply": 2.0,
                "total_one_click": 7,
                "error": 42
            }),
        );
        assert_eq!(
            dispatch(frame),
            Dispatch::Status(StatusSnapshot {
                state: RunState::Running,
                stats: RunStats {
                    jobs_found: 0,
                    total_one_click: 7,
                    applied_ok: 0,
                    attempted_apply: 2,
                    error: None,
                    finished_at: None,
                },
            })
        );
    }

    #[test]
    fn status_frame_without_known_state_is_ignored() {
        assert_eq!(
            dispatch(structured("status", json!({"status": "queued"}))),
            Dispatch::Ignored
        );
        assert_eq!(
            dispatch(structured("status", json!({"jobs_found": 1}))),
            Dispatch::Ignored
        );
        assert_eq!(
            dispatch(Frame::new("status", Payload::Raw("running".into()))),
            Dispatch::Ignored
        );
    }

    #[test]
    fn structured_log_keeps_fields() {
        let frame = structured(
            "log",
            json!({"ts": "10:00:01", "level": "warn", "message": "captcha"}),
        );
        assert_eq!(
            dispatch(frame),
            Dispatch::Log(LogEntry {
                ts: Some("10:00:01".to_string()),
                level: Some("warn".to_string()),
                message: "captcha".to_string(),
            })
        );
    }

    #[test]
    fn unstructured_log_falls_back_to_whole_payload() {
        assert_eq!(
            dispatch(Frame::new("log", Payload::Raw("plain line".into()))),
            Dispatch::Log(LogEntry::raw("plain line"))
        );
        assert_eq!(
            dispatch(structured("log", json!({"text": "no message"}))),
            Dispatch::Log(LogEntry::raw(r#"{"text":"no message"}"#))
        );
    }

    #[test]
    fn done_is_terminal_whatever_the_payload() {
        let dispatched = dispatch(Frame::new("done", Payload::Raw("bye".into())));
        assert!(dispatched.is_terminal());
        assert!(dispatch(structured("done", json!({}))).is_terminal());
    }

    #[test]
    fn unknown_event_is_ignored() {
        let dispatched = dispatch(structured("ping", json!(1)));
        assert_eq!(dispatched, Dispatch::Ignored);
        assert!(!dispatched.is_terminal());
    }
}
