use applybot_core::{AppViewModel, LaunchError, LogEntry, RunState, RunStats};
use chrono::{DateTime, Local};

/// Turns successive view models into terminal lines, printing each change once.
#[derive(Debug, Default)]
pub struct Renderer {
    log_cursor: usize,
    last_status: Option<(RunState, RunStats)>,
    last_errors: Vec<String>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();

        let status = (view.run_state, view.stats.clone());
        if self.last_status.as_ref() != Some(&status) {
            lines.push(status_line(view.run_state, &view.stats));
            self.last_status = Some(status);
        }

        // A fresh launch clears the log.
        if view.logs.len() < self.log_cursor {
            self.log_cursor = 0;
        }
        lines.extend(view.logs[self.log_cursor..].iter().map(log_line));
        self.log_cursor = view.logs.len();

        let errors = error_lines(view);
        lines.extend(
            errors
                .iter()
                .filter(|line| !self.last_errors.contains(line))
                .cloned(),
        );
        self.last_errors = errors;

        lines
    }
}

pub fn status_line(state: RunState, stats: &RunStats) -> String {
    let mut line = format!(
        "status: {} | found {} | one-click {} | attempted {} | applied {}",
        state.as_str(),
        stats.jobs_found,
        stats.total_one_click,
        stats.attempted_apply,
        stats.applied_ok
    );
    if let Some(finished) = &stats.finished_at {
        line.push_str(&format!(" | finished {}", display_timestamp(finished)));
    }
    if let Some(error) = &stats.error {
        line.push_str(&format!(" | error: {error}"));
    }
    line
}

/// RFC 3339 timestamps are shown in local time; anything else verbatim.
pub fn display_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}

fn log_line(entry: &LogEntry) -> String {
    let mut line = String::new();
    if let Some(ts) = &entry.ts {
        line.push_str(&format!("[{}] ", display_timestamp(ts)));
    }
    if let Some(level) = &entry.level {
        line.push_str(&format!("{} ", level.to_uppercase()));
    }
    line.push_str(&entry.message);
    line
}

fn error_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    match &view.launch_error {
        Some(LaunchError::Invalid(errors)) => {
            lines.extend(
                errors
                    .iter()
                    .map(|err| format!("error[{}]: {}", err.code(), err)),
            );
        }
        Some(err) => lines.push(format!("error[{}]: {}", err.code(), err)),
        None => {}
    }
    if let Some(failure) = &view.stream_error {
        lines.push(format!("error[{}]: stream: {}", failure.code(), failure));
    }
    if let Some(failure) = &view.poll_error {
        lines.push(format!("error[{}]: status: {}", failure.code(), failure));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use applybot_core::{RequestFailure, ValidationError};
    use pretty_assertions::assert_eq;

    fn running_view(messages: &[&str]) -> AppViewModel {
        AppViewModel {
            run_state: RunState::Running,
            logs: messages.iter().map(|m| LogEntry::raw(*m)).collect(),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn each_log_entry_is_printed_once() {
        let mut renderer = Renderer::new();
        let first = renderer.render(&running_view(&["a"]));
        assert_eq!(first.len(), 2);
        assert_eq!(first[1], "a");

        let second = renderer.render(&running_view(&["a", "b", "c"]));
        assert_eq!(second, vec!["b".to_string(), "c".to_string()]);

        assert!(renderer.render(&running_view(&["a", "b", "c"])).is_empty());
    }

    #[test]
    fn cleared_log_restarts_the_cursor() {
        let mut renderer = Renderer::new();
        renderer.render(&running_view(&["old-1", "old-2"]));
        let lines = renderer.render(&running_view(&["new"]));
        assert_eq!(lines, vec!["new".to_string()]);
    }

    #[test]
    fn status_line_only_on_change() {
        let mut renderer = Renderer::new();
        let mut view = running_view(&[]);
        assert_eq!(renderer.render(&view).len(), 1);
        assert!(renderer.render(&view).is_empty());

        view.stats.applied_ok = 2;
        let lines = renderer.render(&view);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("applied 2"));
    }

    #[test]
    fn errors_carry_stable_codes() {
        let mut renderer = Renderer::new();
        let view = AppViewModel {
            launch_error: Some(LaunchError::Invalid(vec![
                ValidationError::SpecializationRequired,
                ValidationError::ResumeMissing,
            ])),
            stream_error: Some(RequestFailure::Timeout),
            ..AppViewModel::default()
        };
        let lines = renderer.render(&view);
        assert_eq!(
            lines[1..],
            [
                "error[launch.specialization_required]: specialization is required".to_string(),
                "error[launch.resume_missing]: a resume must be on file before launching"
                    .to_string(),
                "error[request.timeout]: stream: request timed out".to_string(),
            ]
        );
        assert!(renderer.render(&view).is_empty());
    }

    #[test]
    fn timestamps_fall_back_to_raw_text() {
        assert_eq!(display_timestamp("yesterday"), "yesterday");
        let shown = display_timestamp("2024-05-01T10:00:00Z");
        assert!(!shown.contains('T'));
        assert_eq!(shown.len(), "2024-05-01 10:00:00".len());
    }

    #[test]
    fn structured_log_lines_show_level() {
        let entry = LogEntry {
            ts: Some("09:00".to_string()),
            level: Some("warn".to_string()),
            message: "captcha".to_string(),
        };
        assert_eq!(log_line(&entry), "[09:00] WARN captcha");
    }
}
