//! Read-only status projection for uptime monitors
//!
//! Projects the watcher's run state into the shape external health checks
//! consume. Reads are atomic and tolerate being one event behind a sweep in
//! progress.

use serde::Serialize;

use super::RunState;

/// Liveness projection of the watcher's run state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatcherStatus {
    /// Always "UP" while the process can answer at all
    pub status: &'static str,

    /// Seconds since process start
    pub uptime_seconds: u64,

    /// ISO 8601 timestamp of the last completed sweep, or "Never"
    pub last_run: String,

    /// Highest consecutive-error count across enabled targets
    pub consecutive_errors: u32,

    /// Whether a sweep is currently in progress
    pub is_running: bool,
}

impl WatcherStatus {
    /// Project the current run state
    pub fn from_state(state: &RunState) -> Self {
        Self {
            status: "UP",
            uptime_seconds: state.uptime_secs(),
            last_run: state
                .last_run()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| String::from("Never")),
            consecutive_errors: state.max_consecutive_errors(),
            is_running: state.is_running(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_before_first_sweep() {
        let state = RunState::new(vec![String::from("madrid")]);
        let status = WatcherStatus::from_state(&state);

        assert_eq!(status.status, "UP");
        assert_eq!(status.last_run, "Never");
        assert_eq!(status.consecutive_errors, 0);
        assert!(!status.is_running);
    }

    #[test]
    fn test_status_reflects_completed_sweep() {
        let state = RunState::new(vec![String::from("madrid")]);
        state.mark_completed();

        let status = WatcherStatus::from_state(&state);
        assert_ne!(status.last_run, "Never");
        // rfc3339 timestamps parse back
        assert!(chrono::DateTime::parse_from_rfc3339(&status.last_run).is_ok());
    }

    #[test]
    fn test_status_projects_max_error_count() {
        let state = RunState::new(vec![String::from("madrid"), String::from("alicante")]);
        state.record_error(0);
        state.record_error(1);
        state.record_error(1);

        let status = WatcherStatus::from_state(&state);
        assert_eq!(status.consecutive_errors, 2);
    }

    #[test]
    fn test_status_serializes_expected_fields() {
        let state = RunState::new(Vec::new());
        let json = serde_json::to_string(&WatcherStatus::from_state(&state)).unwrap();

        assert!(json.contains("\"status\":\"UP\""));
        assert!(json.contains("\"lastRun\":\"Never\""));
        assert!(json.contains("\"isRunning\":false"));
        assert!(json.contains("\"uptimeSeconds\""));
        assert!(json.contains("\"consecutiveErrors\":0"));
    }
}
