//! Long-running job status.

use serde::{Deserialize, Serialize};

use crate::JobId;

/// Lifecycle state of a server-side background job.
///
/// `Completed` and `Failed` are terminal: once a poller observes one of
/// them, no further transitions occur and polling stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Response of `GET /api/v1/seller/jobs/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_id: JobId,
    pub status: JobState,
    /// Percent complete, 0-100.
    pub progress: u8,
    pub total_asins: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running.is_terminal());
    }

    #[test]
    fn parses_backend_payload() {
        let json = r#"{"job_id":"fc-123","status":"running","progress":40,"total_asins":250}"#;
        let status: JobStatus = serde_json::from_str(json).expect("parse job status");
        assert_eq!(status.status, JobState::Running);
        assert_eq!(status.progress, 40);
        assert_eq!(status.job_id.as_str(), "fc-123");
    }
}
