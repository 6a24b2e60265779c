//! The three poller instantiations.
//!
//! Each watcher is a thin parameterization of [`Poller`] over an
//! [`ApiClient`] fetch. They differ only in interval, stop condition, and
//! error policy:
//!
//! | watcher | interval | stops | on error |
//! |---|---|---|---|
//! | [`MaintenanceWatch`] | 60 s | never (while held) | fail-open: publish `false` |
//! | [`JobWatch`] | 3 s | terminal job status | keep last value |
//! | [`TypingWatch`] | 8 s | never (while held) | keep last value |

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use vantage_client::ApiClient;
use vantage_types::{JobId, JobStatus, TicketId, TypingStatus};

use crate::poller::{PollHandle, Poller, PollerConfig};

/// Grace delay between a job reaching a terminal state and the watch
/// resetting to idle.
pub const JOB_RESET_GRACE: Duration = Duration::from_secs(2);

/// Polls `GET /auth/system-status` while held (typically for the lifetime
/// of the app shell). An unreachable backend is treated as "not in
/// maintenance" so an outage of the status endpoint never locks users out.
pub struct MaintenanceWatch {
    handle: PollHandle<bool>,
}

impl MaintenanceWatch {
    #[must_use]
    pub fn spawn(client: Arc<ApiClient>, interval: Duration) -> Self {
        let handle = Poller::spawn(
            PollerConfig::new("maintenance", interval).fail_open(false),
            move || {
                let client = Arc::clone(&client);
                async move {
                    client
                        .system_status()
                        .await
                        .map(|status| status.maintenance_mode)
                }
            },
            |_| false,
        );
        Self { handle }
    }

    /// Current maintenance flag; `false` until the first poll answers.
    #[must_use]
    pub fn maintenance_mode(&self) -> bool {
        self.handle.latest().unwrap_or(false)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<bool>> {
        self.handle.subscribe()
    }
}

/// Polls a job's status until it reaches `completed` or `failed`, then
/// resets to idle after [`JOB_RESET_GRACE`].
pub struct JobWatch {
    handle: PollHandle<JobStatus>,
}

impl JobWatch {
    #[must_use]
    pub fn spawn(client: Arc<ApiClient>, job: JobId, interval: Duration) -> Self {
        let handle = Poller::spawn(
            PollerConfig::new("job-status", interval).reset_after(JOB_RESET_GRACE),
            move || {
                let client = Arc::clone(&client);
                let job = job.clone();
                async move { client.job_status(&job).await }
            },
            |status: &JobStatus| status.status.is_terminal(),
        );
        Self { handle }
    }

    /// Latest observed status; `None` before the first poll and again once
    /// the watch has reset after a terminal state.
    #[must_use]
    pub fn latest(&self) -> Option<JobStatus> {
        self.handle.latest()
    }

    /// True while the job is still being polled.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.handle.is_active()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<JobStatus>> {
        self.handle.subscribe()
    }

    /// Wait until the job reaches a terminal state and return it.
    ///
    /// Returns `None` if the poller ends without a terminal status (only
    /// possible through cancellation).
    pub async fn wait_terminal(&self) -> Option<JobStatus> {
        let mut rx = self.handle.subscribe();
        loop {
            let current = rx.borrow().clone();
            if let Some(status) = current {
                if status.status.is_terminal() {
                    return Some(status);
                }
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }
}

/// Polls the typing indicator of a support ticket while the conversation
/// is open (i.e. while this watch is held).
pub struct TypingWatch {
    handle: PollHandle<TypingStatus>,
}

impl TypingWatch {
    #[must_use]
    pub fn spawn(client: Arc<ApiClient>, ticket: TicketId, interval: Duration) -> Self {
        let handle = Poller::spawn(
            PollerConfig::new("typing", interval),
            move || {
                let client = Arc::clone(&client);
                let ticket = ticket.clone();
                async move { client.typing_status(&ticket).await }
            },
            |_| false,
        );
        Self { handle }
    }

    #[must_use]
    pub fn latest(&self) -> Option<TypingStatus> {
        self.handle.latest()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<TypingStatus>> {
        self.handle.subscribe()
    }
}
