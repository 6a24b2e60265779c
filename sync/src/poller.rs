//! The generic polling primitive.
//!
//! A [`Poller`] runs a fetch on a fixed interval in a spawned task and
//! publishes the latest result through a `watch` channel. The state machine
//! per instance is `idle -> polling -> (stopped | terminal)`:
//!
//! - spawn: `idle -> polling`, with an immediate first fetch
//! - each tick: fetch, publish, consult the stop predicate
//! - stop predicate true: `polling -> terminal` (task ends; optionally the
//!   published value resets to `None` after a grace delay first)
//! - handle dropped or [`PollHandle::cancel`]: `* -> stopped`
//!
//! Fetch errors do not stop a poller. Under [`ErrorPolicy::KeepLast`] the
//! last good value stays published (stale-result tolerance); under
//! [`ErrorPolicy::FailOpen`] a designated fallback value is published
//! instead, so an unreachable check never locks anyone out.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What to publish when a fetch fails.
#[derive(Debug, Clone)]
pub enum ErrorPolicy<T> {
    /// Keep the last good value; just log and poll again next tick.
    KeepLast,
    /// Publish this value on every error (and keep polling).
    FailOpen(T),
}

#[derive(Debug, Clone)]
pub struct PollerConfig<T> {
    /// Name used in log output.
    pub name: &'static str,
    pub interval: Duration,
    pub on_error: ErrorPolicy<T>,
    /// After the stop predicate fires, wait this long and then reset the
    /// published value to `None` before the task ends.
    pub reset_after: Option<Duration>,
}

impl<T> PollerConfig<T> {
    #[must_use]
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            on_error: ErrorPolicy::KeepLast,
            reset_after: None,
        }
    }

    #[must_use]
    pub fn fail_open(mut self, fallback: T) -> Self {
        self.on_error = ErrorPolicy::FailOpen(fallback);
        self
    }

    #[must_use]
    pub fn reset_after(mut self, grace: Duration) -> Self {
        self.reset_after = Some(grace);
        self
    }
}

pub struct Poller;

impl Poller {
    /// Spawn a polling task. The first fetch happens immediately.
    ///
    /// `stop_when` is consulted on every successful fetch; returning true
    /// ends the poll loop (terminal state).
    pub fn spawn<T, E, F, Fut>(
        config: PollerConfig<T>,
        mut fetch: F,
        stop_when: impl Fn(&T) -> bool + Send + 'static,
    ) -> PollHandle<T>
    where
        T: Clone + Send + Sync + 'static,
        E: Display + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (tx, rx) = watch::channel::<Option<T>>(None);
        let name = config.name;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match fetch().await {
                    Ok(value) => {
                        let stop = stop_when(&value);
                        if tx.send(Some(value)).is_err() {
                            // Receiver side gone; nobody is watching.
                            return;
                        }
                        if stop {
                            tracing::debug!(poller = name, "Stop predicate hit; poll loop ending");
                            break;
                        }
                    }
                    Err(e) => match &config.on_error {
                        ErrorPolicy::KeepLast => {
                            tracing::warn!(poller = name, error = %e, "Poll fetch failed; keeping last value");
                        }
                        ErrorPolicy::FailOpen(fallback) => {
                            tracing::warn!(poller = name, error = %e, "Poll fetch failed; publishing fail-open value");
                            if tx.send(Some(fallback.clone())).is_err() {
                                return;
                            }
                        }
                    },
                }
            }

            if let Some(grace) = config.reset_after {
                tokio::time::sleep(grace).await;
                let _ = tx.send(None);
            }
        });

        PollHandle { latest: rx, task }
    }
}

/// Handle to a running poller. Dropping it cancels the task immediately;
/// no fetch fires after the drop.
#[derive(Debug)]
pub struct PollHandle<T> {
    latest: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone> PollHandle<T> {
    /// Most recently published value, if any fetch has succeeded yet
    /// (or a fail-open value was published).
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.latest.borrow().clone()
    }

    /// Subscribe to published values.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.latest.clone()
    }

    /// True while the poll loop is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Explicitly cancel the poll loop.
    pub fn cancel(self) {
        self.task.abort();
    }

    /// Wait for the poll loop to end on its own (stop predicate).
    pub async fn stopped(&mut self) {
        let _ = (&mut self.task).await;
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
