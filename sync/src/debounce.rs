//! Debounced values.
//!
//! A [`Debouncer`] buffers rapid updates and publishes a settled value once
//! the input has been quiet for the configured delay. Dependent fetches key
//! off the settled value, never the raw one, so a burst of keystrokes costs
//! one fetch instead of one per key.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Timer debounce: emits the last raw value `delay` after the last update.
///
/// Each new update cancels the pending emission and restarts the quiet
/// period; intermediate values are never observable as settled. Dropping
/// the debouncer cancels any pending emission.
#[derive(Debug)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    settled: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let (input, mut rx) = mpsc::unbounded_channel::<T>();
        let (tx, settled) = watch::channel::<Option<T>>(None);

        let task = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                match pending.take() {
                    None => match rx.recv().await {
                        Some(value) => pending = Some(value),
                        None => return,
                    },
                    Some(value) => {
                        tokio::select! {
                            next = rx.recv() => match next {
                                // A newer raw value supersedes the pending
                                // one and restarts the quiet period.
                                Some(next) => pending = Some(next),
                                None => return,
                            },
                            () = tokio::time::sleep(delay) => {
                                if tx.send(Some(value)).is_err() {
                                    return;
                                }
                            }
                        }
                    }
                }
            }
        });

        Self {
            input,
            settled,
            task,
        }
    }

    /// Feed a new raw value.
    pub fn update(&self, value: T) {
        // Send fails only if the task is gone, which means we are shutting
        // down anyway.
        let _ = self.input.send(value);
    }

    /// Current settled value, if any emission has happened yet.
    #[must_use]
    pub fn settled(&self) -> Option<T> {
        self.settled.borrow().clone()
    }

    /// Subscribe to settled values.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.settled.clone()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn settles_to_the_last_value_of_a_burst() {
        let debouncer = Debouncer::new(DELAY);
        let mut rx = debouncer.subscribe();

        // Updates arriving faster than the delay.
        for value in ["s", "sk", "sku", "sku-9"] {
            debouncer.update(value);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        rx.changed().await.expect("debouncer alive");
        assert_eq!(*rx.borrow(), Some("sku-9"));

        // No intermediate value was ever observable as settled; the single
        // emission happened one full delay after the last update.
        assert_eq!(debouncer.settled(), Some("sku-9"));
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_input_emits_once_per_value() {
        let debouncer = Debouncer::new(DELAY);
        let mut rx = debouncer.subscribe();

        debouncer.update(1);
        rx.changed().await.expect("alive");
        assert_eq!(*rx.borrow(), Some(1));

        debouncer.update(2);
        rx.changed().await.expect("alive");
        assert_eq!(*rx.borrow(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_settles_before_the_quiet_period() {
        let debouncer = Debouncer::new(DELAY);

        debouncer.update("raw");
        tokio::time::sleep(DELAY - Duration::from_millis(1)).await;
        assert_eq!(debouncer.settled(), None);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(debouncer.settled(), Some("raw"));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_emission() {
        let debouncer = Debouncer::new(DELAY);
        let mut rx = debouncer.subscribe();

        debouncer.update("never");
        drop(debouncer);

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(*rx.borrow(), None);
        assert!(rx.changed().await.is_err());
    }
}
