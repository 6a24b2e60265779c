//! Background coordination for the Vantage client: polling and debounce.
//!
//! The temporal behavior of the app lives here, not in UI code:
//!
//! - [`Poller`] - one parameterized polling primitive (interval, stop
//!   predicate, on-error policy) instead of per-feature timer loops
//! - [`MaintenanceWatch`] / [`JobWatch`] / [`TypingWatch`] - the three
//!   instantiations of the primitive
//! - [`Debouncer`] - settles rapidly-changing filter input so dependent
//!   fetches key off a stable value
//!
//! Every spawned task is tied to a handle; dropping the handle cancels the
//! task, and no tick fires after cancellation.

mod debounce;
mod poller;
mod watchers;

pub use debounce::Debouncer;
pub use poller::{ErrorPolicy, PollHandle, Poller, PollerConfig};
pub use watchers::{JobWatch, MaintenanceWatch, TypingWatch};
