//! Time utilities.
//!
//! Timers are served by a single background thread started on first use.
//! Their wake-ups reach the pump like any other cross-thread post.
//!
//! It includes:
//! - [`sleep`] for waiting a fixed duration,
//! - [`delay`] for a wait that can be cut short by a
//!   [`CancelToken`](crate::sync::CancelToken).

mod delay;
mod driver;
mod sleep;
mod timer;

#[doc(inline)]
pub use delay::delay;

#[doc(inline)]
pub use sleep::{Sleep, sleep};
