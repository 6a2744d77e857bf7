//! Synchronization primitives.
//!
//! - [`CancelToken`]: a shared cancellation flag that tasks can await.

mod cancel;

pub use cancel::{CancelToken, Cancelled};
