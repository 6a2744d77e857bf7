//! The synchronous task pump.
//!
//! A pump is a single-threaded scheduler: a work queue drained by exactly
//! one thread until the operation it drives has finished.
//!
//! It is composed of:
//! - [`item`]: the kinds of work that can be queued,
//! - [`queue`]: the multi-producer queue and its blocking signal,
//! - [`handle`]: the thread-safe posting side,
//! - [`core`]: the drain loop.

pub(crate) mod core;
pub(crate) mod handle;
pub(crate) mod item;
pub(crate) mod queue;

pub use self::core::{PumpContext, PumpStats};
pub use handle::PumpHandle;
