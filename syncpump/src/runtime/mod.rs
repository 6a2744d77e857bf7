//! Core runtime components.
//!
//! This module contains the pump itself and the driver built on it:
//! - [`pump`]: the single-threaded work queue and its drain loop,
//! - [`core`]: the driver that installs a pump and runs an operation,
//! - [`context`]: the thread-local ambient pump slot,
//! - [`task`]: tasks, wakers and detached spawning.

mod core;
mod pump;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod yield_now;

pub mod task;

pub use self::core::{Runner, run_sync, run_sync_with_result};
pub use context::current;
pub use pump::{PumpContext, PumpHandle, PumpStats};
