//! # syncpump
//!
//! **syncpump** runs an asynchronous operation to completion on the calling
//! thread. It is meant for the places that must not return before async
//! work has finished (a `main` function, a UI callback, a synchronous trait
//! method) but where that work still needs its continuations to run.
//!
//! Instead of handing the future to a thread pool, syncpump installs a
//! small single-threaded scheduler, the **pump**, on the calling thread.
//! Every resumption of the operation (waker calls, posted closures,
//! detached tasks) is queued on the pump and executed on that same thread.
//! The thread only sleeps while the queue is empty and the operation is
//! still pending.
//!
//! - **One thread**: all continuations run on the thread that called the
//!   driver, whatever thread woke them.
//! - **Transparent errors**: the operation's error comes back unchanged,
//!   and a panic inside the operation is resumed with its original payload
//!   once the pump has drained.
//! - **No nesting**: starting a pump on a thread that is already pumping
//!   fails with [`Error::Reentrant`] instead of deadlocking.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use syncpump::time::sleep;
//! use std::time::Duration;
//!
//! fn answer() -> Result<u32, syncpump::Error> {
//!     syncpump::run_sync_with_result(|| async {
//!         sleep(Duration::from_millis(50)).await;
//!         Ok(42)
//!     })
//! }
//! ```
//!
//! ## Modules
//!
//! - [`task`]: Detached tasks and their error handlers
//! - [`time`]: Sleep and cancellable delays
//! - [`sync`]: Cancellation tokens
//!
//! ## Getting Started
//!
//! Add syncpump to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! syncpump = { git = "https://github.com/Nebula-ecosystem/syncpump", package = "syncpump" }
//! ```

mod error;
mod runtime;
mod utils;

pub mod sync;
pub mod time;

pub use error::{Error, Result};
pub use runtime::builder::Builder;
pub use runtime::task;
pub use runtime::yield_now::yield_now;
pub use runtime::{
    PumpContext, PumpHandle, PumpStats, Runner, current, run_sync, run_sync_with_result,
};

pub use syncpump_macros::*;
