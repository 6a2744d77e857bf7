//! Task primitives.
//!
//! Every future the pump polls is a task: the driven operation itself and
//! any detached task spawned onto the pump. A task is split into a
//! [`TaskHeader`], shared with its wakers across threads, and the future,
//! which stays on the pump thread.
//!
//! The public surface of this module is the detached-task API:
//! [`spawn_detached`], [`spawn_detached_with`] and the default error
//! handler.

pub(crate) mod core;
pub(crate) mod state;
pub(crate) mod waker;

mod spawn;

pub(crate) use self::core::{LocalTask, TaskHeader, TaskRef};

pub use spawn::{
    clear_default_error_handler, set_default_error_handler, spawn_detached, spawn_detached_with,
};
