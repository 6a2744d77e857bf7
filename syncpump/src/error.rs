//! Error definitions.
//!
//! These are the failures produced by the pump itself. Errors returned by
//! the driven future are never wrapped in this type: they reach the caller
//! unchanged.

use thiserror::Error;

/// Failures raised by the pump and its driver.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A driver call was made on a thread that is already pumping.
    ///
    /// Blocking the pump thread on a second pump would starve the first
    /// one, so the nested call is rejected instead.
    #[error("a pump is already active on this thread")]
    Reentrant,

    /// Synchronous dispatch was requested.
    #[error("synchronous dispatch is not supported: cannot send to the pump thread")]
    SendNotSupported,

    /// Work was posted to a pump that has finished running.
    #[error("the pump has finished running and no longer accepts work")]
    Closed,

    /// `run` was called a second time on a single-use context.
    #[error("the pump context has already been run")]
    AlreadyRun,

    /// `run` was called from a thread that does not own the context.
    #[error("the pump context can only be run by the thread that created it")]
    WrongThread,

    /// An ambient operation was attempted with no active pump.
    #[error("no pump is active on this thread")]
    NoContext,

    /// The operation finished without producing its value.
    #[error("the pump finished without a result")]
    MissingResult,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
