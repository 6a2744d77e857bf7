use crate::error::{Error, Result};
use crate::runtime::context::current;

use std::error::Error as StdError;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide handler for errors of detached tasks.
type ErrorHandler = Arc<dyn Fn(&(dyn StdError + 'static)) + Send + Sync>;

static DEFAULT_HANDLER: RwLock<Option<ErrorHandler>> = RwLock::new(None);

/// Installs the process-wide handler for errors of detached tasks.
///
/// The handler runs on the pump thread, after the per-task handler given
/// to [`spawn_detached_with`] (if any). It replaces any previous handler.
///
/// # Examples
///
/// ```rust,ignore
/// task::set_default_error_handler(|err| eprintln!("background task failed: {err}"));
/// ```
pub fn set_default_error_handler<H>(handler: H)
where
    H: Fn(&(dyn StdError + 'static)) + Send + Sync + 'static,
{
    *DEFAULT_HANDLER
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
}

/// Removes the process-wide handler installed by
/// [`set_default_error_handler`].
pub fn clear_default_error_handler() {
    *DEFAULT_HANDLER
        .write()
        .unwrap_or_else(PoisonError::into_inner) = None;
}

/// Runs `future` on the current pump without waiting for it.
///
/// An `Err` produced by the future goes to the default error handler, or
/// is logged when none is installed. The task is dropped if the pump
/// finishes before it does.
///
/// # Errors
///
/// Returns [`Error::NoContext`] when called outside a pump, and
/// [`Error::Closed`] when the current pump is shutting down.
pub fn spawn_detached<F, E>(future: F) -> Result<()>
where
    F: Future<Output = std::result::Result<(), E>> + Send + 'static,
    E: StdError + Send + 'static,
{
    spawn_reporting(future, None::<fn(&E)>)
}

/// Like [`spawn_detached`], but hands an `Err` to `on_error` first.
///
/// The default error handler, if installed, is still invoked afterwards.
///
/// # Errors
///
/// Same as [`spawn_detached`].
pub fn spawn_detached_with<F, E, H>(future: F, on_error: H) -> Result<()>
where
    F: Future<Output = std::result::Result<(), E>> + Send + 'static,
    E: StdError + Send + 'static,
    H: FnOnce(&E) + Send + 'static,
{
    spawn_reporting(future, Some(on_error))
}

fn spawn_reporting<F, E, H>(future: F, on_error: Option<H>) -> Result<()>
where
    F: Future<Output = std::result::Result<(), E>> + Send + 'static,
    E: StdError + Send + 'static,
    H: FnOnce(&E) + Send + 'static,
{
    let handle = current().ok_or(Error::NoContext)?;

    handle.spawn(async move {
        if let Err(err) = future.await {
            report(&err, on_error);
        }
    })
}

fn report<E, H>(err: &E, on_error: Option<H>)
where
    E: StdError + 'static,
    H: FnOnce(&E),
{
    let handled = on_error.is_some();

    if let Some(on_error) = on_error {
        on_error(err);
    }

    let default = DEFAULT_HANDLER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    match default {
        Some(handler) => handler(err),
        None if !handled => tracing::warn!(error = %err, "detached task failed"),
        None => {}
    }
}
