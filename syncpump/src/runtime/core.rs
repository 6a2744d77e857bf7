use super::builder::Builder;
use super::context;
use super::pump::PumpContext;
use crate::error::{Error, Result};

use std::future::Future;

/// Drives asynchronous operations to completion on the calling thread.
///
/// Each call creates a fresh [`PumpContext`], installs it as the thread's
/// ambient pump, drains it until the operation finishes, then restores
/// whatever pump was installed before. A `Runner` only carries
/// configuration and can be reused for any number of calls.
///
/// Use [`Builder`] to create one, or the free functions
/// [`run_sync`] and [`run_sync_with_result`] for the defaults.
#[derive(Debug, Clone)]
pub struct Runner {
    name: Option<String>,
    queue_capacity: usize,
}

impl Runner {
    pub(crate) fn new(name: Option<String>, queue_capacity: usize) -> Self {
        Self {
            name,
            queue_capacity,
        }
    }

    /// Runs the operation returned by `factory` to completion, blocking
    /// the current thread.
    ///
    /// The error produced by the operation is returned unchanged. Pump
    /// failures (such as [`Error::Reentrant`]) are converted into `E`.
    ///
    /// # Panics
    ///
    /// A panic raised by the operation is resumed here once the pump has
    /// drained, with its original payload.
    pub fn run_sync<F, Fut, E>(&self, factory: F) -> std::result::Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
        E: From<Error>,
    {
        self.run_sync_with_result(factory)
    }

    /// Runs the operation returned by `factory` to completion, blocking
    /// the current thread, and returns the value it produced.
    ///
    /// Same failure semantics as [`run_sync`](Self::run_sync).
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let value = Builder::new().build().run_sync_with_result(|| async {
    ///     sleep(Duration::from_millis(50)).await;
    ///     Ok::<_, syncpump::Error>(42)
    /// })?;
    /// ```
    pub fn run_sync_with_result<F, Fut, T, E>(&self, factory: F) -> std::result::Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: From<Error>,
    {
        self.drive(factory)?
    }

    /// Runs an infallible future to completion, blocking the current
    /// thread.
    ///
    /// This is the entry point used by `#[syncpump::main]` and
    /// `#[syncpump::test]`.
    ///
    /// # Panics
    ///
    /// Panics if the pump cannot run (for instance when called from inside
    /// another pump), and resumes any panic raised by the future.
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: Future,
    {
        match self.drive(|| future) {
            Ok(output) => output,
            Err(err) => panic!("block_on failed: {err}"),
        }
    }

    fn drive<F, Fut>(&self, factory: F) -> Result<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        if context::is_active() || context::current().is_some() {
            tracing::debug!("rejecting nested pump");
            return Err(Error::Reentrant);
        }

        let span = tracing::debug_span!("pump", name = self.name.as_deref().unwrap_or("anonymous"));
        let _span = span.enter();

        let pump = PumpContext::with_capacity(self.queue_capacity);
        let restore = context::enter(pump.handle());

        let output = pump.run(factory);

        drop(restore);
        tracing::debug!(stats = ?pump.stats(), "ambient pump restored");

        output
    }
}

impl Default for Runner {
    fn default() -> Self {
        Builder::new().build()
    }
}

/// Runs the operation returned by `factory` to completion on the calling
/// thread.
///
/// Shorthand for `Builder::new().build().run_sync(factory)`.
///
/// # Examples
///
/// ```rust,ignore
/// syncpump::run_sync(|| async {
///     save_settings().await?;
///     Ok::<_, AppError>(())
/// })?;
/// ```
pub fn run_sync<F, Fut, E>(factory: F) -> std::result::Result<(), E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<(), E>>,
    E: From<Error>,
{
    Runner::default().run_sync(factory)
}

/// Runs the operation returned by `factory` to completion on the calling
/// thread and returns its value.
///
/// Shorthand for `Builder::new().build().run_sync_with_result(factory)`.
pub fn run_sync_with_result<F, Fut, T, E>(factory: F) -> std::result::Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<Error>,
{
    Runner::default().run_sync_with_result(factory)
}
