use super::item::WorkItem;
use super::queue::WorkQueue;
use crate::error::{Error, Result};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A cloneable, thread-safe handle used to post work to a pump.
///
/// Handles are how anything outside the pump thread (I/O callbacks, timer
/// threads, worker threads) hands continuations back to the operation the
/// pump is driving. Posting never blocks and never runs the work inline.
#[derive(Clone)]
pub struct PumpHandle {
    queue: Arc<WorkQueue>,
}

impl PumpHandle {
    pub(crate) fn new(queue: Arc<WorkQueue>) -> Self {
        Self { queue }
    }

    /// Queues `work` to run on the pump thread.
    ///
    /// Items posted from the same thread run in posting order. No order is
    /// guaranteed between items posted from different threads.
    ///
    /// A panic inside `work` is not caught by the pump: it unwinds out of
    /// the driver call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] once the pump has finished running.
    pub fn post<F>(&self, work: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        tracing::trace!("posting continuation");
        self.queue.push(WorkItem::Continuation(Box::new(work)))
    }

    /// Synchronous dispatch. Always rejected.
    ///
    /// Running `work` inline would silently move it off the pump thread,
    /// and waiting for the pump to run it from the pump thread itself would
    /// never return.
    ///
    /// # Errors
    ///
    /// Always returns [`Error::SendNotSupported`].
    pub fn send<F>(&self, work: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        drop(work);
        Err(Error::SendNotSupported)
    }

    /// Queues a detached future on the pump.
    ///
    /// The future is polled on the pump thread only, and is dropped if the
    /// driven operation finishes first. Its panics are not caught.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Closed`] once the pump has finished running.
    pub fn spawn<F>(&self, future: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.queue.push(WorkItem::Spawn(Box::pin(future)))
    }

    /// Whether the pump has finished and rejects new work.
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Whether both handles point to the same pump.
    pub fn same_pump(&self, other: &PumpHandle) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }
}

impl fmt::Debug for PumpHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PumpHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}
