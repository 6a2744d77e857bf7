use super::handle::PumpHandle;
use super::item::{BoxFuture, WorkItem};
use super::queue::WorkQueue;
use crate::error::{Error, Result};
use crate::runtime::context;
use crate::runtime::task::waker::waker_for;
use crate::runtime::task::{LocalTask, TaskHeader, TaskRef};
use crate::utils::Slab;

use std::any::Any;
use std::cell::Cell;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread::{self, ThreadId};

/// Initial capacity of the work queue.
pub(crate) const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Counters describing a pump run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Items accepted by the queue, bootstrap and sentinel included.
    pub posted: usize,

    /// Items taken from the queue and executed.
    pub executed: usize,

    /// Times the pump thread blocked on an empty queue.
    pub parks: usize,
}

/// A single-threaded, single-use scheduler.
///
/// A `PumpContext` owns a work queue and drains it on the thread that
/// created it until the operation it drives has finished. Work reaches
/// the queue through [`PumpHandle`]s and through the wakers the pump hands
/// to the futures it polls, from any thread.
///
/// Most callers use [`run_sync`](crate::run_sync) instead, which also
/// installs the context as the thread's ambient pump.
///
/// # Examples
///
/// ```rust,ignore
/// let pump = PumpContext::new();
/// let value = pump.run(|| async { 6 * 7 })?;
/// assert_eq!(value, 42);
/// assert_eq!(pump.stats().parks, 0);
/// ```
pub struct PumpContext {
    queue: Arc<WorkQueue>,

    /// Thread that created the context; the only one allowed to run it.
    owner: ThreadId,

    started: Cell<bool>,
    executed: Cell<usize>,
}

impl PumpContext {
    /// Creates a context owned by the current thread.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Arc::new(WorkQueue::with_capacity(capacity)),
            owner: thread::current().id(),
            started: Cell::new(false),
            executed: Cell::new(0),
        }
    }

    /// Returns a handle for posting work to this context.
    pub fn handle(&self) -> PumpHandle {
        PumpHandle::new(self.queue.clone())
    }

    /// Returns the counters of this context.
    pub fn stats(&self) -> PumpStats {
        PumpStats {
            posted: self.queue.posted(),
            executed: self.executed.get(),
            parks: self.queue.parks(),
        }
    }

    /// Drives the future produced by `factory` to completion on the
    /// calling thread and returns its output.
    ///
    /// `factory` is invoked by the first queued item, ahead of anything
    /// posted through a handle before `run` was called. Every resumption of
    /// the future goes back through the queue, and the calling thread only
    /// blocks while the queue is empty and the future has not finished.
    ///
    /// A panic raised by `factory` or by polling its future is held until
    /// the queue has been drained up to the completion marker, then resumed
    /// here with its original payload. A panic raised by any other item
    /// unwinds out of `run` immediately.
    ///
    /// # Errors
    ///
    /// - [`Error::WrongThread`] when called off the creating thread.
    /// - [`Error::AlreadyRun`] on a second call.
    /// - [`Error::Reentrant`] when another pump is draining on this thread.
    pub fn run<F, Fut>(&self, factory: F) -> Result<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        if thread::current().id() != self.owner {
            return Err(Error::WrongThread);
        }

        if self.started.replace(true) {
            return Err(Error::AlreadyRun);
        }

        let _active = context::activate()?;
        let _close = CloseOnExit(&self.queue);

        let mut root = RootTask::new(factory, TaskHeader::new(TaskRef::Root, self.queue.clone()));
        let mut locals: Slab<LocalTask> = Slab::with_capacity(0);

        self.queue.push_front(WorkItem::Bootstrap)?;
        tracing::debug!("bootstrap queued, draining");

        loop {
            let item = self.queue.pop();
            self.executed.set(self.executed.get() + 1);

            match item {
                WorkItem::Bootstrap => root.poll(&self.queue)?,
                WorkItem::Wake(header) => match header.target() {
                    TaskRef::Root => root.poll(&self.queue)?,
                    TaskRef::Local(key) => poll_local(&mut locals, key, &header),
                },
                WorkItem::Spawn(future) => self.spawn_local(&mut locals, future),
                WorkItem::Continuation(work) => work(),
                WorkItem::Sentinel => break,
            }
        }

        let discarded = self.queue.close();
        let abandoned = locals.len();
        drop(locals);

        tracing::debug!(
            executed = self.executed.get(),
            discarded,
            abandoned,
            faulted = root.fault.is_some(),
            "pump drained"
        );

        root.finish()
    }

    fn spawn_local(&self, locals: &mut Slab<LocalTask>, future: BoxFuture) {
        let key = locals.vacant_key();
        let header = TaskHeader::new(TaskRef::Local(key), self.queue.clone());

        let key = locals.insert(LocalTask::new(header.clone(), future));
        tracing::trace!(key, "detached task registered");

        poll_local(locals, key, &header);
    }
}

impl Default for PumpContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Polls the local task behind `header`, dropping it once finished.
fn poll_local(locals: &mut Slab<LocalTask>, key: usize, header: &Arc<TaskHeader>) {
    let Some(task) = locals.get_mut(key) else {
        return;
    };

    // A stale wake must not poll whichever task reused the key.
    if !Arc::ptr_eq(task.header(), header) {
        return;
    }

    if task.poll() {
        locals.remove(key);
        tracing::trace!(key, "detached task finished");
    }
}

/// The operation driven by a pump.
///
/// Holds the result cell and the captured panic of the run.
struct RootTask<F, Fut: Future> {
    factory: Option<F>,
    future: Option<Pin<Box<Fut>>>,
    header: Arc<TaskHeader>,

    /// Written when the future resolves, before the sentinel is posted.
    output: Option<Fut::Output>,

    /// Panic payload caught while creating or polling the future.
    fault: Option<Box<dyn Any + Send + 'static>>,
}

impl<F, Fut> RootTask<F, Fut>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    fn new(factory: F, header: Arc<TaskHeader>) -> Self {
        Self {
            factory: Some(factory),
            future: None,
            header,
            output: None,
            fault: None,
        }
    }

    fn poll(&mut self, queue: &WorkQueue) -> Result<()> {
        if !self.header.state.start_running() {
            return Ok(());
        }

        let waker = waker_for(&self.header);
        let mut cx = Context::from_waker(&waker);

        let factory = self.factory.take();
        let slot = &mut self.future;

        let polled = panic::catch_unwind(AssertUnwindSafe(|| {
            let future = match factory {
                Some(factory) => slot.insert(Box::pin(factory())),
                None => match slot.as_mut() {
                    Some(future) => future,
                    None => return Poll::Pending,
                },
            };

            future.as_mut().poll(&mut cx)
        }));

        match polled {
            Ok(Poll::Pending) => {
                if self.header.state.finish_pending() {
                    self.header.enqueue();
                }
                Ok(())
            }
            Ok(Poll::Ready(output)) => {
                tracing::debug!("operation completed");
                self.output = Some(output);
                self.complete(queue)
            }
            Err(payload) => {
                tracing::debug!("operation faulted");
                self.fault = Some(payload);
                self.complete(queue)
            }
        }
    }

    fn complete(&mut self, queue: &WorkQueue) -> Result<()> {
        self.header.state.complete();
        self.future = None;

        queue.push(WorkItem::Sentinel)
    }

    fn finish(self) -> Result<Fut::Output> {
        if let Some(payload) = self.fault {
            panic::resume_unwind(payload);
        }

        self.output.ok_or(Error::MissingResult)
    }
}

/// Closes the queue when a run ends, whether it returns or unwinds.
struct CloseOnExit<'a>(&'a WorkQueue);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}
