use super::state::State;
use super::waker::waker_for;
use crate::runtime::pump::item::{BoxFuture, WorkItem};
use crate::runtime::pump::queue::WorkQueue;

use std::sync::Arc;
use std::task::{Context, Poll};

/// Identifies which future a wake belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TaskRef {
    /// The operation driven by the pump.
    Root,

    /// A detached task, keyed into the pump's local slab.
    Local(usize),
}

/// Scheduling half of a pumped task.
///
/// The header is what wakers hold on to: it knows the task's state and the
/// queue to post `Wake` items to. The future itself never leaves the pump
/// thread.
pub(crate) struct TaskHeader {
    target: TaskRef,

    pub(crate) state: State,

    /// Queue of the pump that owns the task.
    queue: Arc<WorkQueue>,
}

impl TaskHeader {
    pub(crate) fn new(target: TaskRef, queue: Arc<WorkQueue>) -> Arc<Self> {
        Arc::new(Self {
            target,
            state: State::new(),
            queue,
        })
    }

    pub(crate) fn target(&self) -> TaskRef {
        self.target
    }

    /// Handles a wake coming from any thread.
    pub(crate) fn schedule(self: &Arc<Self>) {
        if self.state.notify() {
            self.enqueue();
        }
    }

    /// Posts a `Wake` item for this task.
    ///
    /// A pump that already finished rejects the item; the wake is dropped
    /// since nothing is left to resume.
    pub(crate) fn enqueue(self: &Arc<Self>) {
        if let Err(err) = self.queue.push(WorkItem::Wake(self.clone())) {
            tracing::trace!(task = ?self.target, %err, "dropping wake for finished pump");
        }
    }
}

/// A detached task owned by a pump.
///
/// Local tasks are polled only on the pump thread, through `Spawn` and
/// `Wake` items. Their panics are not caught.
pub(crate) struct LocalTask {
    header: Arc<TaskHeader>,
    future: BoxFuture,
}

impl LocalTask {
    pub(crate) fn new(header: Arc<TaskHeader>, future: BoxFuture) -> Self {
        Self { header, future }
    }

    pub(crate) fn header(&self) -> &Arc<TaskHeader> {
        &self.header
    }

    /// Polls the task once. Returns `true` once it has finished.
    pub(crate) fn poll(&mut self) -> bool {
        if !self.header.state.start_running() {
            return self.header.state.is_completed();
        }

        let waker = waker_for(&self.header);
        let mut cx = Context::from_waker(&waker);

        match self.future.as_mut().poll(&mut cx) {
            Poll::Ready(()) => {
                self.header.state.complete();
                true
            }
            Poll::Pending => {
                if self.header.state.finish_pending() {
                    self.header.enqueue();
                }
                false
            }
        }
    }
}
