use super::item::WorkItem;
use crate::error::{Error, Result};

use std::collections::VecDeque;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Multi-producer, single-consumer work queue of a pump.
///
/// Producers push from any thread; the pump thread pops and parks on the
/// condition variable when nothing is queued. The emptiness check and the
/// wait happen under the same lock, so a push can never slip in between
/// them and go unnoticed.
pub(crate) struct WorkQueue {
    inner: Mutex<Inner>,

    /// Signalled once per push.
    available: Condvar,

    /// Items accepted by `push`.
    posted: AtomicUsize,

    /// Times the consumer blocked on an empty queue.
    parks: AtomicUsize,
}

struct Inner {
    items: VecDeque<WorkItem>,

    /// Set once the pump has finished; further pushes are rejected.
    closed: bool,
}

impl WorkQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            available: Condvar::new(),
            posted: AtomicUsize::new(0),
            parks: AtomicUsize::new(0),
        }
    }

    // The lock is never held while user code runs, so a poisoned lock only
    // means a panic elsewhere; the queue itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item and wakes the consumer.
    ///
    /// Fails with [`Error::Closed`] once the pump has finished.
    pub(crate) fn push(&self, item: WorkItem) -> Result<()> {
        let mut inner = self.lock();

        if inner.closed {
            return Err(Error::Closed);
        }

        inner.items.push_back(item);
        drop(inner);

        self.posted.fetch_add(1, Ordering::Relaxed);
        self.available.notify_one();

        Ok(())
    }

    /// Puts an item ahead of everything already queued.
    ///
    /// Only the bootstrap item goes through here: work posted through a
    /// handle before the pump starts must not run before the operation.
    pub(crate) fn push_front(&self, item: WorkItem) -> Result<()> {
        let mut inner = self.lock();

        if inner.closed {
            return Err(Error::Closed);
        }

        inner.items.push_front(item);
        drop(inner);

        self.posted.fetch_add(1, Ordering::Relaxed);
        self.available.notify_one();

        Ok(())
    }

    /// Takes the next item, blocking while the queue is empty.
    pub(crate) fn pop(&self) -> WorkItem {
        let mut inner = self.lock();

        loop {
            if let Some(item) = inner.items.pop_front() {
                return item;
            }

            self.parks.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("pump queue empty, parking");

            inner = self
                .available
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Rejects further pushes and discards whatever is still queued.
    ///
    /// Returns the number of discarded items. They are dropped after the
    /// lock is released because dropping a future may wake another task.
    pub(crate) fn close(&self) -> usize {
        let leftover = {
            let mut inner = self.lock();
            inner.closed = true;
            mem::take(&mut inner.items)
        };

        leftover.len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub(crate) fn posted(&self) -> usize {
        self.posted.load(Ordering::Relaxed)
    }

    pub(crate) fn parks(&self) -> usize {
        self.parks.load(Ordering::Relaxed)
    }
}
