use std::sync::atomic::{AtomicUsize, Ordering};

/// Task is idle: polled at least once, waiting for a wake.
const IDLE: usize = 0;

/// Task has a `Wake` item in the pump queue.
const QUEUED: usize = 1;

/// Task is being polled on the pump thread.
const RUNNING: usize = 2;

/// Task was woken while it was being polled.
///
/// It is re-queued as soon as the current poll returns.
const NOTIFIED: usize = 3;

/// Task has resolved (or its poll panicked) and is never polled again.
const COMPLETED: usize = 4;

/// Scheduling state of a pumped task.
///
/// The state machine guarantees that at most one `Wake` item per task
/// sits in the queue, however many times the task is woken:
///
/// ```text
/// QUEUED -> RUNNING -> IDLE -> QUEUED ...
///              |
///              +-> NOTIFIED -> QUEUED
///              +-> COMPLETED
/// ```
pub(crate) struct State(AtomicUsize);

impl State {
    /// New tasks start queued: their first poll is already scheduled.
    pub(crate) fn new() -> Self {
        Self(AtomicUsize::new(QUEUED))
    }

    /// Claims the task for polling.
    ///
    /// Returns `false` when the task is not queued (already completed, or
    /// a stale wake), in which case it must not be polled.
    pub(crate) fn start_running(&self) -> bool {
        self.0
            .compare_exchange(QUEUED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Records that a poll returned `Pending`.
    ///
    /// Returns `true` when a wake arrived during the poll; the state is
    /// then moved back to `QUEUED` and the caller must enqueue the task.
    pub(crate) fn finish_pending(&self) -> bool {
        if self
            .0
            .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            return false;
        }

        self.0.store(QUEUED, Ordering::Release);
        true
    }

    /// Marks the task as finished.
    pub(crate) fn complete(&self) {
        self.0.store(COMPLETED, Ordering::Release);
    }

    /// Records a wake.
    ///
    /// Returns `true` when the caller must enqueue the task.
    pub(crate) fn notify(&self) -> bool {
        loop {
            match self.0.load(Ordering::Acquire) {
                IDLE => {
                    if self
                        .0
                        .compare_exchange(IDLE, QUEUED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return true;
                    }
                }
                RUNNING => {
                    if self
                        .0
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return false;
                    }
                }
                _ => return false,
            }
        }
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.0.load(Ordering::Acquire) == COMPLETED
    }
}
