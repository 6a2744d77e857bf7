use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::Waker;
use std::time::Instant;

/// State shared between a sleeping future and the timer thread.
pub(crate) struct TimerSlot {
    /// Set when the future was dropped before its deadline.
    cancelled: AtomicBool,

    /// Set once the deadline has been reached.
    fired: AtomicBool,

    /// Waker of the most recent poll.
    waker: Mutex<Waker>,
}

impl TimerSlot {
    pub(crate) fn new(waker: Waker) -> Arc<Self> {
        Arc::new(Self {
            cancelled: AtomicBool::new(false),
            fired: AtomicBool::new(false),
            waker: Mutex::new(waker),
        })
    }

    /// Replaces the stored waker when the future moved to another task.
    pub(crate) fn set_waker(&self, waker: &Waker) {
        {
            let mut current = self.waker.lock().unwrap_or_else(PoisonError::into_inner);
            if current.will_wake(waker) {
                return;
            }
            *current = waker.clone();
        }

        // The timer may have fired with the old waker in between.
        if self.fired.load(AtomicOrdering::Acquire) {
            waker.wake_by_ref();
        }
    }

    /// Stops the slot from firing and releases the stored waker.
    ///
    /// The entry itself stays in the timer heap until its deadline.
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, AtomicOrdering::Release);
        *self.waker.lock().unwrap_or_else(PoisonError::into_inner) = Waker::noop().clone();
    }

    pub(crate) fn is_fired(&self) -> bool {
        self.fired.load(AtomicOrdering::Acquire)
    }

    /// Wakes the sleeping future unless it was dropped.
    pub(crate) fn fire(&self) {
        if self.cancelled.load(AtomicOrdering::Acquire) {
            return;
        }

        self.fired.store(true, AtomicOrdering::Release);
        self.waker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .wake_by_ref();
    }
}

/// An entry in the timer heap.
pub(crate) struct TimerEntry {
    pub(crate) deadline: Instant,
    pub(crate) slot: Arc<TimerSlot>,
}

impl Eq for TimerEntry {}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline.eq(&other.deadline)
    }
}

impl Ord for TimerEntry {
    /// Reversed so that a `BinaryHeap<TimerEntry>` pops the earliest
    /// deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.deadline.cmp(&self.deadline)
    }
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
