use super::core::TaskHeader;

use std::sync::Arc;
use std::task::{Wake, Waker};

/// Wakers handed to pumped futures.
///
/// Waking never runs the task inline: it posts a `Wake` item to the owning
/// pump, whichever thread the wake comes from.
impl Wake for TaskHeader {
    fn wake(self: Arc<Self>) {
        self.schedule();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.schedule();
    }
}

/// Creates a [`Waker`] that reschedules the task behind `header`.
pub(crate) fn waker_for(header: &Arc<TaskHeader>) -> Waker {
    Waker::from(header.clone())
}
