use super::driver;
use super::timer::{TimerEntry, TimerSlot};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Creates a future that completes after the given duration.
///
/// The wake-up comes from a background timer thread, so a pump driving
/// this future genuinely parks until the deadline and then receives the
/// resumption as a cross-thread post.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    Sleep::new(duration)
}

/// Future returned by [`sleep`].
///
/// The timer is registered on first poll. Dropping the future before the
/// deadline cancels the wake-up.
pub struct Sleep {
    deadline: Instant,

    /// Shared with the timer thread once registered.
    slot: Option<Arc<TimerSlot>>,
}

impl Sleep {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now() + duration,
            slot: None,
        }
    }

    /// The instant at which the future completes.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if Instant::now() >= this.deadline {
            return Poll::Ready(());
        }

        match &this.slot {
            // Fired early: the timer thread is unavailable. Keep yielding
            // until the deadline instead of waiting for a wake that never
            // comes.
            Some(slot) if slot.is_fired() => cx.waker().wake_by_ref(),
            Some(slot) => slot.set_waker(cx.waker()),
            None => {
                let slot = TimerSlot::new(cx.waker().clone());
                driver::register(TimerEntry {
                    deadline: this.deadline,
                    slot: slot.clone(),
                });
                this.slot = Some(slot);
            }
        }

        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        if let Some(slot) = &self.slot {
            slot.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sleep;
    use crate::time::timer::TimerSlot;

    use std::future::Future;
    use std::pin::pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Wake, Waker};
    use std::time::{Duration, Instant};

    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn early_fire_keeps_the_task_awake() {
        let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = Waker::from(counter.clone());
        let mut cx = Context::from_waker(&waker);

        let slot = TimerSlot::new(waker.clone());
        slot.fire();
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        let mut sleep = pin!(Sleep {
            deadline: Instant::now() + Duration::from_secs(60),
            slot: Some(slot),
        });

        assert!(sleep.as_mut().poll(&mut cx).is_pending());
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }
}
