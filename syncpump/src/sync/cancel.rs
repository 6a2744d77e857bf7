use crate::utils::Slab;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

/// A cloneable cancellation flag.
///
/// All clones observe the same flag. Cancelling is permanent and wakes
/// every task waiting on [`cancelled`](Self::cancelled).
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,

    /// Wakers of pending [`Cancelled`] futures, keyed by registration.
    waiters: Mutex<Slab<Waker>>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                waiters: Mutex::new(Slab::with_capacity(0)),
            }),
        }
    }

    /// Cancels the token and wakes all waiters. Idempotent.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        let waiters = self.waiters().drain();

        for waker in waiters {
            waker.wake();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Returns a future that resolves once the token is cancelled.
    pub fn cancelled(&self) -> Cancelled<'_> {
        Cancelled {
            token: self,
            key: None,
        }
    }

    fn waiters(&self) -> MutexGuard<'_, Slab<Waker>> {
        self.inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Future returned by [`CancelToken::cancelled`].
///
/// The waker registered by a pending poll is removed again when the
/// future is dropped.
pub struct Cancelled<'a> {
    token: &'a CancelToken,

    /// Slot of this future's waker in the token's waiter list.
    key: Option<usize>,
}

impl Cancelled<'_> {
    fn unregister(&mut self) {
        if let Some(key) = self.key.take() {
            self.token.waiters().remove(key);
        }
    }
}

impl Future for Cancelled<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.token.is_cancelled() {
            // `cancel` already drained the list.
            this.key = None;
            return Poll::Ready(());
        }

        {
            let mut waiters = this.token.waiters();

            match this.key.and_then(|key| waiters.get_mut(key)) {
                Some(waker) => {
                    if !waker.will_wake(cx.waker()) {
                        *waker = cx.waker().clone();
                    }
                }
                None => this.key = Some(waiters.insert(cx.waker().clone())),
            }
        }

        // Registered before re-checking, so a concurrent cancel either
        // sees the waker or is seen here.
        if this.token.is_cancelled() {
            this.unregister();
            return Poll::Ready(());
        }

        Poll::Pending
    }
}

impl Drop for Cancelled<'_> {
    fn drop(&mut self) {
        // After a cancel the key may point into a refilled list.
        if self.token.is_cancelled() {
            return;
        }

        self.unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;
    use crate::time::delay;

    use std::future::Future;
    use std::pin::pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll, Wake, Waker};
    use std::time::Duration;

    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn cancel_wakes_pending_waiters() {
        let token = CancelToken::new();
        let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = Waker::from(counter.clone());
        let mut cx = Context::from_waker(&waker);

        let mut cancelled = pin!(token.cancelled());
        assert!(cancelled.as_mut().poll(&mut cx).is_pending());
        assert!(cancelled.as_mut().poll(&mut cx).is_pending());

        token.clone().cancel();

        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert_eq!(cancelled.as_mut().poll(&mut cx), Poll::Ready(()));
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();

        token.cancel();
        token.cancel();

        assert!(token.is_cancelled());
        assert!(format!("{token:?}").contains("true"));
    }

    #[test]
    fn dropped_waiter_is_unregistered() {
        let token = CancelToken::new();
        let mut cx = Context::from_waker(Waker::noop());

        {
            let mut cancelled = pin!(token.cancelled());
            assert!(cancelled.as_mut().poll(&mut cx).is_pending());
            assert!(cancelled.as_mut().poll(&mut cx).is_pending());
            assert_eq!(token.waiters().len(), 1);
        }

        assert_eq!(token.waiters().len(), 0);
    }

    #[test]
    fn completed_delays_leave_no_waiters_behind() {
        let token = CancelToken::new();

        for _ in 0..20 {
            let elapsed = crate::run_sync_with_result(|| async {
                Ok::<_, crate::Error>(delay(Duration::from_millis(1), &token).await)
            });
            assert_eq!(elapsed, Ok(true));
        }

        assert_eq!(token.waiters().len(), 0);
        assert!(!token.is_cancelled());
    }
}
