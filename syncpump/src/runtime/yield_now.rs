use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future returned by [`yield_now`].
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded {
            return Poll::Ready(());
        }

        self.yielded = true;
        cx.waker().wake_by_ref();

        Poll::Pending
    }
}

/// Gives the pump a chance to run other queued work.
///
/// The calling task re-queues itself behind everything already posted and
/// resumes when the pump reaches it.
///
/// # Examples
///
/// ```rust,ignore
/// syncpump::run_sync(|| async {
///     pump.post(|| println!("runs first"))?;
///     yield_now().await;
///     Ok::<_, syncpump::Error>(())
/// })?;
/// ```
pub async fn yield_now() {
    YieldNow { yielded: false }.await
}
