use super::sleep::sleep;
use crate::sync::CancelToken;

use std::future::{Future, poll_fn};
use std::pin::pin;
use std::task::Poll;
use std::time::Duration;

/// Waits for `duration` unless `token` is cancelled first.
///
/// Resolves to `true` when the full duration elapsed and to `false` when
/// the wait was cut short. Cancellation is an ordinary outcome here, not
/// an error.
///
/// # Examples
///
/// ```rust,ignore
/// let token = CancelToken::new();
///
/// if !delay(Duration::from_secs(5), &token).await {
///     return Ok(()); // shutting down
/// }
/// ```
pub async fn delay(duration: Duration, token: &CancelToken) -> bool {
    let mut cancelled = pin!(token.cancelled());
    let mut elapsed = pin!(sleep(duration));

    poll_fn(|cx| {
        if cancelled.as_mut().poll(cx).is_ready() {
            return Poll::Ready(false);
        }

        elapsed.as_mut().poll(cx).map(|()| true)
    })
    .await
}
