#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, OnceLock};
use std::task::{Context, Poll, Waker};

pub fn init_tracing() {
    static ONCE: OnceLock<()> = OnceLock::new();
    ONCE.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AppError {
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Pump(#[from] syncpump::Error),
}

/// Completes once `count_down` has been called `count` times.
#[derive(Clone)]
pub struct Latch {
    inner: Arc<Mutex<LatchState>>,
}

struct LatchState {
    remaining: usize,
    waker: Option<Waker>,
}

impl Latch {
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LatchState {
                remaining: count,
                waker: None,
            })),
        }
    }

    pub fn count_down(&self) {
        let waker = {
            let mut state = self.inner.lock().unwrap();
            state.remaining = state.remaining.saturating_sub(1);
            if state.remaining == 0 {
                state.waker.take()
            } else {
                None
            }
        };

        if let Some(waker) = waker {
            waker.wake();
        }
    }

    pub fn wait(&self) -> LatchWait {
        LatchWait {
            latch: self.clone(),
        }
    }
}

pub struct LatchWait {
    latch: Latch,
}

impl Future for LatchWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut state = self.latch.inner.lock().unwrap();

        if state.remaining == 0 {
            return Poll::Ready(());
        }

        state.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

/// A future that never completes.
pub async fn pending_forever() {
    std::future::pending::<()>().await
}
