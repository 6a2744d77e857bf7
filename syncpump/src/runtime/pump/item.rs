use crate::runtime::task::TaskHeader;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A detached future handed to the pump.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A posted closure.
pub(crate) type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// One unit of deferred work in a pump queue.
pub(crate) enum WorkItem {
    /// Starts the driven operation. Always the first item of a run.
    Bootstrap,

    /// A waker fired; re-poll the task it belongs to.
    Wake(Arc<TaskHeader>),

    /// Registers a detached task with the pump and polls it.
    Spawn(BoxFuture),

    /// An arbitrary closure posted through a [`PumpHandle`](super::PumpHandle).
    Continuation(Continuation),

    /// The driven operation has finished; stop draining.
    Sentinel,
}

impl fmt::Debug for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkItem::Bootstrap => f.write_str("Bootstrap"),
            WorkItem::Wake(header) => f.debug_tuple("Wake").field(&header.target()).finish(),
            WorkItem::Spawn(_) => f.write_str("Spawn"),
            WorkItem::Continuation(_) => f.write_str("Continuation"),
            WorkItem::Sentinel => f.write_str("Sentinel"),
        }
    }
}
