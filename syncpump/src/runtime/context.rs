use crate::error::{Error, Result};
use crate::runtime::pump::PumpHandle;

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;

thread_local! {
    /// Ambient scheduler: the pump installed by the driver running on
    /// this thread, if any.
    ///
    /// Runtime pieces that need to post work without being handed a
    /// handle (detached spawns, for instance) read it through [`current`].
    static CURRENT_PUMP: RefCell<Option<PumpHandle>> = const { RefCell::new(None) };

    /// Whether a pump is currently draining on this thread.
    static PUMP_ACTIVE: Cell<bool> = const { Cell::new(false) };
}

/// Returns a handle to the pump installed on the current thread.
///
/// Returns `None` outside of [`run_sync`](crate::run_sync) and friends.
///
/// # Examples
///
/// ```rust,ignore
/// syncpump::run_sync(|| async {
///     let pump = syncpump::current().expect("inside a pump");
///     pump.post(|| println!("runs on the pump thread"))?;
///     Ok::<_, syncpump::Error>(())
/// })?;
/// ```
pub fn current() -> Option<PumpHandle> {
    CURRENT_PUMP.with(|cell| cell.borrow().clone())
}

/// Replaces the ambient pump and returns the previous one.
fn set_current(handle: Option<PumpHandle>) -> Option<PumpHandle> {
    CURRENT_PUMP.with(|cell| cell.replace(handle))
}

/// Installs `handle` as the ambient pump until the returned guard drops.
///
/// The previous value is restored when the guard is dropped, including
/// while unwinding.
pub(crate) fn enter(handle: PumpHandle) -> EnterGuard {
    EnterGuard {
        previous: Some(set_current(Some(handle))),
        _not_send: PhantomData,
    }
}

/// Restores the previous ambient pump on drop.
pub(crate) struct EnterGuard {
    previous: Option<Option<PumpHandle>>,

    /// The guard refers to this thread's slot.
    _not_send: PhantomData<*const ()>,
}

impl Drop for EnterGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            // The slot may already be gone during thread teardown.
            let _ = CURRENT_PUMP.try_with(|cell| cell.replace(previous));
        }
    }
}

/// Marks the current thread as draining a pump.
///
/// Fails with [`Error::Reentrant`] when a pump is already draining here.
pub(crate) fn activate() -> Result<ActiveGuard> {
    if PUMP_ACTIVE.with(|active| active.replace(true)) {
        return Err(Error::Reentrant);
    }

    Ok(ActiveGuard {
        _not_send: PhantomData,
    })
}

/// Clears the draining mark on drop.
pub(crate) struct ActiveGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        let _ = PUMP_ACTIVE.try_with(|active| active.set(false));
    }
}

/// Whether a pump is currently draining on this thread.
pub(crate) fn is_active() -> bool {
    PUMP_ACTIVE.with(Cell::get)
}

#[cfg(test)]
mod tests {
    use super::{activate, current, enter, is_active};
    use crate::error::Error;
    use crate::runtime::pump::PumpContext;

    use std::panic;

    #[test]
    fn enter_restores_previous_pump() {
        let outer = PumpContext::new();
        let inner = PumpContext::new();

        assert!(current().is_none());

        {
            let _outer = enter(outer.handle());
            assert!(current().unwrap().same_pump(&outer.handle()));

            {
                let _inner = enter(inner.handle());
                assert!(current().unwrap().same_pump(&inner.handle()));
            }

            assert!(current().unwrap().same_pump(&outer.handle()));
        }

        assert!(current().is_none());
    }

    #[test]
    fn enter_restores_while_unwinding() {
        let pump = PumpContext::new();

        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _guard = enter(pump.handle());
            panic!("unwind through the guard");
        }));

        assert!(result.is_err());
        assert!(current().is_none());
    }

    #[test]
    fn activate_rejects_a_second_pump() {
        let first = activate().unwrap();
        assert!(is_active());
        assert_eq!(activate().err(), Some(Error::Reentrant));

        drop(first);
        assert!(!is_active());
        assert!(activate().is_ok());
    }
}
