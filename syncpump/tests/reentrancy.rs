mod common;

use common::{AppError, init_tracing};
use syncpump::{Error, PumpContext, run_sync, run_sync_with_result};

use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[test]
fn test_nested_run_sync_is_rejected() {
    init_tracing();

    let started = Instant::now();

    let nested = run_sync_with_result(|| async {
        let inner: Result<(), AppError> = run_sync(|| async { Ok(()) });
        Ok::<_, AppError>(inner)
    });

    assert_eq!(nested, Ok(Err(AppError::Pump(Error::Reentrant))));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_nested_pump_context_is_rejected() {
    init_tracing();

    let nested = run_sync_with_result(|| async {
        let inner = PumpContext::new();
        Ok::<_, AppError>(inner.run(|| async {}))
    });

    assert_eq!(nested, Ok(Err(Error::Reentrant)));
}

#[test]
fn test_reentrant_error_is_propagated_with_question_mark() {
    init_tracing();

    let result: Result<(), AppError> = run_sync(|| async {
        run_sync(|| async { Ok::<(), AppError>(()) })?;
        Ok::<(), AppError>(())
    });

    assert_eq!(result, Err(AppError::Pump(Error::Reentrant)));
}

#[test]
fn test_ambient_pump_is_visible_inside_the_operation() {
    init_tracing();

    assert!(syncpump::current().is_none());

    let inside = run_sync_with_result(|| {
        let in_factory = syncpump::current().is_some();

        async move {
            let in_operation = syncpump::current().is_some();
            Ok::<_, AppError>((in_factory, in_operation))
        }
    });

    assert_eq!(inside, Ok((true, true)));
    assert!(syncpump::current().is_none());
}

#[test]
fn test_ambient_pump_is_restored_after_error() {
    init_tracing();

    let result: Result<(), AppError> =
        run_sync(|| async { Err(AppError::InvalidOperation("nope".into())) });

    assert!(result.is_err());
    assert!(syncpump::current().is_none());
}

fn fail() -> Result<(), AppError> {
    panic!("operation failed")
}

#[test]
fn test_ambient_pump_is_restored_after_panic() {
    init_tracing();

    let caught = panic::catch_unwind(|| {
        let _ = run_sync(|| async { fail() });
    });

    assert!(caught.is_err());
    assert!(syncpump::current().is_none());

    let after = run_sync_with_result(|| async { Ok::<_, AppError>(1) });
    assert_eq!(after, Ok(1));
}

#[test]
fn test_send_is_rejected_without_running() {
    init_tracing();

    let ran = Arc::new(AtomicBool::new(false));

    let flag = ran.clone();
    let result = run_sync_with_result(move || async move {
        let handle = syncpump::current().ok_or(Error::NoContext)?;
        Ok::<_, AppError>(handle.send(move || flag.store(true, Ordering::SeqCst)))
    });

    assert_eq!(result, Ok(Err(Error::SendNotSupported)));
    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_continuation_panic_unwinds_immediately() {
    init_tracing();

    let reached_end = Arc::new(AtomicBool::new(false));

    let flag = reached_end.clone();
    let caught = panic::catch_unwind(move || {
        let _: Result<(), AppError> = run_sync(move || async move {
            let handle = syncpump::current().ok_or(Error::NoContext)?;
            handle.post(|| panic!("continuation failed"))?;

            syncpump::yield_now().await;
            flag.store(true, Ordering::SeqCst);
            Ok::<(), AppError>(())
        });
    });

    let payload = caught.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"continuation failed"));
    assert!(!reached_end.load(Ordering::SeqCst));
    assert!(syncpump::current().is_none());

    let after: Result<(), AppError> = run_sync(|| async { Ok(()) });
    assert!(after.is_ok());
}
