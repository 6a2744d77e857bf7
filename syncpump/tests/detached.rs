mod common;

use common::{AppError, Latch, init_tracing, pending_forever};
use syncpump::task::{spawn_detached, spawn_detached_with};
use syncpump::time::sleep;
use syncpump::{Error, run_sync, run_sync_with_result};

use std::panic;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[test]
fn test_detached_task_runs_on_the_pump_thread() {
    init_tracing();

    let pump_thread = thread::current().id();
    let polled_on = Arc::new(Mutex::new(None));

    let slot = polled_on.clone();
    let result: Result<(), AppError> = run_sync(move || async move {
        let latch = Latch::new(1);
        let done = latch.clone();

        spawn_detached(async move {
            sleep(Duration::from_millis(5)).await;
            *slot.lock().unwrap() = Some(thread::current().id());
            done.count_down();
            Ok::<(), AppError>(())
        })?;

        latch.wait().await;
        Ok::<(), AppError>(())
    });

    assert!(result.is_ok());
    assert_eq!(*polled_on.lock().unwrap(), Some(pump_thread));
}

#[test]
fn test_detached_error_reaches_the_handler() {
    init_tracing();

    let reported = Arc::new(Mutex::new(None));

    let slot = reported.clone();
    let result: Result<(), AppError> = run_sync(move || async move {
        let latch = Latch::new(1);
        let done = latch.clone();

        spawn_detached_with(
            async { Err::<(), _>(AppError::InvalidOperation("background".into())) },
            move |err: &AppError| {
                *slot.lock().unwrap() = Some(err.to_string());
                done.count_down();
            },
        )?;

        latch.wait().await;
        Ok::<(), AppError>(())
    });

    assert!(result.is_ok());
    assert_eq!(
        reported.lock().unwrap().as_deref(),
        Some("invalid operation: background")
    );
}

#[test]
fn test_detached_error_does_not_fail_the_operation() {
    init_tracing();

    let value = run_sync_with_result(|| async {
        spawn_detached(async { Err::<(), _>(AppError::InvalidOperation("ignored".into())) })?;
        syncpump::yield_now().await;
        Ok::<_, AppError>(7)
    });

    assert_eq!(value, Ok(7));
}

#[test]
fn test_spawn_outside_a_pump_is_rejected() {
    init_tracing();

    let result = spawn_detached(async { Ok::<(), AppError>(()) });

    assert_eq!(result, Err(Error::NoContext));
}

#[test]
fn test_pending_detached_task_is_dropped_with_the_pump() {
    init_tracing();

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    let dropped = Arc::new(AtomicBool::new(false));

    let flag = DropFlag(dropped.clone());
    let result: Result<(), AppError> = run_sync(move || async move {
        spawn_detached(async move {
            let _flag = flag;
            pending_forever().await;
            Ok::<(), AppError>(())
        })?;

        syncpump::yield_now().await;
        Ok::<(), AppError>(())
    });

    assert!(result.is_ok());
    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn test_many_detached_tasks_each_run_once() {
    init_tracing();

    const TASKS: usize = 32;

    let runs = Arc::new(AtomicUsize::new(0));

    let counter = runs.clone();
    let result: Result<(), AppError> = run_sync(move || async move {
        let latch = Latch::new(TASKS);

        for index in 0..TASKS {
            let counter = counter.clone();
            let done = latch.clone();

            spawn_detached(async move {
                if index % 2 == 0 {
                    syncpump::yield_now().await;
                }

                counter.fetch_add(1, Ordering::SeqCst);
                done.count_down();
                Ok::<(), AppError>(())
            })?;
        }

        latch.wait().await;
        Ok::<(), AppError>(())
    });

    assert!(result.is_ok());
    assert_eq!(runs.load(Ordering::SeqCst), TASKS);
}

#[test]
fn test_detached_task_panic_unwinds_out_of_the_driver() {
    init_tracing();

    let caught = panic::catch_unwind(|| {
        let _: Result<(), AppError> = run_sync(|| async {
            spawn_detached(async {
                if true {
                    panic!("detached failed");
                }
                Ok::<(), AppError>(())
            })?;

            common::pending_forever().await;
            Ok::<(), AppError>(())
        });
    });

    let payload = caught.unwrap_err();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"detached failed"));
    assert!(syncpump::current().is_none());
}
