//local shortcuts
use crate::prepare_tracing;
use pending_op::*;

//third-party shortcuts

//standard shortcuts
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

fn test_scheduler() -> TimeoutScheduler
{
    TimeoutScheduler::new(TimeoutSchedulerConfig{
            idle_timeout : Duration::from_millis(50),
            thread_name  : String::from("test-timeouts"),
        })
}

fn counting_cancel(count: &Arc<AtomicUsize>) -> Arc<CancelFn>
{
    let count = count.clone();
    Arc::new(CancelFn::new(move |interrupt| { assert!(interrupt); count.fetch_add(1, Ordering::SeqCst); }))
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn timeout_fires_after_delay()
{
    prepare_tracing();
    let scheduler = test_scheduler();
    let count = Arc::new(AtomicUsize::new(0));

    let handle = scheduler.schedule_cancellation(counting_cancel(&count), Duration::from_millis(20));
    assert_eq!(scheduler.pending(), 1);
    assert!(!handle.is_fired());

    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(handle.is_fired());
    assert!(!handle.is_cancelled());
    assert_eq!(scheduler.pending(), 0);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn cancelled_timeout_never_fires()
{
    let scheduler = test_scheduler();
    let count = Arc::new(AtomicUsize::new(0));

    let handle = scheduler.schedule_cancellation(counting_cancel(&count), Duration::from_millis(30));
    assert!(handle.cancel());
    assert!(handle.is_cancelled());
    assert_eq!(scheduler.pending(), 0);

    std::thread::sleep(Duration::from_millis(120));
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!handle.is_fired());

    // cancelling twice is a no-op
    assert!(!handle.cancel());
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn cancel_after_fire_is_a_noop()
{
    let scheduler = test_scheduler();
    let count = Arc::new(AtomicUsize::new(0));

    let handle = scheduler.schedule_cancellation(counting_cancel(&count), Duration::from_millis(10));
    std::thread::sleep(Duration::from_millis(120));
    assert!(handle.is_fired());

    assert!(!handle.cancel());
    assert!(!handle.is_cancelled());
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn racing_fire_and_cancel_resolve_once()
{
    let scheduler = test_scheduler();

    for _ in 0..50
    {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule_cancellation(counting_cancel(&count), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(1));
        let cancelled = handle.cancel();

        std::thread::sleep(Duration::from_millis(20));
        assert_ne!(cancelled, handle.is_fired());
        assert_eq!(count.load(Ordering::SeqCst), if cancelled { 0 } else { 1 });
    }
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn timeouts_fire_in_deadline_order()
{
    let scheduler = test_scheduler();
    let order = Arc::new(Mutex::new(Vec::new()));

    for (label, delay) in [(3u32, 60u64), (1, 20), (2, 40)]
    {
        let order = order.clone();
        scheduler.schedule_cancellation(
                Arc::new(CancelFn::new(move |_| order.lock().unwrap().push(label))),
                Duration::from_millis(delay)
            );
    }

    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn idle_worker_exits_and_respawns()
{
    let scheduler = test_scheduler();
    assert!(!scheduler.is_worker_running());

    let count = Arc::new(AtomicUsize::new(0));
    scheduler.schedule_cancellation(counting_cancel(&count), Duration::from_millis(5));
    assert!(scheduler.is_worker_running());

    // fires, then sits idle past the idle timeout
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(!scheduler.is_worker_running());

    scheduler.schedule_cancellation(counting_cancel(&count), Duration::from_millis(5));
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn cancelled_long_timeout_lets_worker_exit()
{
    let scheduler = test_scheduler();
    let count = Arc::new(AtomicUsize::new(0));

    let handle = scheduler.schedule_cancellation(counting_cancel(&count), Duration::from_secs(30));
    assert!(scheduler.is_worker_running());
    assert!(handle.cancel());

    // the worker drops the entry right away and then idles out
    std::thread::sleep(Duration::from_millis(300));
    assert!(!scheduler.is_worker_running());
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn timeout_cancels_pending_operation()
{
    let scheduler = test_scheduler();
    let op = PendingOperation::<u32>::new();
    let callback = op.producer_handle();

    let handle = scheduler.schedule_operation_timeout(&op, Duration::from_millis(20));
    assert!(op.block_for_result().unwrap_err().is_cancelled());
    assert!(handle.is_fired());
    assert_eq!(callback.post_value(1), Err(InvalidState::ResultAlreadyPosted));
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn timeout_on_finished_operation_does_nothing()
{
    let scheduler = test_scheduler();
    let op = PendingOperation::<u32>::new();
    let callback = op.producer_handle();
    let handle = scheduler.schedule_cancellation(Arc::new(callback.clone()), Duration::from_millis(10));

    callback.post_value(2).unwrap();
    std::thread::sleep(Duration::from_millis(100));

    // the timeout fired but its cancellation lost to the posted value
    assert!(handle.is_fired());
    assert_eq!(op.block_for_result().unwrap(), 2);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn cancel_fn_runs_once()
{
    let count = Arc::new(AtomicUsize::new(0));
    let cancel = counting_cancel(&count);
    assert!(!cancel.is_spent());
    assert!(cancel.cancel(true));
    assert!(!cancel.cancel(true));
    assert!(cancel.is_spent());
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn shared_scheduler_is_process_wide()
{
    assert!(std::ptr::eq(TimeoutScheduler::shared(), TimeoutScheduler::shared()));
    assert_eq!(TimeoutScheduler::shared().config().thread_name, "pending-op-timeouts");
}

//-------------------------------------------------------------------------------------------------------------------
