//local shortcuts
use crate::prepare_tracing;
use pending_op::*;

//third-party shortcuts

//standard shortcuts
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn blocked_consumer_receives_late_value()
{
    prepare_tracing();
    let op = PendingOperation::<i32>::new();
    let callback = op.producer_handle();

    let producer = std::thread::spawn(
            move ||
            {
                std::thread::sleep(Duration::from_millis(50));
                callback.post_value(42).unwrap();
            }
        );

    assert_eq!(op.block_for_result().unwrap(), 42);
    producer.join().unwrap();
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn blocked_consumer_receives_late_error()
{
    let op = PendingOperation::<i32>::new();
    let callback = op.producer_handle();

    let producer = std::thread::spawn(
            move ||
            {
                std::thread::sleep(Duration::from_millis(50));
                callback.post_error(OperationError::failed(MessageError::new("E"))).unwrap();
            }
        );

    let error = op.block_for_result().unwrap_err();
    assert_eq!(error.source_error().unwrap().to_string(), "E");
    producer.join().unwrap();
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn suppressed_caller_listens_on_signal()
{
    let op = PendingOperation::<String>::new();
    let callback = op.producer_handle();

    let Err(Suspend::Pending(signal)) = BlockingGate::suppressed(|| try_suspend(&op))
    else { panic!("expected a signal") };

    let count = Arc::new(AtomicUsize::new(0));
    let (sender, receiver) = crossbeam::channel::unbounded();
    let count_inner = count.clone();
    signal.set_listener(
            move |outcome: Outcome<String>|
            {
                count_inner.fetch_add(1, Ordering::SeqCst);
                let _ = sender.send(outcome);
            }
        ).unwrap();

    let producer = std::thread::spawn(move || callback.post_value(String::from("done")).unwrap());
    producer.join().unwrap();

    assert_eq!(receiver.recv_timeout(Duration::from_secs(1)).unwrap().unwrap(), "done");
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(receiver.try_recv().is_err());
}

//-------------------------------------------------------------------------------------------------------------------

/// A read-only walk over keys whose values arrive asynchronously. The walk abandons the attempt at the first missing
/// value and is retried once that value arrives.
struct Lookup
{
    values: Mutex<HashMap<u32, PendingOperation<u32>>>,
}

impl Lookup
{
    fn get(&self, key: u32) -> Result<u32, Suspend<u32>>
    {
        let operation = self.values.lock().unwrap().get(&key).cloned().expect("unknown key");
        let value = try_suspend(&operation)?;

        // keep the value readable for the next attempt
        self.values.lock().unwrap().insert(key, PendingOperation::resolved(value));
        Ok(value)
    }

    fn sum(&self, keys: &[u32]) -> Result<u32, Suspend<u32>>
    {
        let mut total = 0u32;
        for key in keys
        {
            total += self.get(*key)?;
        }
        Ok(total)
    }
}

#[test]
fn graph_walk_retries_after_signal()
{
    let pending = PendingOperation::<u32>::new();
    let callback = pending.producer_handle();
    let lookup = Arc::new(Lookup{
            values: Mutex::new(HashMap::from([
                    (1u32, PendingOperation::resolved(10u32)),
                    (2u32, pending),
                    (3u32, PendingOperation::resolved(30u32)),
                ])),
        });

    // first attempt stops at key 2
    let Err(Suspend::Pending(signal)) = BlockingGate::suppressed(|| lookup.sum(&[1, 2, 3]))
    else { panic!("expected a signal") };

    // retry from the listener once the value arrives
    let (sender, receiver) = crossbeam::channel::unbounded();
    let lookup_retry = lookup.clone();
    signal.set_listener(
            move |outcome: Outcome<u32>|
            {
                let value = outcome.unwrap();
                lookup_retry.values.lock().unwrap().insert(2, PendingOperation::resolved(value));
                let _ = sender.send(BlockingGate::suppressed(|| lookup_retry.sum(&[1, 2, 3])).unwrap());
            }
        ).unwrap();

    callback.post_value(20).unwrap();
    assert_eq!(receiver.recv_timeout(Duration::from_secs(1)).unwrap(), 60);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn accepted_then_completed_job()
{
    // a job service that accepts immediately and completes on a worker thread
    fn submit(input: u32) -> HandleIndirection<OperationHandle<u32>>
    {
        let completion = PendingOperation::<u32>::new();
        let callback = completion.producer_handle();
        std::thread::spawn(
                move ||
                {
                    std::thread::sleep(Duration::from_millis(20));
                    callback.post_value(input * input).unwrap();
                }
            );
        HandleIndirection::accepted(OperationHandle::new(completion))
    }

    let job = submit(9);
    assert!(job.is_accepted());

    let (sender, receiver) = crossbeam::channel::unbounded();
    job.attach_final_listener(move |outcome: Outcome<u32>| { let _ = sender.send(outcome); }).unwrap();
    assert_eq!(receiver.recv_timeout(Duration::from_secs(1)).unwrap().unwrap(), 81);
}

//-------------------------------------------------------------------------------------------------------------------
