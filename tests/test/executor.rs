//local shortcuts
use pending_op::*;

//third-party shortcuts

//standard shortcuts
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn executor_callback_delivers_off_the_posting_thread()
{
    let op = PendingOperation::<u32>::new();
    let callback = op.producer_handle().via(ThreadExecutor);

    let (sender, receiver) = crossbeam::channel::unbounded();
    op.attach_listener(
            move |outcome: Outcome<u32>|
            {
                let _ = sender.send((outcome, std::thread::current().id()));
            }
        ).unwrap();

    let posting_thread = std::thread::current().id();
    callback.post_value(1).unwrap();

    // the outcome is recorded before the post returns
    assert!(op.is_done());

    let (outcome, listener_thread) = receiver.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(outcome.unwrap(), 1);
    assert_ne!(listener_thread, posting_thread);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn executor_callback_rejects_double_post_immediately()
{
    let op = PendingOperation::<u32>::new();
    let callback = op.producer_handle().via(ThreadExecutor);

    callback.post_value(1).unwrap();
    assert_eq!(callback.post_value(2), Err(InvalidState::ResultAlreadyPosted));
    assert_eq!(callback.cancel(), Err(InvalidState::ResultAlreadyPosted));
    assert_eq!(op.block_for_result().unwrap(), 1);
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn inline_executor_delivers_on_the_posting_thread()
{
    let op = PendingOperation::<u32>::new();
    let callback = op.producer_handle().via(InlineExecutor);

    let (sender, receiver) = crossbeam::channel::unbounded();
    op.attach_listener(move |_: Outcome<u32>| { let _ = sender.send(std::thread::current().id()); }).unwrap();
    callback.post_value(1).unwrap();

    assert_eq!(receiver.try_recv().unwrap(), std::thread::current().id());
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn executor_callback_unblocks_waiting_consumer()
{
    let op = PendingOperation::<u32>::new();
    let callback = op.producer_handle().via(std::sync::Arc::new(ThreadExecutor));

    let producer = std::thread::spawn(
            move ||
            {
                std::thread::sleep(Duration::from_millis(20));
                callback.post_error(OperationError::Cancelled).unwrap();
            }
        );

    assert!(op.block_for_result().unwrap_err().is_cancelled());
    producer.join().unwrap();
}

//-------------------------------------------------------------------------------------------------------------------
