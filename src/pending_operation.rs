//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// The outcome handed to consumers of a [`PendingOperation`]: the posted value or the posted error.
pub type Outcome<T> = Result<T, OperationError>;

//-------------------------------------------------------------------------------------------------------------------

/// Receives the outcome of a [`PendingOperation`] exactly once.
///
/// Implemented for any `FnOnce(Outcome<T>) + Send + 'static`.
pub trait ResultListener<T>: Send + 'static
{
    /// Called once the operation has an outcome.
    fn operation_complete(self: Box<Self>, outcome: Outcome<T>);
}

impl<T, F> ResultListener<T> for F
where
    F: FnOnce(Outcome<T>) + Send + 'static
{
    fn operation_complete(self: Box<Self>, outcome: Outcome<T>)
    {
        (*self)(outcome)
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Result/listener slot. Every transition happens under one lock.
enum Slot<T>
{
    /// Nothing posted, no listener.
    Unset,
    /// A listener is waiting for the outcome.
    Listening(Box<dyn ResultListener<T>>),
    /// An outcome is waiting for a consumer.
    Ready(Outcome<T>),
    /// The outcome was handed to a consumer.
    Delivered{ to_listener: bool },
}

impl<T> Slot<T>
{
    fn name(&self) -> &'static str
    {
        match self
        {
            Slot::Unset        => "Unset",
            Slot::Listening(_) => "Listening",
            Slot::Ready(_)     => "Ready",
            Slot::Delivered{..} => "Delivered",
        }
    }
}

//-------------------------------------------------------------------------------------------------------------------

pub(crate) struct OperationInner<T>
{
    /// type witness for the result
    result_type: &'static str,
    /// result/listener state
    slot: Mutex<Slot<T>>,
    /// number of live producer handles
    producers: AtomicUsize,
}

impl<T: Send + 'static> OperationInner<T>
{
    fn slot(&self) -> MutexGuard<'_, Slot<T>>
    {
        // every transition completes inside the critical section, so a poisoned slot is still consistent
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an outcome. If a listener is waiting it is invoked after the outcome is recorded and the lock is
    /// released, either inline or through `executor`.
    pub(crate) fn post(&self, outcome: Outcome<T>, executor: Option<&dyn Executor>) -> Result<(), InvalidState>
    {
        let listener = {
            let mut slot = self.slot();
            match std::mem::replace(&mut *slot, Slot::Delivered{ to_listener: true })
            {
                Slot::Unset =>
                {
                    *slot = Slot::Ready(outcome);
                    tracing::trace!(result_type = self.result_type, "result posted");
                    return Ok(());
                }
                Slot::Listening(listener) => listener,
                previous @ (Slot::Ready(_) | Slot::Delivered{..}) =>
                {
                    *slot = previous;
                    tracing::warn!(result_type = self.result_type, "tried to post a second result");
                    return Err(InvalidState::ResultAlreadyPosted);
                }
            }
        };

        tracing::trace!(result_type = self.result_type, "result posted, notifying listener");
        match executor
        {
            Some(executor) => executor.execute(Box::new(move || listener.operation_complete(outcome))),
            None           => listener.operation_complete(outcome),
        }

        Ok(())
    }

    pub(crate) fn add_producer(&self)
    {
        self.producers.fetch_add(1, Ordering::AcqRel);
    }

    /// Release a producer handle. The last one out interrupts the operation if nothing was posted.
    pub(crate) fn remove_producer(&self)
    {
        if self.producers.fetch_sub(1, Ordering::AcqRel) != 1 { return; }
        if !matches!(*self.slot(), Slot::Unset | Slot::Listening(_)) { return; }

        tracing::warn!(result_type = self.result_type, "all producers dropped without posting a result");
        let _ = self.post(Err(OperationError::Interrupted), None);
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Holds the eventual result of one producer/consumer pair.
///
/// A `PendingOperation` is a cheap handle: clones refer to the same operation. The producer side posts exactly one
/// outcome through a [`ResultCallback`] (see [`PendingOperation::producer_handle()`]). The consumer side picks one of
/// three modes:
/// - [`PendingOperation::block_for_result()`] blocks the current thread until the outcome arrives.
/// - [`PendingOperation::attach_listener()`] registers a listener that is invoked exactly once, either immediately
///   (if the outcome is already posted) or on the thread that posts it.
/// - [`try_suspend()`] returns the outcome if ready, blocks if the [`BlockingGate`] allows it, or otherwise hands
///   back a [`Signal`] carrying this operation.
///
/// Invariants:
/// - At most one outcome is ever posted. A second post fails with [`InvalidState::ResultAlreadyPosted`].
/// - At most one listener is ever attached. A second attach fails with [`InvalidState::ListenerAlreadyAttached`].
/// - The outcome is handed to exactly one consumer.
pub struct PendingOperation<T>
{
    inner: Arc<OperationInner<T>>,
}

impl<T: Send + 'static> PendingOperation<T>
{
    /// Make a new operation with no result.
    pub fn new() -> Self
    {
        Self{
            inner: Arc::new(OperationInner{
                result_type : std::any::type_name::<T>(),
                slot        : Mutex::new(Slot::Unset),
                producers   : AtomicUsize::new(0usize),
            })
        }
    }

    /// Make an operation whose value is available immediately.
    pub fn resolved(value: T) -> Self
    {
        Self::completed(Ok(value))
    }

    /// Make an operation whose error is available immediately.
    pub fn failed(error: OperationError) -> Self
    {
        Self::completed(Err(error))
    }

    /// Make an operation with an outcome available immediately.
    pub fn completed(outcome: Outcome<T>) -> Self
    {
        let operation = Self::new();
        *operation.inner.slot() = Slot::Ready(outcome);
        operation
    }

    /// Get a producer handle for posting this operation's outcome.
    ///
    /// Intended to be called once per operation. Extra handles are not rejected, but cooperating producers must
    /// still only post once. If every handle is dropped without posting, the operation resolves to
    /// [`OperationError::Interrupted`].
    pub fn producer_handle(&self) -> ResultCallback<T>
    {
        ResultCallback::new(self.inner.clone())
    }

    /// Get a reference to the operation that does not count as a producer.
    pub(crate) fn downgrade(&self) -> Weak<OperationInner<T>>
    {
        Arc::downgrade(&self.inner)
    }

    /// Get the name of the result type.
    pub fn result_type(&self) -> &'static str
    {
        self.inner.result_type
    }

    /// Check if an outcome has been posted (it may already have been consumed).
    pub fn is_done(&self) -> bool
    {
        matches!(*self.inner.slot(), Slot::Ready(_) | Slot::Delivered{..})
    }

    /// Check if two handles refer to the same operation.
    pub fn ptr_eq(&self, other: &Self) -> bool
    {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Take the outcome if it is available now, otherwise return a [`Signal`] carrying this operation.
    ///
    /// This is the primary suspend point. It never blocks.
    ///
    /// If the outcome was already taken by another consumer this returns
    /// `Err(Suspend::Failed(OperationError::InvalidState(InvalidState::ResultAlreadyConsumed)))`. That is a protocol
    /// error of the caller, not an error posted by the producer; [`OperationError::is_invalid_state()`] tells them
    /// apart.
    pub fn try_get_now(&self) -> Result<T, Suspend<T>>
    {
        let mut slot = self.inner.slot();
        match std::mem::replace(&mut *slot, Slot::Delivered{ to_listener: false })
        {
            Slot::Ready(outcome) => outcome.map_err(Suspend::Failed),
            pending @ (Slot::Unset | Slot::Listening(_)) =>
            {
                *slot = pending;
                drop(slot);
                tracing::trace!(result_type = self.result_type(), "result not ready, raising signal");
                Err(Suspend::Pending(Signal::new(self.clone())))
            }
            delivered @ Slot::Delivered{..} =>
            {
                *slot = delivered;
                Err(Suspend::Failed(InvalidState::ResultAlreadyConsumed.into()))
            }
        }
    }

    /// Get the result, suspending as [`try_suspend()`] does.
    pub fn get_result(&self) -> Result<T, Suspend<T>>
    {
        try_suspend(self)
    }

    /// Attach the listener that will receive this operation's outcome.
    ///
    /// If the outcome is already posted the listener is invoked before this returns. Otherwise it is invoked on
    /// whichever thread posts the outcome.
    pub fn attach_listener<L>(&self, listener: L) -> Result<(), InvalidState>
    where
        L: ResultListener<T>
    {
        self.attach_boxed_listener(Box::new(listener))
    }

    pub(crate) fn attach_boxed_listener(&self, listener: Box<dyn ResultListener<T>>) -> Result<(), InvalidState>
    {
        let outcome = {
            let mut slot = self.inner.slot();
            match std::mem::replace(&mut *slot, Slot::Delivered{ to_listener: true })
            {
                Slot::Unset =>
                {
                    *slot = Slot::Listening(listener);
                    tracing::trace!(result_type = self.result_type(), "listener attached");
                    return Ok(());
                }
                Slot::Ready(outcome) => outcome,
                previous @ Slot::Listening(_) =>
                {
                    *slot = previous;
                    tracing::warn!(result_type = self.result_type(), "tried to attach a second listener");
                    return Err(InvalidState::ListenerAlreadyAttached);
                }
                Slot::Delivered{ to_listener } =>
                {
                    *slot = Slot::Delivered{ to_listener };
                    tracing::warn!(result_type = self.result_type(), "tried to attach a listener after delivery");
                    return match to_listener
                    {
                        true  => Err(InvalidState::ListenerAlreadyAttached),
                        false => Err(InvalidState::ResultAlreadyConsumed),
                    };
                }
            }
        };

        tracing::trace!(result_type = self.result_type(), "listener attached to posted result");
        listener.operation_complete(outcome);

        Ok(())
    }

    /// Block the current thread until the outcome is available.
    ///
    /// Returns immediately if the outcome was already posted. Returns [`OperationError::Interrupted`] if every
    /// producer handle is dropped without posting.
    pub fn block_for_result(&self) -> Outcome<T>
    {
        let (sender, receiver) = crossbeam::channel::bounded::<Outcome<T>>(1);
        self.attach_listener(
                move |outcome: Outcome<T>|
                {
                    // the receiver only goes away if the blocked thread is gone
                    let _ = sender.send(outcome);
                }
            )?;

        tracing::debug!(result_type = self.result_type(), "blocking for result");
        let outcome = receiver.recv().unwrap_or(Err(OperationError::Interrupted));
        tracing::debug!(result_type = self.result_type(), "finished blocking for result");

        outcome
    }

    /// Block the current thread until the outcome is available or `timeout` elapses.
    ///
    /// On timeout the operation is cancelled through the shared [`TimeoutScheduler`], so this returns
    /// [`OperationError::Cancelled`] and a late producer's post fails with [`InvalidState::ResultAlreadyPosted`].
    /// The pending timeout does not count as a producer: dropping every producer handle still returns
    /// [`OperationError::Interrupted`] right away.
    pub fn block_for_result_timeout(&self, timeout: Duration) -> Outcome<T>
    {
        let timeout_handle = TimeoutScheduler::shared().schedule_operation_timeout(self, timeout);
        let outcome = self.block_for_result();
        timeout_handle.cancel();

        outcome
    }
}

impl<T: Send + 'static> Default for PendingOperation<T>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<T> Clone for PendingOperation<T>
{
    fn clone(&self) -> Self
    {
        Self{ inner: self.inner.clone() }
    }
}

impl<T: Send + 'static> Debug for PendingOperation<T>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("PendingOperation")
            .field("result_type", &self.inner.result_type)
            .field("slot", &self.inner.slot().name())
            .finish()
    }
}

//-------------------------------------------------------------------------------------------------------------------
