//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;

//-------------------------------------------------------------------------------------------------------------------

/// Continue a composed resolution once the outer operation's handle arrives.
///
/// Runs on the thread that posted the handle, so the handle is resolved with blocking suppressed. If the handle
/// suspends again, the inner operation's outcome is relayed to `callback`.
fn forward_handle<H: Handle>(outcome: Outcome<H>, callback: ResultCallback<H::Output>)
{
    let handle = match outcome
    {
        Ok(handle) => handle,
        Err(error) => { let _ = callback.post_error(error); return; }
    };

    match BlockingGate::suppressed(move || handle.get())
    {
        Ok(value)                  => { let _ = callback.post_value(value); }
        Err(Suspend::Failed(error)) => { let _ = callback.post_error(error); }
        Err(Suspend::Pending(signal)) =>
        {
            tracing::debug!(result_type = signal.result_type(), "handle suspended, relaying inner result");
            let relay = callback.clone();
            if let Err(state) = signal.set_listener(move |outcome: Outcome<H::Output>| { let _ = relay.post(outcome); })
            {
                let _ = callback.post_error(state.into());
            }
        }
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A pending operation whose value is a [`Handle`] to the final value.
///
/// Keeps "accepted" (the handle is available) separate from "completed" (the handle resolved). The producer posts a
/// handle through [`HandleIndirection::producer_handle()`] as soon as the work is accepted; consumers that only care
/// about the final value use [`HandleIndirection::resolve_handle()`], [`HandleIndirection::attach_final_listener()`]
/// or [`HandleIndirection::get_final_result()`].
pub struct HandleIndirection<H: Handle>
{
    operation: PendingOperation<H>,
}

impl<H: Handle> HandleIndirection<H>
{
    /// Make a new indirection with no handle yet.
    pub fn new() -> Self
    {
        Self{ operation: PendingOperation::new() }
    }

    /// Wrap an operation that produces a handle.
    pub fn from_operation(operation: PendingOperation<H>) -> Self
    {
        Self{ operation }
    }

    /// Make an indirection whose handle is available immediately.
    pub fn accepted(handle: H) -> Self
    {
        Self::from_operation(PendingOperation::resolved(handle))
    }

    /// Access the handle-producing operation.
    pub fn operation(&self) -> &PendingOperation<H>
    {
        &self.operation
    }

    /// Get a producer handle for posting the handle.
    pub fn producer_handle(&self) -> ResultCallback<H>
    {
        self.operation.producer_handle()
    }

    /// Check if the handle has been posted.
    pub fn is_accepted(&self) -> bool
    {
        self.operation.is_done()
    }

    /// Resolve the handle, then the value behind it.
    ///
    /// Follows the [`try_suspend()`] contract. When the handle is not ready and blocking is suppressed, the returned
    /// signal belongs to a new operation that completes once both layers resolve (the chain of listeners is wired
    /// up here, so the caller only ever deals with one signal). If the handle is ready but its value is not, the
    /// signal is whatever the handle itself suspended on.
    pub fn resolve_handle(&self) -> Result<H::Output, Suspend<H::Output>>
    {
        self.resolve_or_compose().unwrap_or_else(|state| Err(Suspend::Failed(state.into())))
    }

    /// [`Self::resolve_handle()`] with this indirection's own protocol errors kept apart from the outcome.
    fn resolve_or_compose(&self) -> Result<Result<H::Output, Suspend<H::Output>>, InvalidState>
    {
        let signal = match self.operation.try_get_now()
        {
            Ok(handle)                                                 => return Ok(handle.get()),
            Err(Suspend::Failed(OperationError::InvalidState(state))) => return Err(state),
            Err(Suspend::Failed(error))                                => return Ok(Err(Suspend::Failed(error))),
            Err(Suspend::Pending(signal))                              => signal,
        };

        if BlockingGate::is_blocking_allowed()
        {
            return match signal.block()
            {
                Ok(handle)                               => Ok(handle.get()),
                Err(OperationError::InvalidState(state)) => Err(state),
                Err(error)                               => Ok(Err(Suspend::Failed(error))),
            };
        }

        tracing::debug!(result_type = std::any::type_name::<H::Output>(), "handle pending, composing listeners");
        let resolved = PendingOperation::<H::Output>::new();
        let callback = resolved.producer_handle();
        signal.set_listener(move |outcome: Outcome<H>| forward_handle(outcome, callback))?;

        // the handle may have arrived while the listener was being attached
        Ok(resolved.try_get_now())
    }

    /// Attach the listener for the final value.
    ///
    /// The listener fires exactly once, after both layers resolve, in any relative timing. It is invoked before this
    /// returns if the final value is already available. Uses up the handle operation's listener slot.
    ///
    /// Fails with [`InvalidState`] if a final listener was already attached or the handle was already consumed. Those
    /// errors are returned here and never passed to `listener`.
    pub fn attach_final_listener<L>(&self, listener: L) -> Result<(), InvalidState>
    where
        L: ResultListener<H::Output>
    {
        match BlockingGate::suppressed(|| self.resolve_or_compose())?
        {
            Ok(value)                                                 =>
            {
                Box::new(listener).operation_complete(Ok(value));
                Ok(())
            }
            Err(Suspend::Failed(OperationError::InvalidState(state))) => Err(state),
            Err(suspend)                                              => suspend.set_listener(listener),
        }
    }

    /// Block for the handle, then block for its value.
    ///
    /// Returns whichever layer's error occurs first.
    pub fn get_final_result(&self) -> Outcome<H::Output>
    {
        let handle = self.operation.block_for_result()?;
        handle.get().or_else(Suspend::block)
    }
}

impl<H: Handle> Default for HandleIndirection<H>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<H: Handle> Clone for HandleIndirection<H>
{
    fn clone(&self) -> Self
    {
        Self{ operation: self.operation.clone() }
    }
}

impl<H: Handle> Debug for HandleIndirection<H>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("HandleIndirection").field("operation", &self.operation).finish()
    }
}

/// Indirections nest: a handle-of-handle chain unwraps down to the innermost value.
impl<H: Handle> Handle for HandleIndirection<H>
{
    type Output = H::Output;

    fn get(self) -> Result<H::Output, Suspend<H::Output>>
    {
        self.resolve_handle()
    }
}

//-------------------------------------------------------------------------------------------------------------------
