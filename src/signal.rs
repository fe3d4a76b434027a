//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::any::Any;

//-------------------------------------------------------------------------------------------------------------------

/// Control value meaning "no result yet", carrying the operation that will eventually hold the result.
///
/// A signal is not an error. Callers that receive one either block on it, attach a listener to its operation, or
/// pass it up to their own caller.
pub struct Signal<T: Send + 'static>
{
    operation: PendingOperation<T>,
}

impl<T: Send + 'static> Signal<T>
{
    pub(crate) fn new(operation: PendingOperation<T>) -> Self
    {
        Self{ operation }
    }

    /// Access the pending operation (the same operation that raised the signal, not a copy).
    pub fn operation(&self) -> &PendingOperation<T>
    {
        &self.operation
    }

    /// Extract the pending operation.
    pub fn into_operation(self) -> PendingOperation<T>
    {
        self.operation
    }

    /// Get the name of the result type.
    pub fn result_type(&self) -> &'static str
    {
        self.operation.result_type()
    }

    /// Block until the operation's outcome is available.
    ///
    /// This is how a caller that caught a signal decides to wait after all.
    pub fn block(self) -> Outcome<T>
    {
        self.operation.block_for_result()
    }

    /// Attach the listener for the operation's outcome.
    pub fn set_listener<L>(&self, listener: L) -> Result<(), InvalidState>
    where
        L: ResultListener<T>
    {
        self.operation.attach_listener(listener)
    }

    /// Get a signal for a new operation whose value is `f` applied to this operation's value.
    ///
    /// Uses up this operation's listener slot.
    pub fn map<U, F>(self, f: F) -> Result<Signal<U>, InvalidState>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static
    {
        let mapped = PendingOperation::<U>::new();
        let callback = mapped.producer_handle();
        self.operation.attach_listener(
                move |outcome: Outcome<T>|
                {
                    let _ = callback.post(outcome.map(f));
                }
            )?;

        Ok(Signal::new(mapped))
    }

    /// Erase the result type so the signal can cross frames that don't know it.
    pub fn erase(self) -> ErasedSignal
    {
        ErasedSignal{
            result_type : self.result_type(),
            operation   : Box::new(self.operation),
        }
    }
}

impl<T: Send + 'static> Clone for Signal<T>
{
    fn clone(&self) -> Self
    {
        Self{ operation: self.operation.clone() }
    }
}

impl<T: Send + 'static> Debug for Signal<T>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Signal").field("operation", &self.operation).finish()
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A [`Signal`] whose result type is only known to the frame that will handle it.
pub struct ErasedSignal
{
    result_type: &'static str,
    operation: Box<dyn Any + Send + Sync>,
}

impl ErasedSignal
{
    /// Get the name of the result type.
    pub fn result_type(&self) -> &'static str
    {
        self.result_type
    }

    /// Check if this signal is for result type `T`.
    pub fn is<T: Send + 'static>(&self) -> bool
    {
        self.operation.is::<PendingOperation<T>>()
    }

    /// Recover the typed signal. Returns `self` unchanged if the result type is not `T`.
    pub fn downcast<T: Send + 'static>(self) -> Result<Signal<T>, ErasedSignal>
    {
        let result_type = self.result_type;
        match self.operation.downcast::<PendingOperation<T>>()
        {
            Ok(operation) => Ok(Signal::new(*operation)),
            Err(operation) =>
            {
                tracing::trace!(result_type, expected = std::any::type_name::<T>(), "erased signal downcast mismatch");
                Err(ErasedSignal{ result_type, operation })
            }
        }
    }
}

impl Debug for ErasedSignal
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("ErasedSignal").field("result_type", &self.result_type).finish()
    }
}

impl<T: Send + 'static> From<Signal<T>> for ErasedSignal
{
    fn from(signal: Signal<T>) -> Self
    {
        signal.erase()
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Why a suspend point did not produce a value.
///
/// `?` converts [`OperationError`] and [`InvalidState`] into `Suspend::Failed`, so call sites can propagate both a
/// pending signal and a failure without caring which one they hold.
pub enum Suspend<T: Send + 'static>
{
    /// The result is not available yet.
    Pending(Signal<T>),
    /// The operation failed.
    Failed(OperationError),
}

impl<T: Send + 'static> Suspend<T>
{
    /// Check if this is a pending signal.
    pub fn is_pending(&self) -> bool
    {
        matches!(self, Suspend::Pending(_))
    }

    /// Extract the signal if this is pending.
    pub fn into_signal(self) -> Option<Signal<T>>
    {
        match self
        {
            Suspend::Pending(signal) => Some(signal),
            Suspend::Failed(_)       => None,
        }
    }

    /// Extract the error if this is a failure.
    pub fn into_error(self) -> Option<OperationError>
    {
        match self
        {
            Suspend::Pending(_)     => None,
            Suspend::Failed(error)  => Some(error),
        }
    }

    /// Block on a pending signal, or return the failure.
    pub fn block(self) -> Outcome<T>
    {
        match self
        {
            Suspend::Pending(signal) => signal.block(),
            Suspend::Failed(error)   => Err(error),
        }
    }

    /// Deliver the eventual outcome to `listener`. A failure is delivered immediately.
    pub fn set_listener<L>(self, listener: L) -> Result<(), InvalidState>
    where
        L: ResultListener<T>
    {
        match self
        {
            Suspend::Pending(signal) => signal.set_listener(listener),
            Suspend::Failed(error)   => { Box::new(listener).operation_complete(Err(error)); Ok(()) }
        }
    }

    /// See [`Signal::map()`]. A failure passes through unchanged.
    pub fn map<U, F>(self, f: F) -> Suspend<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static
    {
        match self
        {
            Suspend::Pending(signal) => match signal.map(f)
            {
                Ok(signal) => Suspend::Pending(signal),
                Err(state) => Suspend::Failed(state.into()),
            },
            Suspend::Failed(error) => Suspend::Failed(error),
        }
    }

    /// Erase the result type.
    pub fn erase(self) -> Suspended
    {
        match self
        {
            Suspend::Pending(signal) => Suspended::Pending(signal.erase()),
            Suspend::Failed(error)   => Suspended::Failed(error),
        }
    }
}

impl<T: Send + 'static> From<OperationError> for Suspend<T>
{
    fn from(error: OperationError) -> Self
    {
        Suspend::Failed(error)
    }
}

impl<T: Send + 'static> From<InvalidState> for Suspend<T>
{
    fn from(state: InvalidState) -> Self
    {
        Suspend::Failed(state.into())
    }
}

impl<T: Send + 'static> Debug for Suspend<T>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Suspend::Pending(signal) => f.debug_tuple("Pending").field(signal).finish(),
            Suspend::Failed(error)   => f.debug_tuple("Failed").field(error).finish(),
        }
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A [`Suspend`] with its result type erased.
#[derive(Debug)]
pub enum Suspended
{
    /// The result is not available yet.
    Pending(ErasedSignal),
    /// The operation failed.
    Failed(OperationError),
}

impl Suspended
{
    /// Recover the typed form. Returns `self` unchanged if the pending signal's result type is not `T`.
    pub fn downcast<T: Send + 'static>(self) -> Result<Suspend<T>, Suspended>
    {
        match self
        {
            Suspended::Pending(signal) => signal.downcast::<T>()
                .map(Suspend::Pending)
                .map_err(Suspended::Pending),
            Suspended::Failed(error) => Ok(Suspend::Failed(error)),
        }
    }
}

impl<T: Send + 'static> From<Suspend<T>> for Suspended
{
    fn from(suspend: Suspend<T>) -> Self
    {
        suspend.erase()
    }
}

impl From<OperationError> for Suspended
{
    fn from(error: OperationError) -> Self
    {
        Suspended::Failed(error)
    }
}

//-------------------------------------------------------------------------------------------------------------------
