//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::sync::{Mutex, PoisonError, Weak};

//-------------------------------------------------------------------------------------------------------------------

/// Something that can abort pending work.
///
/// Only the first cancellation is meaningful; later calls should be no-ops that return `false`.
pub trait Cancelable: Send + Sync + 'static
{
    /// Cancel the work. `interrupt` asks for work that is already running to be stopped too.
    ///
    /// Returns `true` if this call cancelled the work.
    fn cancel(&self, interrupt: bool) -> bool;
}

/// Cancels the operation by posting [`OperationError::Cancelled`].
impl<T: Send + 'static> Cancelable for ResultCallback<T>
{
    fn cancel(&self, _interrupt: bool) -> bool
    {
        self.post_error(OperationError::Cancelled).is_ok()
    }
}

impl<T: Send + 'static, E: Executor> Cancelable for ExecutorCallback<T, E>
{
    fn cancel(&self, _interrupt: bool) -> bool
    {
        self.post_error(OperationError::Cancelled).is_ok()
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Cancels an operation without being one of its producers.
pub(crate) struct OperationCanceller<T>
{
    operation: Weak<OperationInner<T>>,
}

impl<T: Send + 'static> OperationCanceller<T>
{
    pub(crate) fn new(operation: &PendingOperation<T>) -> Self
    {
        Self{ operation: operation.downgrade() }
    }
}

impl<T: Send + 'static> Cancelable for OperationCanceller<T>
{
    fn cancel(&self, _interrupt: bool) -> bool
    {
        // every handle to the operation is gone
        let Some(operation) = self.operation.upgrade() else { return false; };
        operation.post(Err(OperationError::Cancelled), None).is_ok()
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A [`Cancelable`] that runs a closure on the first cancellation.
pub struct CancelFn
{
    cancel: Mutex<Option<Box<dyn FnOnce(bool) + Send + 'static>>>,
}

impl CancelFn
{
    /// Make a new cancel function.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce(bool) + Send + 'static
    {
        Self{ cancel: Mutex::new(Some(Box::new(cancel))) }
    }

    /// Check if the closure has run.
    pub fn is_spent(&self) -> bool
    {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl Cancelable for CancelFn
{
    fn cancel(&self, interrupt: bool) -> bool
    {
        let Some(cancel) = self.cancel.lock().unwrap_or_else(PoisonError::into_inner).take() else { return false; };
        cancel(interrupt);
        true
    }
}

impl Debug for CancelFn
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("CancelFn").field("spent", &self.is_spent()).finish()
    }
}

//-------------------------------------------------------------------------------------------------------------------
