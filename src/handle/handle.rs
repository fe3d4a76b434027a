//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::marker::PhantomData;

//-------------------------------------------------------------------------------------------------------------------

/// A resolvable reference to a value that may itself need to suspend to produce it.
///
/// Handles are the second layer of a [`HandleIndirection`]: producing the handle means the work was accepted,
/// resolving it means the work completed.
pub trait Handle: Send + 'static
{
    /// The value this handle resolves to.
    type Output: Send + 'static;

    /// Resolve the handle.
    ///
    /// Follows the [`try_suspend()`] contract: may block if the [`BlockingGate`] allows it, otherwise returns a
    /// [`Signal`] for whatever operation the value is waiting on.
    fn get(self) -> Result<Self::Output, Suspend<Self::Output>>;
}

//-------------------------------------------------------------------------------------------------------------------

/// A handle whose value was known when the handle was made.
#[derive(Debug, Clone)]
pub struct ReadyHandle<T>(pub T);

impl<T: Send + 'static> Handle for ReadyHandle<T>
{
    type Output = T;

    fn get(self) -> Result<T, Suspend<T>>
    {
        Ok(self.0)
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A handle whose value is the result of another [`PendingOperation`].
#[derive(Debug)]
pub struct OperationHandle<T: Send + 'static>
{
    operation: PendingOperation<T>,
}

impl<T: Send + 'static> OperationHandle<T>
{
    /// Make a new operation handle.
    pub fn new(operation: PendingOperation<T>) -> Self
    {
        Self{ operation }
    }

    /// Access the operation.
    pub fn operation(&self) -> &PendingOperation<T>
    {
        &self.operation
    }
}

impl<T: Send + 'static> Handle for OperationHandle<T>
{
    type Output = T;

    fn get(self) -> Result<T, Suspend<T>>
    {
        try_suspend(&self.operation)
    }
}

impl<T: Send + 'static> From<PendingOperation<T>> for OperationHandle<T>
{
    fn from(operation: PendingOperation<T>) -> Self
    {
        Self::new(operation)
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A handle that finishes deferred work when resolved.
///
/// The closure runs on whichever thread resolves the handle and may itself suspend.
pub struct FnHandle<T, F>
{
    deferred: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, F> FnHandle<T, F>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Suspend<T>> + Send + 'static
{
    /// Make a new deferred handle.
    pub fn new(deferred: F) -> Self
    {
        Self{ deferred, _phantom: PhantomData }
    }
}

impl<T, F> Handle for FnHandle<T, F>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, Suspend<T>> + Send + 'static
{
    type Output = T;

    fn get(self) -> Result<T, Suspend<T>>
    {
        (self.deferred)()
    }
}

impl<T, F> Debug for FnHandle<T, F>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("FnHandle").field("output", &std::any::type_name::<T>()).finish()
    }
}

//-------------------------------------------------------------------------------------------------------------------
