//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::sync::Arc;

//-------------------------------------------------------------------------------------------------------------------

/// Producer-side handle for posting the outcome of a [`PendingOperation`] exactly once.
///
/// Posting runs an already-attached listener synchronously on the posting thread, after the outcome is recorded.
/// Producers that must not run arbitrary listener code should post through [`ResultCallback::via()`].
///
/// Dropping every handle of an operation without posting resolves it to [`OperationError::Interrupted`].
pub struct ResultCallback<T: Send + 'static>
{
    inner: Arc<OperationInner<T>>,
}

impl<T: Send + 'static> ResultCallback<T>
{
    pub(crate) fn new(inner: Arc<OperationInner<T>>) -> Self
    {
        inner.add_producer();
        Self{ inner }
    }

    /// Post the operation's value.
    pub fn post_value(&self, value: T) -> Result<(), InvalidState>
    {
        self.post(Ok(value))
    }

    /// Post an error in place of the operation's value.
    pub fn post_error(&self, error: OperationError) -> Result<(), InvalidState>
    {
        self.post(Err(error))
    }

    /// Post the operation's outcome.
    ///
    /// Fails with [`InvalidState::ResultAlreadyPosted`] if an outcome was already posted. The first outcome is
    /// unaffected.
    pub fn post(&self, outcome: Outcome<T>) -> Result<(), InvalidState>
    {
        self.inner.post(outcome, None)
    }

    /// Post [`OperationError::Cancelled`].
    pub fn cancel(&self) -> Result<(), InvalidState>
    {
        self.post_error(OperationError::Cancelled)
    }

    /// Wrap this callback so listeners are invoked from `executor` instead of the posting thread.
    pub fn via<E>(self, executor: E) -> ExecutorCallback<T, E>
    where
        E: Executor
    {
        ExecutorCallback::new(self, executor)
    }

    pub(crate) fn post_with(&self, outcome: Outcome<T>, executor: &dyn Executor) -> Result<(), InvalidState>
    {
        self.inner.post(outcome, Some(executor))
    }
}

impl<T: Send + 'static> Clone for ResultCallback<T>
{
    fn clone(&self) -> Self
    {
        Self::new(self.inner.clone())
    }
}

impl<T: Send + 'static> Drop for ResultCallback<T>
{
    fn drop(&mut self)
    {
        self.inner.remove_producer();
    }
}

impl<T: Send + 'static> Debug for ResultCallback<T>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("ResultCallback")
            .field("result_type", &std::any::type_name::<T>())
            .finish()
    }
}

//-------------------------------------------------------------------------------------------------------------------
