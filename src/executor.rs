//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::sync::Arc;

//-------------------------------------------------------------------------------------------------------------------

/// Runs listener deliveries on behalf of a producer.
pub trait Executor: Send + Sync + 'static
{
    /// Run the task (now or later, on any thread).
    fn execute(&self, task: Box<dyn FnOnce() + Send + 'static>);
}

impl<E: Executor + ?Sized> Executor for Arc<E>
{
    fn execute(&self, task: Box<dyn FnOnce() + Send + 'static>)
    {
        (**self).execute(task)
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Runs each task on a new `std` thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadExecutor;

impl Executor for ThreadExecutor
{
    fn execute(&self, task: Box<dyn FnOnce() + Send + 'static>)
    {
        std::thread::spawn(move || task());
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Runs each task immediately on the calling thread.
#[derive(Debug, Clone, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor
{
    fn execute(&self, task: Box<dyn FnOnce() + Send + 'static>)
    {
        task();
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A [`ResultCallback`] that hands listener delivery to an [`Executor`].
///
/// The outcome is still recorded on the posting thread, so double posts fail immediately and readers of the
/// operation see the outcome as soon as the post returns. Only the listener runs on the executor.
pub struct ExecutorCallback<T: Send + 'static, E: Executor>
{
    callback: ResultCallback<T>,
    executor: E,
}

impl<T: Send + 'static, E: Executor> ExecutorCallback<T, E>
{
    /// Make a new executor callback.
    pub fn new(callback: ResultCallback<T>, executor: E) -> Self
    {
        Self{ callback, executor }
    }

    /// See [`ResultCallback::post_value()`].
    pub fn post_value(&self, value: T) -> Result<(), InvalidState>
    {
        self.post(Ok(value))
    }

    /// See [`ResultCallback::post_error()`].
    pub fn post_error(&self, error: OperationError) -> Result<(), InvalidState>
    {
        self.post(Err(error))
    }

    /// See [`ResultCallback::post()`].
    pub fn post(&self, outcome: Outcome<T>) -> Result<(), InvalidState>
    {
        self.callback.post_with(outcome, &self.executor)
    }

    /// See [`ResultCallback::cancel()`].
    pub fn cancel(&self) -> Result<(), InvalidState>
    {
        self.post_error(OperationError::Cancelled)
    }

    /// Access the executor.
    pub fn executor(&self) -> &E
    {
        &self.executor
    }

    /// Unwrap the inner callback.
    pub fn into_inner(self) -> ResultCallback<T>
    {
        self.callback
    }
}

impl<T: Send + 'static, E: Executor + Debug> Debug for ExecutorCallback<T, E>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("ExecutorCallback")
            .field("callback", &self.callback)
            .field("executor", &self.executor)
            .finish()
    }
}

//-------------------------------------------------------------------------------------------------------------------
