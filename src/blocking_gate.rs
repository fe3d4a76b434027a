//local shortcuts

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::cell::Cell;
use std::marker::PhantomData;

//-------------------------------------------------------------------------------------------------------------------

thread_local!
{
    /// Number of live blocking suppressions on this thread.
    static OFF_COUNT: Cell<i32> = const { Cell::new(0i32) };
}

fn restore()
{
    OFF_COUNT.with(
            |count|
            {
                let current = count.get();
                if current <= 0
                {
                    tracing::warn!("blocking gate restored more times than it was suppressed");
                    return;
                }
                count.set(current - 1);
                tracing::trace!(off_count = current - 1, "blocking gate restored");
            }
        );
}

//-------------------------------------------------------------------------------------------------------------------

/// Per-thread switch deciding whether suspend points may block.
///
/// While blocking is allowed (the default), [`try_suspend()`](crate::try_suspend) blocks on a pending operation.
/// While it is suppressed, `try_suspend()` returns a [`Signal`](crate::Signal) instead so the caller can abandon the
/// current attempt, register a listener, or propagate the signal.
///
/// Suppression nests: each [`BlockingGate::suppress()`] returns a guard, and blocking is only allowed again once every
/// guard on the thread has been dropped. Guards cannot leave their thread, so a pooled worker can't leak a
/// suppression into the next task unless the guard is leaked (e.g. with `std::mem::forget`).
pub struct BlockingGate;

impl BlockingGate
{
    /// Suppress blocking on this thread until the returned guard is dropped.
    pub fn suppress() -> SuppressGuard
    {
        OFF_COUNT.with(
                |count|
                {
                    let next = count.get() + 1;
                    count.set(next);
                    tracing::trace!(off_count = next, "blocking gate suppressed");
                }
            );
        SuppressGuard{ _not_send: PhantomData }
    }

    /// Check if suspend points on this thread may block.
    pub fn is_blocking_allowed() -> bool
    {
        Self::off_count() == 0
    }

    /// Get the number of live suppressions on this thread.
    pub fn off_count() -> i32
    {
        OFF_COUNT.with(|count| count.get())
    }

    /// Run `f` with blocking suppressed.
    pub fn suppressed<R>(f: impl FnOnce() -> R) -> R
    {
        let _guard = Self::suppress();
        f()
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Restores the [`BlockingGate`] when dropped.
#[must_use = "blocking is restored as soon as the guard is dropped"]
pub struct SuppressGuard
{
    _not_send: PhantomData<*const ()>,
}

impl SuppressGuard
{
    /// Restore the gate now.
    pub fn restore(self)
    {
        drop(self);
    }
}

impl Drop for SuppressGuard
{
    fn drop(&mut self)
    {
        restore();
    }
}

impl Debug for SuppressGuard
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("SuppressGuard").field("off_count", &BlockingGate::off_count()).finish()
    }
}

//-------------------------------------------------------------------------------------------------------------------
