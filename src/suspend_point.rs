//local shortcuts
use crate::*;

//third-party shortcuts

//standard shortcuts


//-------------------------------------------------------------------------------------------------------------------

/// Get an operation's result at a suspend point.
///
/// 1. If the operation already has an outcome, return it.
/// 2. Otherwise, if the [`BlockingGate`] allows blocking on this thread, block until the outcome arrives.
/// 3. Otherwise return [`Suspend::Pending`] with a [`Signal`] carrying `operation` itself.
pub fn try_suspend<T: Send + 'static>(operation: &PendingOperation<T>) -> Result<T, Suspend<T>>
{
    match operation.try_get_now()
    {
        Err(Suspend::Pending(signal)) if BlockingGate::is_blocking_allowed() =>
        {
            signal.block().map_err(Suspend::Failed)
        }
        other => other,
    }
}

//-------------------------------------------------------------------------------------------------------------------
