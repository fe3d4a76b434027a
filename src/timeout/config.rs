//local shortcuts

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

/// Config for a [`TimeoutScheduler`](crate::TimeoutScheduler).
#[derive(Debug, Clone)]
pub struct TimeoutSchedulerConfig
{
    /// How long the worker thread waits with nothing scheduled before exiting. Defaults to 60 seconds.
    ///
    /// A new worker is spawned on the next schedule, so an idle scheduler holds no thread.
    pub idle_timeout: Duration,
    /// Name of the worker thread. Defaults to `"pending-op-timeouts"`.
    pub thread_name: String,
}

impl Default for TimeoutSchedulerConfig
{
    fn default() -> TimeoutSchedulerConfig
    {
        TimeoutSchedulerConfig{
                idle_timeout : Duration::from_secs(60),
                thread_name  : String::from("pending-op-timeouts"),
            }
    }
}

//-------------------------------------------------------------------------------------------------------------------
