//local shortcuts
use super::timeout_scheduler::WorkerMessage;

//third-party shortcuts
use wasm_timer::Instant;

//standard shortcuts
use core::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

//-------------------------------------------------------------------------------------------------------------------

const SCHEDULED : u8 = 0u8;
const FIRED     : u8 = 1u8;
const CANCELLED : u8 = 2u8;

//-------------------------------------------------------------------------------------------------------------------

/// Shared state of one scheduled timeout. Firing and cancelling race on a single compare-exchange.
#[derive(Debug)]
pub(crate) struct TimeoutEntryState
{
    state: AtomicU8,
    /// the owning scheduler's count of entries that are still scheduled
    live: Arc<AtomicUsize>,
}

impl TimeoutEntryState
{
    pub(crate) fn new(live: Arc<AtomicUsize>) -> Self
    {
        live.fetch_add(1, Ordering::AcqRel);
        Self{ state: AtomicU8::new(SCHEDULED), live }
    }

    fn finish(&self, next: u8) -> bool
    {
        if self.state.compare_exchange(SCHEDULED, next, Ordering::AcqRel, Ordering::Acquire).is_err()
        {
            return false;
        }
        self.live.fetch_sub(1, Ordering::AcqRel);
        true
    }

    /// Claim the entry for firing. Fails if it already fired or was cancelled.
    pub(crate) fn try_fire(&self) -> bool
    {
        self.finish(FIRED)
    }

    /// Claim the entry for cancelling. Fails if it already fired or was cancelled.
    pub(crate) fn try_cancel(&self) -> bool
    {
        self.finish(CANCELLED)
    }

    pub(crate) fn is_scheduled(&self) -> bool
    {
        self.state.load(Ordering::Acquire) == SCHEDULED
    }

    fn is_fired(&self) -> bool
    {
        self.state.load(Ordering::Acquire) == FIRED
    }

    fn is_cancelled(&self) -> bool
    {
        self.state.load(Ordering::Acquire) == CANCELLED
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Handle to a scheduled cancellation (see [`TimeoutScheduler`](crate::TimeoutScheduler)).
///
/// Dropping the handle does not cancel the timeout.
#[derive(Debug, Clone)]
pub struct TimeoutHandle
{
    entry: Arc<TimeoutEntryState>,
    deadline: Instant,
    /// the worker holding the entry
    worker: Option<crossbeam::channel::Sender<WorkerMessage>>,
}

impl TimeoutHandle
{
    pub(crate) fn new(
        entry    : Arc<TimeoutEntryState>,
        deadline : Instant,
        worker   : Option<crossbeam::channel::Sender<WorkerMessage>>,
    ) -> Self
    {
        Self{ entry, deadline, worker }
    }

    /// Abort the scheduled cancellation.
    ///
    /// Returns `false` (and does nothing) if the timeout already fired or was already cancelled. The worker is woken
    /// to drop the entry, so a called-off timeout never keeps the worker thread alive.
    pub fn cancel(&self) -> bool
    {
        if !self.entry.try_cancel() { return false; }
        tracing::debug!("timeout cancelled");

        // fails only if that worker already exited
        if let Some(worker) = &self.worker { let _ = worker.send(WorkerMessage::Wake); }
        true
    }

    /// Check if the timeout fired.
    pub fn is_fired(&self) -> bool
    {
        self.entry.is_fired()
    }

    /// Check if the timeout was cancelled before it fired.
    pub fn is_cancelled(&self) -> bool
    {
        self.entry.is_cancelled()
    }

    /// Get the time the timeout fires at.
    pub fn deadline(&self) -> Instant
    {
        self.deadline
    }
}

//-------------------------------------------------------------------------------------------------------------------
