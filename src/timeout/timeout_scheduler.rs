//local shortcuts
use crate::*;

//third-party shortcuts
use wasm_timer::Instant;

//standard shortcuts
use core::fmt::Debug;
use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

static SHARED_SCHEDULER: OnceLock<TimeoutScheduler> = OnceLock::new();

//-------------------------------------------------------------------------------------------------------------------

pub(crate) struct TimeoutEntry
{
    deadline: Instant,
    /// tie-breaker so entries with equal deadlines fire in schedule order
    seq: u64,
    state: Arc<TimeoutEntryState>,
    target: Arc<dyn Cancelable>,
}

impl TimeoutEntry
{
    fn fire(self)
    {
        if !self.state.try_fire() { return; }
        tracing::debug!("timeout fired, cancelling target");
        self.target.cancel(true);
    }
}

impl PartialEq for TimeoutEntry
{
    fn eq(&self, other: &Self) -> bool
    {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for TimeoutEntry {}

impl PartialOrd for TimeoutEntry
{
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering>
    {
        Some(self.cmp(other))
    }
}

impl Ord for TimeoutEntry
{
    fn cmp(&self, other: &Self) -> CmpOrdering
    {
        self.deadline.cmp(&other.deadline).then(self.seq.cmp(&other.seq))
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Messages to the worker thread.
#[derive(Debug)]
pub(crate) enum WorkerMessage
{
    /// Track a new timeout.
    Schedule(TimeoutEntry),
    /// A timeout was called off; reap it now instead of at its deadline.
    Wake,
}

//-------------------------------------------------------------------------------------------------------------------

#[derive(Debug)]
struct SchedulerState
{
    /// feeds the worker thread; `None` while no worker is running
    sender: Option<crossbeam::channel::Sender<WorkerMessage>>,
    /// sequence number for the next entry
    next_seq: u64,
}

#[derive(Debug)]
struct SchedulerShared
{
    config: TimeoutSchedulerConfig,
    state: Mutex<SchedulerState>,
    /// entries that have neither fired nor been cancelled
    live: Arc<AtomicUsize>,
}

impl SchedulerShared
{
    fn state(&self) -> MutexGuard<'_, SchedulerState>
    {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for TimeoutEntry
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("TimeoutEntry").field("deadline", &self.deadline).field("seq", &self.seq).finish()
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// Worker loop: fire entries as they come due, exit after sitting idle for the configured timeout.
fn run_worker(shared: Arc<SchedulerShared>, receiver: crossbeam::channel::Receiver<WorkerMessage>)
{
    tracing::debug!(thread = shared.config.thread_name.as_str(), "timeout worker started");
    let mut entries: BinaryHeap<Reverse<TimeoutEntry>> = BinaryHeap::new();

    loop
    {
        // fire everything that is due
        let now = Instant::now();
        while entries.peek().map_or(false, |Reverse(entry)| entry.deadline <= now)
        {
            let Some(Reverse(entry)) = entries.pop() else { break; };
            entry.fire();
        }

        // cancelled entries are reaped here instead of waiting for their deadlines
        entries.retain(|Reverse(entry)| entry.state.is_scheduled());

        let wait = entries
            .peek()
            .map(|Reverse(entry)| entry.deadline.saturating_duration_since(now))
            .unwrap_or(shared.config.idle_timeout);

        match receiver.recv_timeout(wait)
        {
            Ok(WorkerMessage::Schedule(entry)) => entries.push(Reverse(entry)),
            Ok(WorkerMessage::Wake)            => (),
            Err(crossbeam::channel::RecvTimeoutError::Timeout) =>
            {
                if !entries.is_empty() { continue; }

                // schedules send while holding the state lock, so an empty channel here means nothing is in flight
                let mut state = shared.state();
                if !receiver.is_empty() { continue; }
                state.sender = None;
                break;
            }
            Err(crossbeam::channel::RecvTimeoutError::Disconnected) =>
            {
                tracing::warn!("timeout worker channel disconnected");
                break;
            }
        }
    }

    tracing::debug!(thread = shared.config.thread_name.as_str(), "timeout worker idle, exiting");
}

//-------------------------------------------------------------------------------------------------------------------

/// Schedules cancellations after a delay unless they are called off first.
///
/// All timeouts of a scheduler run on one background thread. The thread is spawned on demand and exits after
/// [`TimeoutSchedulerConfig::idle_timeout`] with nothing scheduled, so an idle scheduler holds no thread.
///
/// [`TimeoutScheduler::shared()`] is the process-wide scheduler.
#[derive(Debug, Clone)]
pub struct TimeoutScheduler
{
    shared: Arc<SchedulerShared>,
}

impl TimeoutScheduler
{
    /// Make a new scheduler.
    pub fn new(config: TimeoutSchedulerConfig) -> Self
    {
        Self{
            shared: Arc::new(SchedulerShared{
                config,
                state : Mutex::new(SchedulerState{ sender: None, next_seq: 0u64 }),
                live  : Arc::new(AtomicUsize::new(0usize)),
            })
        }
    }

    /// Access the process-wide scheduler (created with the default config on first use).
    pub fn shared() -> &'static TimeoutScheduler
    {
        SHARED_SCHEDULER.get_or_init(|| TimeoutScheduler::new(TimeoutSchedulerConfig::default()))
    }

    /// Access the config.
    pub fn config(&self) -> &TimeoutSchedulerConfig
    {
        &self.shared.config
    }

    /// Schedule `cancelable.cancel(true)` to run after `delay`.
    ///
    /// The returned handle's [`TimeoutHandle::cancel()`] calls the timeout off. Firing and calling off race; whichever
    /// happens second is a no-op.
    pub fn schedule_cancellation(&self, cancelable: Arc<dyn Cancelable>, delay: Duration) -> TimeoutHandle
    {
        let deadline = Instant::now() + delay;
        let entry_state = Arc::new(TimeoutEntryState::new(self.shared.live.clone()));

        let mut state = self.shared.state();
        let seq = state.next_seq;
        state.next_seq += 1;
        let mut message = WorkerMessage::Schedule(
                TimeoutEntry{ deadline, seq, state: entry_state.clone(), target: cancelable }
            );

        // reuse the running worker if there is one
        if let Some(sender) = &state.sender
        {
            match sender.send(message)
            {
                Ok(()) =>
                {
                    tracing::trace!(?delay, "timeout scheduled");
                    return TimeoutHandle::new(entry_state, deadline, Some(sender.clone()));
                }
                Err(crossbeam::channel::SendError(returned)) => message = returned,
            }
        }

        // spawn a worker
        let (sender, receiver) = crossbeam::channel::unbounded();
        let shared = self.shared.clone();
        let spawned = std::thread::Builder::new()
            .name(self.shared.config.thread_name.clone())
            .spawn(move || run_worker(shared, receiver));

        match spawned
        {
            Ok(_) =>
            {
                let _ = sender.send(message);
                state.sender = Some(sender.clone());
                tracing::trace!(?delay, "timeout scheduled");
                TimeoutHandle::new(entry_state, deadline, Some(sender))
            }
            Err(error) =>
            {
                // nothing will ever fire this entry
                tracing::error!(?error, "failed spawning timeout worker");
                entry_state.try_cancel();
                TimeoutHandle::new(entry_state, deadline, None)
            }
        }
    }

    /// Schedule cancellation of a pending operation after `delay`.
    ///
    /// The timeout posts [`OperationError::Cancelled`] without holding a producer handle, so it neither keeps the
    /// operation alive nor stops it from being interrupted when its producers are dropped.
    pub fn schedule_operation_timeout<T: Send + 'static>(
        &self,
        operation : &PendingOperation<T>,
        delay     : Duration,
    ) -> TimeoutHandle
    {
        self.schedule_cancellation(Arc::new(OperationCanceller::new(operation)), delay)
    }

    /// Get the number of timeouts that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize
    {
        self.shared.live.load(Ordering::Acquire)
    }

    /// Check if the worker thread is running.
    pub fn is_worker_running(&self) -> bool
    {
        self.shared.state().sender.is_some()
    }
}

impl Default for TimeoutScheduler
{
    fn default() -> Self
    {
        Self::new(TimeoutSchedulerConfig::default())
    }
}

//-------------------------------------------------------------------------------------------------------------------
