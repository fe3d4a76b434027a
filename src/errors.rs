//local shortcuts

//third-party shortcuts

//standard shortcuts
use core::fmt::Debug;
use std::sync::Arc;

//-------------------------------------------------------------------------------------------------------------------

/// Protocol violations on a [`PendingOperation`](crate::PendingOperation).
///
/// These mean the single-producer/single-consumer contract was broken by calling code. They are not retryable: the
/// operation's state is no longer trustworthy once one of these appears.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InvalidState
{
    /// A result was already posted to the operation.
    ResultAlreadyPosted,
    /// A listener was already attached to the operation.
    ListenerAlreadyAttached,
    /// The result was already handed to a consumer.
    ResultAlreadyConsumed,
}

impl std::fmt::Display for InvalidState
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        let _ = write!(f, "InvalidState::");
        match self
        {
            InvalidState::ResultAlreadyPosted     => write!(f, "ResultAlreadyPosted"),
            InvalidState::ListenerAlreadyAttached => write!(f, "ListenerAlreadyAttached"),
            InvalidState::ResultAlreadyConsumed   => write!(f, "ResultAlreadyConsumed"),
        }
    }
}
impl std::error::Error for InvalidState {}

//-------------------------------------------------------------------------------------------------------------------

/// Errors delivered to the consumer of a [`PendingOperation`](crate::PendingOperation) in place of a value.
///
/// Every consumption mode (blocking, listener, signal) observes these through the same channel as a value.
#[derive(Debug, Clone)]
pub enum OperationError
{
    /// The producer posted an error.
    Failed(Arc<dyn std::error::Error + Send + Sync + 'static>),
    /// The operation was cancelled (explicitly or by a timeout).
    Cancelled,
    /// Every producer handle was dropped without posting, so a waiting consumer was woken without a result.
    Interrupted,
    /// The operation's protocol was violated on the consuming path.
    InvalidState(InvalidState),
}

impl OperationError
{
    /// Wrap a producer error.
    pub fn failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static
    {
        OperationError::Failed(Arc::new(error))
    }

    /// Check if this is a cancellation.
    pub fn is_cancelled(&self) -> bool
    {
        matches!(self, OperationError::Cancelled)
    }

    /// Check if this is an interruption.
    pub fn is_interrupted(&self) -> bool
    {
        matches!(self, OperationError::Interrupted)
    }

    /// Check if this is a protocol error of the caller rather than a posted outcome.
    pub fn is_invalid_state(&self) -> bool
    {
        matches!(self, OperationError::InvalidState(_))
    }

    /// Access the producer's error if this is [`OperationError::Failed`].
    pub fn source_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)>
    {
        match self
        {
            OperationError::Failed(error) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationError
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        let _ = write!(f, "OperationError::");
        match self
        {
            OperationError::Failed(error)       => write!(f, "Failed({})", error),
            OperationError::Cancelled           => write!(f, "Cancelled"),
            OperationError::Interrupted         => write!(f, "Interrupted"),
            OperationError::InvalidState(state) => write!(f, "InvalidState({})", state),
        }
    }
}

impl std::error::Error for OperationError
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)>
    {
        match self
        {
            OperationError::Failed(error)       => Some(error.as_ref()),
            OperationError::InvalidState(state) => Some(state),
            _ => None,
        }
    }
}

impl From<InvalidState> for OperationError
{
    fn from(state: InvalidState) -> Self
    {
        OperationError::InvalidState(state)
    }
}

//-------------------------------------------------------------------------------------------------------------------

/// A plain-message error for producers that have nothing richer to post.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MessageError(pub String);

impl MessageError
{
    /// Make a new message error.
    pub fn new(message: impl Into<String>) -> Self
    {
        MessageError(message.into())
    }
}

impl std::fmt::Display for MessageError
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for MessageError {}

//-------------------------------------------------------------------------------------------------------------------
