//! # Lock Lifecycle Error Types
//!
//! Structured error handling for the lock-lifecycle layer using thiserror.
//!
//! Two layers: [`BrokerError`] for failures reported by the broker through a
//! lock handle, and [`LockLifecycleError`] for everything that can flow out
//! of message processing and into fault classification. The classification
//! table itself lives on [`LockLifecycleError::disposition`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::MessageId;

/// Result type alias for lock-lifecycle operations
pub type LockLifecycleResult<T> = Result<T, LockLifecycleError>;

/// Failures reported by the broker or the lock handle
#[derive(Error, Debug)]
pub enum BrokerError {
    /// The broker no longer recognizes the message lock
    #[error("Message lock lost: {message}")]
    LockLost { message: String },

    /// The session lock backing this message was lost
    #[error("Session lock lost: {message}")]
    SessionLockLost { message: String },

    /// Communication with the broker failed; the lock state is unknown
    #[error("Broker communication failure: {message}")]
    Communication { message: String },

    /// The broker rejected an operation for any other reason
    #[error("Broker operation failed: {operation}: {message}")]
    OperationFailed { operation: String, message: String },

    /// An operation against the broker timed out
    #[error("Broker operation timed out: {operation} after {timeout_seconds}s")]
    Timeout {
        operation: String,
        timeout_seconds: u64,
    },
}

impl BrokerError {
    /// Create a lock lost error
    pub fn lock_lost(message: impl Into<String>) -> Self {
        Self::LockLost {
            message: message.into(),
        }
    }

    /// Create a session lock lost error
    pub fn session_lock_lost(message: impl Into<String>) -> Self {
        Self::SessionLockLost {
            message: message.into(),
        }
    }

    /// Create a communication failure error
    pub fn communication(message: impl Into<String>) -> Self {
        Self::Communication {
            message: message.into(),
        }
    }

    /// Create an operation failure error
    pub fn operation_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_seconds,
        }
    }

    /// Whether the lock behind this error is unrecoverable or in an unknown
    /// state
    ///
    /// True for lock loss, session lock loss, and communication failures. In
    /// all three cases a subsequent abandon cannot reliably succeed and may
    /// itself fault, so callers skip the broker round trip and let the lease
    /// expire naturally.
    pub fn is_lock_unrecoverable(&self) -> bool {
        matches!(
            self,
            Self::LockLost { .. } | Self::SessionLockLost { .. } | Self::Communication { .. }
        )
    }
}

/// Errors surfaced to and by the message-processing pipeline
///
/// This is the terminal error currency of the lifecycle layer: validation
/// failures, broker failures, and application failures all arrive here, and
/// [`disposition`](Self::disposition) maps each onto a broker-facing action.
#[derive(Error, Debug)]
pub enum LockLifecycleError {
    /// The consumer's lease on the message passed its deadline
    #[error("The message lock expired: {message_id}")]
    LockExpired { message_id: MessageId },

    /// The message's own time-to-live elapsed, independent of lock state
    #[error("The message expired: {message_id}")]
    TtlExpired { message_id: MessageId },

    /// A broker-reported failure
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Any other error raised while processing the message
    #[error("Message processing failed: {0}")]
    Application(#[from] anyhow::Error),
}

impl LockLifecycleError {
    /// Create a lock expired error
    pub fn lock_expired(message_id: impl Into<MessageId>) -> Self {
        Self::LockExpired {
            message_id: message_id.into(),
        }
    }

    /// Create a TTL expired error
    pub fn ttl_expired(message_id: impl Into<MessageId>) -> Self {
        Self::TtlExpired {
            message_id: message_id.into(),
        }
    }

    /// Create an application failure from a plain message
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application(anyhow::anyhow!(message.into()))
    }

    /// Map this error onto the broker-facing action `faulted` must take
    ///
    /// Locally observed expiry and broker-reported lock loss collapse to
    /// [`FaultDisposition::SilentSkip`]: the broker has already or will
    /// already redeliver the message on its own, and an abandon call against
    /// a gone lock yields no benefit. Everything else abandons explicitly so
    /// redelivery happens immediately instead of at lease expiry.
    pub fn disposition(&self) -> FaultDisposition {
        match self {
            Self::LockExpired { .. } | Self::TtlExpired { .. } => FaultDisposition::SilentSkip,
            Self::Broker(broker) if broker.is_lock_unrecoverable() => FaultDisposition::SilentSkip,
            Self::Broker(_) | Self::Application(_) => FaultDisposition::Abandon,
        }
    }
}

/// Broker-facing action chosen for a faulted message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultDisposition {
    /// Return the message to the broker for immediate redelivery
    Abandon,
    /// Take no broker action; the lease expires naturally
    SilentSkip,
}

impl std::fmt::Display for FaultDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultDisposition::Abandon => write!(f, "abandon"),
            FaultDisposition::SilentSkip => write!(f, "silent_skip"),
        }
    }
}
