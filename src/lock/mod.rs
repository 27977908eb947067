//! # Lock Handle Seam
//!
//! Trait definition for one outstanding message lease.
//!
//! A lock handle is the narrow interface to the broker client: it performs
//! the actual complete/abandon/renew calls and owns the current lease
//! boundary. The lifecycle orchestrator never talks to the broker except
//! through this trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::{BrokerError, LockLifecycleError};

pub mod in_memory;

pub use in_memory::InMemoryLockHandle;

/// Broker-side operations on one outstanding message lease
///
/// Implementations wrap a broker client's per-message receipt state. The
/// trait is designed to be implementable by any lease-based broker that
/// supports:
///
/// - Message acknowledgment (complete)
/// - Voluntary release for immediate redelivery (abandon)
/// - Lease extension (renew)
///
/// A handle is exclusively owned by one lifecycle for the message's
/// lifetime; no other component may call complete/abandon/renew on it
/// concurrently.
#[async_trait]
pub trait MessageLockHandle: Send + Sync {
    /// Current lease boundary for this message
    ///
    /// The instant at which the broker considers the lease expired and the
    /// message eligible for redelivery. Only the broker moves this value
    /// (via [`renew_lock`](Self::renew_lock)); callers re-read it on every
    /// validation so an external renewal is observed.
    fn locked_until(&self) -> DateTime<Utc>;

    /// Acknowledge successful processing
    ///
    /// Permanently removes the message from the broker's pending set.
    async fn complete(&self) -> Result<(), BrokerError>;

    /// Return the message to the broker for immediate redelivery
    ///
    /// Attaches the original processing error as a diagnostic reason. The
    /// message becomes visible to other consumers without waiting for the
    /// lease to expire.
    async fn abandon(&self, reason: &LockLifecycleError) -> Result<(), BrokerError>;

    /// Extend the lease during long-running processing
    ///
    /// Returns the new lease boundary. Scheduling renewals is the
    /// surrounding consumer's responsibility, not this layer's; the
    /// lifecycle orchestrator only observes the updated boundary through
    /// [`locked_until`](Self::locked_until).
    async fn renew_lock(&self) -> Result<DateTime<Utc>, BrokerError>;
}

#[async_trait]
impl<T: MessageLockHandle + ?Sized> MessageLockHandle for Arc<T> {
    fn locked_until(&self) -> DateTime<Utc> {
        (**self).locked_until()
    }

    async fn complete(&self) -> Result<(), BrokerError> {
        (**self).complete().await
    }

    async fn abandon(&self, reason: &LockLifecycleError) -> Result<(), BrokerError> {
        (**self).abandon(reason).await
    }

    async fn renew_lock(&self) -> Result<DateTime<Utc>, BrokerError> {
        (**self).renew_lock().await
    }
}
