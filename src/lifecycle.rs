//! # Lock Lifecycle Orchestrator
//!
//! Decision layer between a message-processing pipeline and one broker
//! lease: proves the consumer still owns the message before work proceeds,
//! and maps the outcome of processing onto exactly one broker-facing action.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  validate / complete / faulted  ┌───────────────┐
//! │  Processing  │────────────────────────────────▶│ LockLifecycle │
//! │  pipeline    │                                 │               │
//! └──────────────┘                                 └───────┬───────┘
//!                                                          │ complete /
//!                                                          │ abandon
//!                                                  ┌───────▼───────┐
//!                                                  │  Lock handle  │
//!                                                  │  (broker)     │
//!                                                  └───────────────┘
//! ```
//!
//! One lifecycle wraps one delivered message and one lock handle, lives for
//! the duration of that message's processing, and is consumed by its
//! terminal call. The terminal operations take `self` by value, so issuing
//! a second terminal action against the same lease does not compile.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use chrono::Utc;
//! use lease_core::{LeasedMessage, LockLifecycle, LockLifecycleError};
//! use lease_core::lock::InMemoryLockHandle;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let message = LeasedMessage::new("m-1", Utc::now(), Duration::from_secs(60));
//! let handle = InMemoryLockHandle::new(Duration::from_secs(30));
//! let lifecycle = LockLifecycle::new(message, handle);
//!
//! lifecycle.validate_lock_status()?;
//!
//! match run_handler().await {
//!     Ok(()) => lifecycle.complete().await?,
//!     Err(error) => {
//!         lifecycle.faulted(LockLifecycleError::Application(error)).await;
//!     }
//! }
//! # Ok(())
//! # }
//! # async fn run_handler() -> Result<(), anyhow::Error> { Ok(()) }
//! ```

use chrono::Utc;
use tracing::warn;

use crate::errors::{BrokerError, FaultDisposition, LockLifecycleError, LockLifecycleResult};
use crate::lock::MessageLockHandle;
use crate::message::LeasedMessage;

/// Lock lifecycle for one delivered message
///
/// Holds no state beyond its constructor inputs and performs no caching:
/// every validation re-reads the lease boundary from the handle, so a
/// renewal performed by the surrounding consumer is observed immediately.
#[derive(Debug)]
pub struct LockLifecycle<H: MessageLockHandle> {
    message: LeasedMessage,
    handle: H,
}

impl<H: MessageLockHandle> LockLifecycle<H> {
    /// Wrap one delivered message and its lock handle
    pub fn new(message: LeasedMessage, handle: H) -> Self {
        Self { message, handle }
    }

    /// Metadata for the wrapped message
    pub fn message(&self) -> &LeasedMessage {
        &self.message
    }

    /// Prove the consumer still legitimately owns this message
    ///
    /// Checks the lease boundary first, then the message's own TTL window.
    /// Pure and side-effect-free; call it before processing begins and again
    /// before long-running processing resumes. It does not renew the lease.
    ///
    /// # Errors
    ///
    /// - [`LockLifecycleError::LockExpired`] when the lease deadline has
    ///   passed. Processing must stop and the message must not be touched
    ///   further; redelivery is the broker's responsibility.
    /// - [`LockLifecycleError::TtlExpired`] when the message itself is stale
    ///   per broker policy, independent of lock state.
    pub fn validate_lock_status(&self) -> LockLifecycleResult<()> {
        let now = Utc::now();

        if now >= self.handle.locked_until() {
            return Err(LockLifecycleError::lock_expired(
                self.message.message_id.clone(),
            ));
        }

        // TTL expiry is recomputed from enqueue time + configured TTL; the
        // broker-derived absolute field is wrong in edge cases.
        if let Some(expires_at) = self.message.ttl_expires_at() {
            if now >= expires_at {
                return Err(LockLifecycleError::ttl_expired(
                    self.message.message_id.clone(),
                ));
            }
        }

        Ok(())
    }

    /// Acknowledge successful processing
    ///
    /// Delegates unconditionally to the handle. Broker failures propagate
    /// verbatim: a failed complete may imply duplicate delivery and must be
    /// visible to the processing pipeline.
    pub async fn complete(self) -> Result<(), BrokerError> {
        self.handle.complete().await
    }

    /// Resolve a failed delivery attempt
    ///
    /// Classifies the processing error and either abandons the message for
    /// immediate redelivery or takes no broker action at all (lock-loss
    /// errors, where an abandon cannot reliably succeed and the broker will
    /// redeliver on its own). Returns the disposition that was taken.
    ///
    /// Never fails: if the abandon attempt itself errors — the lease can
    /// quietly expire between classification and the broker call — the
    /// secondary failure is logged at warning level and swallowed. The
    /// original processing error already determines the outcome, and a
    /// failed abandon is non-actionable since the lease expires naturally.
    pub async fn faulted(self, error: LockLifecycleError) -> FaultDisposition {
        let disposition = error.disposition();

        if disposition == FaultDisposition::Abandon {
            if let Err(abandon_error) = self.handle.abandon(&error).await {
                warn!(
                    message_id = %self.message.message_id,
                    error = %error,
                    abandon_error = %abandon_error,
                    "Abandon failed; redelivery will occur at lease expiry"
                );
            }
        }

        disposition
    }
}
