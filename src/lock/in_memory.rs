//! # In-Memory Lock Handle
//!
//! Thread-safe in-memory lease implementation for testing and development.
//!
//! ## Features
//!
//! - **Lease Tracking**: Holds the lease boundary and terminal state behind a
//!   `parking_lot` mutex
//! - **Failure Injection**: Scripted `BrokerError` per operation to exercise
//!   classification and warning paths without a broker
//! - **Call Accounting**: Counts complete/abandon/renew calls and records
//!   abandon reasons for assertions

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::MessageLockHandle;
use crate::errors::{BrokerError, LockLifecycleError};

const DEFAULT_RENEW_EXTENSION: Duration = Duration::from_secs(30);

/// Lease state tracked by the in-memory handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseState {
    /// Lease is held; no terminal operation has succeeded
    Held,
    /// The message was completed
    Completed,
    /// The message was abandoned back to the broker
    Abandoned,
}

/// Deadline `extension` from `start`, clamped to the representable range
fn clamped_deadline(start: DateTime<Utc>, extension: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(extension)
        .ok()
        .and_then(|extension| start.checked_add_signed(extension))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug)]
struct LeaseInner {
    locked_until: DateTime<Utc>,
    state: LeaseState,
    renew_extension: Duration,
    complete_calls: u32,
    abandon_calls: u32,
    renew_calls: u32,
    abandon_reasons: Vec<String>,
    fail_next_complete: Option<BrokerError>,
    fail_next_abandon: Option<BrokerError>,
    fail_next_renew: Option<BrokerError>,
}

/// In-memory lock handle for testing and development
///
/// Behaves like a broker-side lease: terminal operations succeed exactly
/// once, and any operation after a terminal one is rejected the way a broker
/// would reject it.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use lease_core::lock::{InMemoryLockHandle, MessageLockHandle};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = InMemoryLockHandle::new(Duration::from_secs(30));
///
/// assert!(handle.locked_until() > chrono::Utc::now());
/// handle.complete().await?;
/// assert_eq!(handle.complete_calls(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InMemoryLockHandle {
    inner: Mutex<LeaseInner>,
}

impl InMemoryLockHandle {
    /// Create a handle whose lease expires `lock_duration` from now
    pub fn new(lock_duration: Duration) -> Self {
        Self::locked_until_at(clamped_deadline(Utc::now(), lock_duration))
    }

    /// Create a handle with an explicit lease boundary
    ///
    /// A boundary in the past models a lease that already expired before the
    /// consumer got to the message.
    pub fn locked_until_at(locked_until: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(LeaseInner {
                locked_until,
                state: LeaseState::Held,
                renew_extension: DEFAULT_RENEW_EXTENSION,
                complete_calls: 0,
                abandon_calls: 0,
                renew_calls: 0,
                abandon_reasons: Vec::new(),
                fail_next_complete: None,
                fail_next_abandon: None,
                fail_next_renew: None,
            }),
        }
    }

    /// Script the next `complete` call to fail with the given error
    pub fn fail_next_complete(&self, error: BrokerError) {
        self.inner.lock().fail_next_complete = Some(error);
    }

    /// Script the next `abandon` call to fail with the given error
    pub fn fail_next_abandon(&self, error: BrokerError) {
        self.inner.lock().fail_next_abandon = Some(error);
    }

    /// Script the next `renew_lock` call to fail with the given error
    pub fn fail_next_renew(&self, error: BrokerError) {
        self.inner.lock().fail_next_renew = Some(error);
    }

    /// Set how far each successful renewal pushes the lease boundary
    pub fn set_renew_extension(&self, extension: Duration) {
        self.inner.lock().renew_extension = extension;
    }

    /// Current lease state
    pub fn state(&self) -> LeaseState {
        self.inner.lock().state
    }

    /// Number of times `complete` was invoked (including failed attempts)
    pub fn complete_calls(&self) -> u32 {
        self.inner.lock().complete_calls
    }

    /// Number of times `abandon` was invoked (including failed attempts)
    pub fn abandon_calls(&self) -> u32 {
        self.inner.lock().abandon_calls
    }

    /// Number of times `renew_lock` was invoked (including failed attempts)
    pub fn renew_calls(&self) -> u32 {
        self.inner.lock().renew_calls
    }

    /// Diagnostic reasons recorded by successful abandon calls
    pub fn abandon_reasons(&self) -> Vec<String> {
        self.inner.lock().abandon_reasons.clone()
    }
}

#[async_trait]
impl MessageLockHandle for InMemoryLockHandle {
    fn locked_until(&self) -> DateTime<Utc> {
        self.inner.lock().locked_until
    }

    async fn complete(&self) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        inner.complete_calls += 1;

        if let Some(error) = inner.fail_next_complete.take() {
            return Err(error);
        }
        if inner.state != LeaseState::Held {
            return Err(BrokerError::operation_failed(
                "complete",
                "lease is no longer held",
            ));
        }

        inner.state = LeaseState::Completed;
        Ok(())
    }

    async fn abandon(&self, reason: &LockLifecycleError) -> Result<(), BrokerError> {
        let mut inner = self.inner.lock();
        inner.abandon_calls += 1;

        if let Some(error) = inner.fail_next_abandon.take() {
            return Err(error);
        }
        if inner.state != LeaseState::Held {
            return Err(BrokerError::operation_failed(
                "abandon",
                "lease is no longer held",
            ));
        }

        inner.state = LeaseState::Abandoned;
        inner.abandon_reasons.push(reason.to_string());
        Ok(())
    }

    async fn renew_lock(&self) -> Result<DateTime<Utc>, BrokerError> {
        let mut inner = self.inner.lock();
        inner.renew_calls += 1;

        if let Some(error) = inner.fail_next_renew.take() {
            return Err(error);
        }
        if inner.state != LeaseState::Held {
            return Err(BrokerError::lock_lost("lease is no longer held"));
        }

        let renewed_until = clamped_deadline(Utc::now(), inner.renew_extension);
        inner.locked_until = renewed_until;
        Ok(renewed_until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_complete_transitions_to_completed() {
        let handle = InMemoryLockHandle::new(Duration::from_secs(30));
        assert_eq!(handle.state(), LeaseState::Held);

        handle.complete().await.expect("complete should succeed");

        assert_eq!(handle.state(), LeaseState::Completed);
        assert_eq!(handle.complete_calls(), 1);
    }

    #[tokio::test]
    async fn test_abandon_records_reason() {
        let handle = InMemoryLockHandle::new(Duration::from_secs(30));
        let reason = LockLifecycleError::application("handler failed");

        handle.abandon(&reason).await.expect("abandon should succeed");

        assert_eq!(handle.state(), LeaseState::Abandoned);
        assert_eq!(handle.abandon_reasons().len(), 1);
        assert!(handle.abandon_reasons()[0].contains("handler failed"));
    }

    #[tokio::test]
    async fn test_second_terminal_operation_is_rejected() {
        let handle = InMemoryLockHandle::new(Duration::from_secs(30));
        handle.complete().await.expect("first terminal succeeds");

        let err = handle
            .abandon(&LockLifecycleError::application("late failure"))
            .await
            .expect_err("terminal after terminal must fail");
        assert!(matches!(err, BrokerError::OperationFailed { .. }));
        assert_eq!(handle.state(), LeaseState::Completed);
    }

    #[tokio::test]
    async fn test_renew_pushes_lease_boundary_forward() {
        let handle = InMemoryLockHandle::new(Duration::from_secs(1));
        let before = handle.locked_until();

        handle.set_renew_extension(Duration::from_secs(300));
        let renewed_until = handle.renew_lock().await.expect("renew should succeed");

        assert!(renewed_until > before);
        assert_eq!(handle.locked_until(), renewed_until);
        assert_eq!(handle.renew_calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection_is_single_shot() {
        let handle = InMemoryLockHandle::new(Duration::from_secs(30));
        handle.fail_next_complete(BrokerError::communication("socket reset"));

        let err = handle.complete().await.expect_err("scripted failure");
        assert!(matches!(err, BrokerError::Communication { .. }));
        assert_eq!(handle.state(), LeaseState::Held);

        handle.complete().await.expect("second attempt succeeds");
        assert_eq!(handle.state(), LeaseState::Completed);
        assert_eq!(handle.complete_calls(), 2);
    }
}
