//! # Message Identity and Lease Metadata
//!
//! Broker-facing metadata for a single delivered message: the opaque message
//! identifier, when the message was enqueued, and its time-to-live window.
//!
//! The lease boundary (`locked_until`) is intentionally *not* part of this
//! metadata. It is owned by the broker and read through the lock handle, so a
//! renewal performed elsewhere is observed by the next validation.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a delivered message
///
/// The format is broker-specific and treated as opaque; it is used only for
/// diagnostics and logging, never for control flow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Time-to-live window for a message
///
/// Brokers commonly encode "no expiry" as the maximum representable duration;
/// `From<Duration>` maps that sentinel to [`TimeToLive::Unbounded`] so callers
/// can pass wire-level values through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeToLive {
    /// Message never expires on its own
    Unbounded,
    /// Message expires this long after its enqueue time
    Finite(Duration),
}

impl TimeToLive {
    /// Create a finite TTL from whole seconds
    pub fn from_secs(secs: u64) -> Self {
        Self::Finite(Duration::from_secs(secs))
    }

    /// Absolute expiry for a message enqueued at the given instant
    ///
    /// Returns `None` when the message never expires: either the TTL is
    /// unbounded, or adding a finite TTL overflows the representable
    /// timestamp range (a TTL that far out is indistinguishable from
    /// "never" for any running consumer).
    pub fn expires_at(&self, enqueued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Unbounded => None,
            Self::Finite(ttl) => chrono::Duration::from_std(*ttl)
                .ok()
                .and_then(|ttl| enqueued_at.checked_add_signed(ttl)),
        }
    }

    /// Whether this TTL is the unbounded sentinel
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl From<Duration> for TimeToLive {
    fn from(ttl: Duration) -> Self {
        if ttl == Duration::MAX {
            Self::Unbounded
        } else {
            Self::Finite(ttl)
        }
    }
}

/// Metadata for one delivered message under lease
///
/// One `LeasedMessage` corresponds to one delivery attempt. The enqueue time
/// and TTL are broker-stamped at send time and immutable for the lifetime of
/// the delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeasedMessage {
    /// Opaque broker-assigned identifier (diagnostics only)
    pub message_id: MessageId,

    /// When the message was originally enqueued
    pub enqueued_at: DateTime<Utc>,

    /// Time-to-live window, measured from `enqueued_at`
    pub time_to_live: TimeToLive,

    /// Number of times this message has been delivered
    ///
    /// Increments each time the message becomes visible after a lease
    /// expires or the message is abandoned. Diagnostics only.
    pub delivery_count: u32,
}

impl LeasedMessage {
    /// Create metadata for a first delivery
    pub fn new(
        message_id: impl Into<MessageId>,
        enqueued_at: DateTime<Utc>,
        time_to_live: impl Into<TimeToLive>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            enqueued_at,
            time_to_live: time_to_live.into(),
            delivery_count: 1,
        }
    }

    /// Set the delivery count reported by the broker
    pub fn with_delivery_count(mut self, delivery_count: u32) -> Self {
        self.delivery_count = delivery_count;
        self
    }

    /// Absolute TTL expiry for this message, `None` when it never expires
    ///
    /// Recomputed from `enqueued_at + time_to_live` rather than trusting a
    /// broker-derived absolute field, which is inaccurate in edge cases when
    /// the broker calculates it instead of stamping it server-side.
    pub fn ttl_expires_at(&self) -> Option<DateTime<Utc>> {
        self.time_to_live.expires_at(self.enqueued_at)
    }
}
