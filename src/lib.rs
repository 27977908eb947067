#![allow(clippy::doc_markdown)] // Allow technical terms like TTL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Lease Core
//!
//! Lock-lifecycle core for competing-consumer clients of lease-based message
//! brokers.
//!
//! ## Overview
//!
//! A lease-based broker grants each consumer an exclusive, time-bounded lock
//! on a delivered message instead of deleting it on delivery. This crate
//! implements the decision layer such a client calls into: it proves, at any
//! point during processing, that the consumer still legitimately owns the
//! message, and it translates the outcome of processing — success, transient
//! lock loss, or application failure — into the correct broker operation
//! (complete, abandon, or no action at all).
//!
//! ## Key Features
//!
//! - **Lease Validation**: Pure, repeatable ownership checks against the
//!   current lease boundary and the message's own TTL window
//! - **Fault Classification**: Closed error taxonomy mapped exhaustively onto
//!   broker-facing actions; lock-loss conditions never trigger noisy retries
//! - **Single Terminal Action**: Complete/abandon consume the lifecycle by
//!   value, so duplicate terminal operations are unrepresentable
//! - **Narrow Broker Seam**: One async trait ([`lock::MessageLockHandle`])
//!   is the only contact surface with the broker client
//!
//! ## Module Organization
//!
//! - [`message`] - Message identity and lease metadata
//! - [`errors`] - Structured error handling and fault classification
//! - [`lock`] - Lock handle trait and the in-memory implementation
//! - [`lifecycle`] - The lock lifecycle orchestrator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use chrono::Utc;
//! use lease_core::{LeasedMessage, LockLifecycle, LockLifecycleError};
//! use lease_core::lock::InMemoryLockHandle;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let message = LeasedMessage::new("order-17", Utc::now(), Duration::from_secs(300));
//! let handle = InMemoryLockHandle::new(Duration::from_secs(30));
//! let lifecycle = LockLifecycle::new(message, handle);
//!
//! // Prove the lease is still ours before doing any work
//! lifecycle.validate_lock_status()?;
//!
//! match process_order().await {
//!     Ok(()) => lifecycle.complete().await?,
//!     Err(error) => {
//!         // Never fails; abandons or silently skips based on the error kind
//!         lifecycle.faulted(LockLifecycleError::Application(error)).await;
//!     }
//! }
//! # Ok(())
//! # }
//! # async fn process_order() -> Result<(), anyhow::Error> { Ok(()) }
//! ```
//!
//! ## Integration
//!
//! Network transport, connection management, deserialization, dispatch, and
//! lease-renewal scheduling belong to the surrounding broker client; this
//! crate consumes them through [`lock::MessageLockHandle`] and nothing else.

pub mod errors;
pub mod lifecycle;
pub mod lock;
pub mod message;

pub use errors::{BrokerError, FaultDisposition, LockLifecycleError, LockLifecycleResult};
pub use lifecycle::LockLifecycle;
pub use lock::{InMemoryLockHandle, MessageLockHandle};
pub use message::{LeasedMessage, MessageId, TimeToLive};
