//! # Core Module
//!
//! The notification queue: an ordered, single-visible buffer of live-feed
//! notifications.
//!
//! ## Core Components:
//!
//! - **`notification_queue`**: the pure state machine. `QueueAction` values are
//!   applied by one exhaustive reducer; the state reports its named phase and
//!   whether an auto-advance is due.
//!
//! - **`queue_driver`**: the task that owns the state, applies actions in
//!   arrival order, auto-advances, and runs the display and cooldown timers.
//!   Consumers hold a `NotificationQueueHandle`.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The queue state machine and its reducer.
pub mod notification_queue;
/// The timer-driven task that owns a queue.
pub mod queue_driver;

pub use notification_queue::{reduce, NotificationQueueState, QueueAction, QueuePhase};
pub use queue_driver::{NotificationQueue, NotificationQueueHandle, QueueTimings};
