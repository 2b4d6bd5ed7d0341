//! # Ingestors Module
//!
//! Inbound real-time data. The documents client has one source: the live
//! notification feed, a receive-only WebSocket carrying JSON frames.
//!
//! ## Contained Modules:
//! - **`live_feed`**: `LiveFeedListener`, generic over the decoded payload,
//!   with a `notifications` constructor that feeds the notification queue.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The WebSocket listener for the live notification feed.
pub mod live_feed;

pub use crate::configs::ReconnectPolicy;
pub use live_feed::{FeedError, ListenerHandle, LiveFeedListener};
