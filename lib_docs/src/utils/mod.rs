//! # Utilities Module
//!
//! Small helpers shared by the documents and queue modules.
//!
//! ## Contained Modules:
//!
//! - **`ids`**: pseudo-unique document identifiers.
//! - **`clock`**: the `Clock` seam used to stamp documents, with a system
//!   implementation and a fixed one for tests.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Pseudo-unique identifier generation.
pub mod ids;
/// Injectable wall clock and ISO-8601 timestamp formatting.
pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock, iso_timestamp};
pub use ids::generate_document_id;
