//! # Clocks
//!
//! Document creation stamps `CreatedAt`/`UpdatedAt` from a `Clock` rather than
//! calling `Utc::now()` directly, so tests can pin the instant.

use chrono::{DateTime, SecondsFormat, Utc};

/// A source of "now" for timestamping.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Formats an instant the way the API does: RFC 3339, UTC, millisecond precision
/// (`2024-01-01T10:00:00.000Z`).
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
