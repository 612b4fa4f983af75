//! Batch clock
//!
//! The upsert engine samples the clock exactly once per invocation; every row
//! transition written by that batch shares the one timestamp, so validity
//! intervals line up with no clock-skew gaps.

use chrono::{DateTime, Utc};

/// Source of the single per-batch timestamp
pub trait BatchClock {
    /// Current time, UTC, millisecond precision
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to milliseconds
///
/// Truncation keeps in-memory timestamps identical to what the store persists,
/// so interval comparisons never see sub-millisecond drift.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl BatchClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(Utc::now())
    }
}

/// Clock pinned to one instant, for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            at: truncate_to_millis(at),
        }
    }
}

impl BatchClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}
