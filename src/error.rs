//! Error types for countdown construction and state restoration.
//!
//! Running a countdown never fails: start, stop, tick and reset are total
//! operations that either change state or do nothing. The only fallible
//! steps are building a [`Config`](crate::config::Config) from options and
//! restoring a [`Snapshot`](crate::controller::Snapshot) taken elsewhere.

use std::time::Duration;
use thiserror::Error;

/// Errors raised when a countdown configuration or snapshot is invalid.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// The total countdown duration was zero.
    #[error("countdown duration must be greater than zero")]
    ZeroDuration,

    /// The tick interval was zero.
    #[error("tick interval must be greater than zero")]
    ZeroInterval,

    /// The tick interval was longer than the whole countdown.
    #[error("tick interval {interval:?} exceeds countdown duration {total:?}")]
    IntervalExceedsDuration {
        /// Configured tick interval.
        interval: Duration,
        /// Configured total duration.
        total: Duration,
    },

    /// The animation settle margin was outside `0.0..=1.0` or not a number.
    #[error("settle margin must be a fraction between 0 and 1 (got {0})")]
    InvalidMargin(f64),

    /// A snapshot carried more remaining time than the countdown allows.
    #[error("snapshot remaining time {remaining_ms}ms exceeds total {total_ms}ms")]
    SnapshotOutOfRange {
        /// Remaining milliseconds stored in the snapshot.
        remaining_ms: u64,
        /// Total milliseconds of the receiving countdown.
        total_ms: u64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
