//! Elapsed-time formatting for the countdown display.
//!
//! The countdown shows whole seconds only. Remaining time is truncated to
//! seconds first, then rendered with the usual elapsed-time convention:
//! `MM:SS` below one hour and `H:MM:SS` from one hour on.
//!
//! ```rust
//! use countdown_widget::format::{elapsed, whole_seconds};
//! use std::time::Duration;
//!
//! assert_eq!(elapsed(29), "00:29");
//! assert_eq!(elapsed(3_725), "1:02:05");
//! assert_eq!(whole_seconds(Duration::from_millis(29_999)), 29);
//! ```

use std::time::Duration;

/// Signature of a duration formatter.
///
/// Takes a whole number of seconds and returns the text to display. Any
/// plain `fn` with this shape can be installed with
/// [`with_formatter`](crate::config::with_formatter).
pub type FormatFn = fn(u64) -> String;

/// Formats a number of seconds as `MM:SS`, or `H:MM:SS` once an hour is reached.
///
/// Leading hour components are omitted entirely when zero; minutes and
/// seconds are always two digits.
pub fn elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Truncates a duration to whole seconds (floor).
pub fn whole_seconds(d: Duration) -> u64 {
    d.as_secs()
}
