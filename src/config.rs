//! Countdown configuration built from functional options.
//!
//! Options follow the same pattern as the progress bar: each `with_*`
//! function returns a [`CountdownOption`] and [`Config::new`] applies them in
//! order over the defaults, then validates the result.
//!
//! ```rust
//! use countdown_widget::config::{with_duration, with_done_text, Config};
//! use std::time::Duration;
//!
//! let config = Config::new(&[
//!     with_duration(Duration::from_secs(90)),
//!     with_done_text("Time's up"),
//! ])
//! .unwrap();
//!
//! assert_eq!(config.total(), Duration::from_secs(90));
//! assert_eq!(config.interval(), Duration::from_secs(1));
//! assert_eq!(config.initial_text(), "01:30");
//! ```

use crate::error::{Error, Result};
use crate::format::{self, FormatFn};
use std::time::Duration;

/// Default countdown length.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);
/// Default time between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
/// Extra fraction of the remaining time given to the linear bar decay so the
/// bar does not empty before the countdown finishes.
pub const DEFAULT_SETTLE_MARGIN: f64 = 0.05;
/// Largest accepted settle margin: the bar may take at most twice the
/// remaining time to empty.
pub const MAX_SETTLE_MARGIN: f64 = 1.0;
/// Text shown once the countdown has finished.
pub const DEFAULT_DONE_TEXT: &str = "Done!";

/// Option for configuring a countdown.
#[derive(Debug, Clone)]
pub enum CountdownOption {
    /// Sets the total countdown duration.
    WithDuration(Duration),
    /// Sets the tick interval.
    WithInterval(Duration),
    /// Sets the completion message.
    WithDoneText(String),
    /// Sets the duration formatter.
    WithFormatter(FormatFn),
    /// Sets the bar decay margin.
    WithSettleMargin(f64),
}

impl CountdownOption {
    fn apply(&self, c: &mut Config) {
        match self {
            CountdownOption::WithDuration(total) => c.total = *total,
            CountdownOption::WithInterval(interval) => c.interval = *interval,
            CountdownOption::WithDoneText(text) => c.done_text = text.clone(),
            CountdownOption::WithFormatter(f) => c.formatter = *f,
            CountdownOption::WithSettleMargin(margin) => c.settle_margin = *margin,
        }
    }
}

/// Sets how long the countdown runs from a fresh start.
pub fn with_duration(total: Duration) -> CountdownOption {
    CountdownOption::WithDuration(total)
}

/// Sets the period of the tick source.
pub fn with_interval(interval: Duration) -> CountdownOption {
    CountdownOption::WithInterval(interval)
}

/// Sets the message displayed in the finished state.
pub fn with_done_text(text: impl Into<String>) -> CountdownOption {
    CountdownOption::WithDoneText(text.into())
}

/// Replaces the default `MM:SS` formatter.
pub fn with_formatter(f: FormatFn) -> CountdownOption {
    CountdownOption::WithFormatter(f)
}

/// Sets the fraction added to the bar's linear decay duration.
///
/// This is a cosmetic tuning knob; it never affects when the countdown
/// itself finishes.
pub fn with_settle_margin(margin: f64) -> CountdownOption {
    CountdownOption::WithSettleMargin(margin)
}

/// Validated countdown configuration.
#[derive(Debug, Clone)]
pub struct Config {
    total: Duration,
    interval: Duration,
    done_text: String,
    formatter: FormatFn,
    settle_margin: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total: DEFAULT_DURATION,
            interval: DEFAULT_INTERVAL,
            done_text: DEFAULT_DONE_TEXT.to_string(),
            formatter: format::elapsed,
            settle_margin: DEFAULT_SETTLE_MARGIN,
        }
    }
}

impl Config {
    /// Builds a configuration from options applied over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration or interval is zero, if the interval
    /// is longer than the duration, or if the settle margin is not within
    /// `0.0..=MAX_SETTLE_MARGIN`.
    pub fn new(opts: &[CountdownOption]) -> Result<Self> {
        let mut c = Self::default();
        for opt in opts {
            opt.apply(&mut c);
        }
        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.total.is_zero() {
            return Err(Error::ZeroDuration);
        }
        if self.interval.is_zero() {
            return Err(Error::ZeroInterval);
        }
        if self.interval > self.total {
            return Err(Error::IntervalExceedsDuration {
                interval: self.interval,
                total: self.total,
            });
        }
        if !(0.0..=MAX_SETTLE_MARGIN).contains(&self.settle_margin) {
            return Err(Error::InvalidMargin(self.settle_margin));
        }
        Ok(())
    }

    /// Total countdown duration.
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Message shown once the countdown finishes.
    pub fn done_text(&self) -> &str {
        &self.done_text
    }

    /// Fraction added to the bar's decay duration.
    pub fn settle_margin(&self) -> f64 {
        self.settle_margin
    }

    /// Formats a remaining duration for display, truncated to whole seconds.
    pub fn format(&self, remaining: Duration) -> String {
        (self.formatter)(format::whole_seconds(remaining))
    }

    /// The text shown in the idle state: the full duration, formatted.
    pub fn initial_text(&self) -> String {
        self.format(self.total)
    }

    /// Number of ticks a full countdown takes, rounded up.
    pub fn ticks_per_run(&self) -> u64 {
        let total = self.total.as_nanos();
        let interval = self.interval.as_nanos();
        total.div_ceil(interval) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::new(&[]).unwrap();
        assert_eq!(c.total(), Duration::from_secs(30));
        assert_eq!(c.interval(), Duration::from_secs(1));
        assert_eq!(c.done_text(), "Done!");
        assert_eq!(c.settle_margin(), 0.05);
        assert_eq!(c.initial_text(), "00:30");
        assert_eq!(c.ticks_per_run(), 30);
    }

    #[test]
    fn test_options_apply_in_order() {
        let c = Config::new(&[
            with_duration(Duration::from_secs(10)),
            with_duration(Duration::from_secs(20)),
            with_interval(Duration::from_millis(500)),
        ])
        .unwrap();
        assert_eq!(c.total(), Duration::from_secs(20));
        assert_eq!(c.ticks_per_run(), 40);
    }

    #[test]
    fn test_custom_formatter() {
        fn seconds_only(s: u64) -> String {
            format!("{}s", s)
        }
        let c = Config::new(&[with_formatter(seconds_only)]).unwrap();
        assert_eq!(c.initial_text(), "30s");
        assert_eq!(c.format(Duration::from_millis(1_999)), "1s");
    }

    #[test]
    fn test_rejects_zero_values() {
        assert_eq!(
            Config::new(&[with_duration(Duration::ZERO)]).unwrap_err(),
            Error::ZeroDuration
        );
        assert_eq!(
            Config::new(&[with_interval(Duration::ZERO)]).unwrap_err(),
            Error::ZeroInterval
        );
    }

    #[test]
    fn test_rejects_interval_longer_than_duration() {
        let err = Config::new(&[
            with_duration(Duration::from_secs(2)),
            with_interval(Duration::from_secs(3)),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::IntervalExceedsDuration { .. }));
    }

    #[test]
    fn test_rejects_bad_margin() {
        assert_eq!(
            Config::new(&[with_settle_margin(-0.1)]).unwrap_err(),
            Error::InvalidMargin(-0.1)
        );
        assert!(Config::new(&[with_settle_margin(f64::NAN)]).is_err());
        assert!(Config::new(&[with_settle_margin(f64::INFINITY)]).is_err());
        assert_eq!(
            Config::new(&[with_settle_margin(1e20)]).unwrap_err(),
            Error::InvalidMargin(1e20)
        );
        assert!(Config::new(&[with_settle_margin(0.0)]).is_ok());
        assert!(Config::new(&[with_settle_margin(MAX_SETTLE_MARGIN)]).is_ok());
    }

    #[test]
    fn test_uneven_interval_rounds_ticks_up() {
        let c = Config::new(&[
            with_duration(Duration::from_millis(2_500)),
            with_interval(Duration::from_secs(1)),
        ])
        .unwrap();
        assert_eq!(c.ticks_per_run(), 3);
    }
}
