//! The countdown state machine.
//!
//! A [`Controller`] owns the remaining time, the running flag and the handle
//! of its tick source. It has three phases:
//!
//! - [`Phase::Idle`]: not counting. Either never started, reset, or paused.
//! - [`Phase::Running`]: a tick source is armed and every accepted tick
//!   removes one interval from the remaining time.
//! - [`Phase::Finished`]: the remaining time ran out. The done message is
//!   shown until the next reset or start.
//!
//! Every operation returns `Option<Event>`. `None` means the call changed
//! nothing; `Some` is the notification a presentation layer reacts to.
//!
//! ```rust
//! use countdown_widget::config::Config;
//! use countdown_widget::controller::{Controller, Event, Phase};
//! use countdown_widget::tick::ManualTicks;
//! use std::time::Duration;
//!
//! let mut countdown = Controller::new(Config::default(), ManualTicks::new());
//! assert_eq!(countdown.display_text(), "00:30");
//!
//! countdown.start();
//! let handle = countdown.active_handle().unwrap();
//! countdown.tick(handle);
//! assert_eq!(countdown.remaining(), Duration::from_secs(29));
//! assert_eq!(countdown.display_text(), "00:29");
//!
//! for _ in 0..29 {
//!     countdown.tick(handle);
//! }
//! assert_eq!(countdown.phase(), Phase::Finished);
//! assert_eq!(countdown.display_text(), "Done!");
//! ```
//!
//! # Remaining time sentinel
//!
//! A remaining time of zero outside [`Phase::Running`] means "use the full
//! duration on the next start". The phase tells a fresh or reset countdown
//! apart from a finished one.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::tick::{TickHandle, TickSource};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the countdown is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Not counting: fresh, reset, or paused.
    #[default]
    Idle,
    /// Counting down; a tick source is armed.
    Running,
    /// Ran out of time; showing the done message.
    Finished,
}

/// A state change worth re-rendering for.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The countdown began or resumed counting.
    Started {
        /// Time left when counting began.
        remaining: Duration,
        /// `true` when continuing from a pause rather than from the top.
        resumed: bool,
    },
    /// One interval elapsed.
    Ticked {
        /// Time left after the tick.
        remaining: Duration,
    },
    /// Counting paused; the remaining time is kept.
    Stopped {
        /// Time left at the pause.
        remaining: Duration,
    },
    /// The countdown ran out. Emitted once per run.
    Finished,
    /// The countdown returned to its initial state.
    Reset,
    /// State was loaded from a [`Snapshot`].
    Restored {
        /// Time left after restoring.
        remaining: Duration,
        /// Whether counting resumed.
        running: bool,
    },
}

/// Value-level copy of the countdown state, for carrying it across a
/// suspend and resume of the hosting view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Remaining milliseconds; zero means the full duration.
    pub remaining_ms: u64,
    /// Whether the countdown was counting.
    pub running: bool,
}

/// Countdown state machine driving a [`TickSource`].
#[derive(Debug)]
pub struct Controller<S: TickSource> {
    config: Config,
    source: S,
    active: Option<TickHandle>,
    remaining: Duration,
    phase: Phase,
    text: String,
}

impl<S: TickSource> Controller<S> {
    /// Creates an idle countdown showing the full duration.
    pub fn new(config: Config, source: S) -> Self {
        let text = config.initial_text();
        Self {
            config,
            source,
            active: None,
            remaining: Duration::ZERO,
            phase: Phase::Idle,
            text,
        }
    }

    /// Starts or resumes counting.
    ///
    /// Does nothing while already running. After a pause the countdown
    /// continues from the paused time; otherwise it starts from the full
    /// duration.
    pub fn start(&mut self) -> Option<Event> {
        if self.phase == Phase::Running {
            return None;
        }

        let resumed = self.phase == Phase::Idle && !self.remaining.is_zero();
        if !resumed {
            self.remaining = self.config.total();
        }

        let handle = self.source.schedule(self.config.interval());
        self.active = Some(handle);
        self.phase = Phase::Running;
        self.text = self.config.format(self.remaining);

        debug!(
            "countdown started with {:?} left (resumed: {}, ticks {})",
            self.remaining, resumed, handle
        );
        Some(Event::Started {
            remaining: self.remaining,
            resumed,
        })
    }

    /// Pauses counting, keeping the remaining time. Does nothing unless running.
    pub fn stop(&mut self) -> Option<Event> {
        if self.phase != Phase::Running {
            return None;
        }

        self.cancel_active();
        self.phase = Phase::Idle;

        debug!("countdown stopped with {:?} left", self.remaining);
        Some(Event::Stopped {
            remaining: self.remaining,
        })
    }

    /// Returns to the initial state from any phase.
    pub fn reset(&mut self) -> Option<Event> {
        self.cancel_active();
        self.remaining = Duration::ZERO;
        self.phase = Phase::Idle;
        self.text = self.config.initial_text();

        debug!("countdown reset");
        Some(Event::Reset)
    }

    /// Handles one tick of the run identified by `handle`.
    ///
    /// Ticks are only accepted while running and only for the armed run.
    /// The tick that would bring the remaining time to zero finishes the
    /// countdown instead.
    pub fn tick(&mut self, handle: TickHandle) -> Option<Event> {
        if self.phase != Phase::Running || self.active != Some(handle) {
            trace!("dropping stale tick {}", handle);
            return None;
        }

        match self.remaining.checked_sub(self.config.interval()) {
            Some(left) if !left.is_zero() => {
                self.remaining = left;
                self.text = self.config.format(left);
                trace!("tick {}: {:?} left", handle, left);
                Some(Event::Ticked { remaining: left })
            }
            _ => Some(self.finish()),
        }
    }

    /// Cancels any armed tick source, as when the hosting view goes away.
    ///
    /// A running countdown is left paused at its current time. Ticks that
    /// arrive afterwards are ignored.
    pub fn teardown(&mut self) {
        if self.active.is_some() {
            debug!("countdown torn down with {:?} left", self.remaining);
        }
        self.cancel_active();
        if self.phase == Phase::Running {
            self.phase = Phase::Idle;
        }
    }

    /// Captures the remaining time and running flag.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            remaining_ms: self.remaining_ms(),
            running: self.running(),
        }
    }

    /// Loads state from a snapshot, resuming the tick source if it was running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SnapshotOutOfRange`] if the snapshot holds more time
    /// than this countdown's total duration. The current state is kept.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<Event> {
        let total_ms = self.config.total().as_millis() as u64;
        if snapshot.remaining_ms > total_ms {
            warn!(
                "rejecting snapshot with {}ms left for a {}ms countdown",
                snapshot.remaining_ms, total_ms
            );
            return Err(Error::SnapshotOutOfRange {
                remaining_ms: snapshot.remaining_ms,
                total_ms,
            });
        }

        self.cancel_active();
        self.phase = Phase::Idle;
        self.remaining = Duration::from_millis(snapshot.remaining_ms);
        self.text = self.config.format(self.shown_remaining());

        if snapshot.running {
            self.start();
        }

        debug!(
            "countdown restored with {:?} left (running: {})",
            self.remaining, snapshot.running
        );
        Ok(Event::Restored {
            remaining: self.remaining,
            running: self.running(),
        })
    }

    fn finish(&mut self) -> Event {
        self.cancel_active();
        self.remaining = Duration::ZERO;
        self.phase = Phase::Finished;
        self.text = self.config.done_text().to_string();

        debug!("countdown finished");
        Event::Finished
    }

    fn cancel_active(&mut self) {
        if let Some(handle) = self.active.take() {
            self.source.cancel(handle);
        }
    }

    fn shown_remaining(&self) -> Duration {
        if self.phase == Phase::Idle && self.remaining.is_zero() {
            self.config.total()
        } else {
            self.remaining
        }
    }

    /// The configuration this countdown runs with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The tick source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The handle of the armed tick run, if running.
    pub fn active_handle(&self) -> Option<TickHandle> {
        self.active
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the countdown is counting.
    pub fn running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Remaining time. Zero when idle means the full duration.
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Remaining time in whole milliseconds.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining.as_millis() as u64
    }

    /// The text to display: formatted remaining time or the done message.
    pub fn display_text(&self) -> &str {
        &self.text
    }

    /// Fraction of the total duration remaining while running, `0.0` otherwise.
    pub fn progress(&self) -> f64 {
        if self.phase != Phase::Running {
            return 0.0;
        }
        self.remaining.as_secs_f64() / self.config.total().as_secs_f64()
    }
}

impl<S: TickSource> Drop for Controller<S> {
    fn drop(&mut self) {
        self.cancel_active();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{with_duration, with_interval};
    use crate::tick::ManualTicks;

    fn controller() -> Controller<ManualTicks> {
        Controller::new(Config::default(), ManualTicks::new())
    }

    fn tick_n(c: &mut Controller<ManualTicks>, n: usize) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..n {
            if let Some(handle) = c.active_handle() {
                events.extend(c.tick(handle));
            }
        }
        events
    }

    #[test]
    fn test_new_is_idle_with_sentinel() {
        let c = controller();
        assert_eq!(c.phase(), Phase::Idle);
        assert!(!c.running());
        assert_eq!(c.remaining_ms(), 0);
        assert_eq!(c.display_text(), "00:30");
        assert_eq!(c.progress(), 0.0);
        assert!(c.active_handle().is_none());
    }

    #[test]
    fn test_start_uses_full_duration() {
        let mut c = controller();
        let event = c.start();

        assert_eq!(
            event,
            Some(Event::Started {
                remaining: Duration::from_secs(30),
                resumed: false
            })
        );
        assert!(c.running());
        assert_eq!(c.progress(), 1.0);
        assert_eq!(c.source().interval(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let mut c = controller();
        c.start();
        let handle = c.active_handle();

        assert_eq!(c.start(), None);
        assert_eq!(c.active_handle(), handle);
        assert_eq!(c.source().scheduled(), 1);
    }

    #[test]
    fn test_single_tick() {
        let mut c = controller();
        c.start();
        let events = tick_n(&mut c, 1);

        assert_eq!(
            events,
            vec![Event::Ticked {
                remaining: Duration::from_secs(29)
            }]
        );
        assert_eq!(c.remaining_ms(), 29_000);
        assert_eq!(c.display_text(), "00:29");
        assert!((c.progress() - 29.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_run_finishes_once() {
        let mut c = controller();
        c.start();
        let events = tick_n(&mut c, 30);

        let finished = events.iter().filter(|e| **e == Event::Finished).count();
        assert_eq!(finished, 1);
        assert_eq!(events.last(), Some(&Event::Finished));
        assert_eq!(c.phase(), Phase::Finished);
        assert_eq!(c.remaining_ms(), 0);
        assert!(!c.running());
        assert_eq!(c.display_text(), "Done!");
        assert_eq!(c.progress(), 0.0);
        assert!(c.source().armed().is_none());
    }

    #[test]
    fn test_stop_then_start_resumes() {
        let mut c = controller();
        c.start();
        tick_n(&mut c, 12);

        assert_eq!(
            c.stop(),
            Some(Event::Stopped {
                remaining: Duration::from_secs(18)
            })
        );
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.display_text(), "00:18");
        assert_eq!(c.progress(), 0.0);

        assert_eq!(
            c.start(),
            Some(Event::Started {
                remaining: Duration::from_secs(18),
                resumed: true
            })
        );
        tick_n(&mut c, 1);
        assert_eq!(c.remaining_ms(), 17_000);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut c = controller();
        assert_eq!(c.stop(), None);

        c.start();
        assert!(c.stop().is_some());
        assert_eq!(c.stop(), None);
        assert_eq!(c.source().cancelled().len(), 1);
    }

    #[test]
    fn test_reset_from_every_phase() {
        let mut c = controller();
        assert_eq!(c.reset(), Some(Event::Reset));
        assert_eq!(c.display_text(), "00:30");

        c.start();
        tick_n(&mut c, 5);
        c.reset();
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.remaining_ms(), 0);
        assert_eq!(c.display_text(), "00:30");
        assert!(c.source().armed().is_none());

        c.start();
        tick_n(&mut c, 30);
        assert_eq!(c.phase(), Phase::Finished);
        c.reset();
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.display_text(), "00:30");

        c.reset();
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.remaining_ms(), 0);
    }

    #[test]
    fn test_reset_then_start_uses_full_duration() {
        let mut c = controller();
        c.start();
        tick_n(&mut c, 10);
        c.stop();
        c.reset();
        c.start();
        assert_eq!(c.remaining(), Duration::from_secs(30));
    }

    #[test]
    fn test_start_after_finish_restarts() {
        let mut c = controller();
        c.start();
        tick_n(&mut c, 30);

        assert_eq!(
            c.start(),
            Some(Event::Started {
                remaining: Duration::from_secs(30),
                resumed: false
            })
        );
        assert_eq!(c.display_text(), "00:30");
    }

    #[test]
    fn test_late_ticks_are_ignored() {
        let mut c = controller();
        c.start();
        let first = c.active_handle().unwrap();
        tick_n(&mut c, 3);

        c.stop();
        assert_eq!(c.tick(first), None);
        assert_eq!(c.remaining_ms(), 27_000);

        c.start();
        let second = c.active_handle().unwrap();
        assert_ne!(first, second);
        assert_eq!(c.tick(first), None);
        assert_eq!(c.remaining_ms(), 27_000);

        c.reset();
        assert_eq!(c.tick(second), None);
        assert_eq!(c.remaining_ms(), 0);
    }

    #[test]
    fn test_tick_after_finish_is_ignored() {
        let mut c = controller();
        c.start();
        let handle = c.active_handle().unwrap();
        tick_n(&mut c, 30);

        assert_eq!(c.tick(handle), None);
        assert_eq!(c.phase(), Phase::Finished);
        assert_eq!(c.display_text(), "Done!");
    }

    #[test]
    fn test_teardown_cancels_and_blocks_ticks() {
        let mut c = controller();
        c.start();
        let handle = c.active_handle().unwrap();
        tick_n(&mut c, 2);

        c.teardown();
        assert!(c.source().armed().is_none());
        assert!(!c.running());
        assert_eq!(c.tick(handle), None);
        assert_eq!(c.remaining_ms(), 28_000);
    }

    #[test]
    fn test_uneven_interval_clamps_at_zero() {
        let config = Config::new(&[
            with_duration(Duration::from_millis(2_500)),
            with_interval(Duration::from_secs(1)),
        ])
        .unwrap();
        let mut c = Controller::new(config, ManualTicks::new());
        c.start();

        let events = tick_n(&mut c, 3);
        assert_eq!(
            events,
            vec![
                Event::Ticked {
                    remaining: Duration::from_millis(1_500)
                },
                Event::Ticked {
                    remaining: Duration::from_millis(500)
                },
                Event::Finished,
            ]
        );
        assert_eq!(c.remaining_ms(), 0);
    }

    #[test]
    fn test_display_truncates_to_whole_seconds() {
        let config = Config::new(&[with_interval(Duration::from_millis(400))]).unwrap();
        let mut c = Controller::new(config, ManualTicks::new());
        c.start();

        tick_n(&mut c, 1);
        assert_eq!(c.remaining_ms(), 29_600);
        assert_eq!(c.display_text(), "00:29");
    }

    #[test]
    fn test_snapshot_restore_resumes() {
        let mut c = controller();
        c.start();
        tick_n(&mut c, 7);
        let snapshot = c.snapshot();
        assert_eq!(
            snapshot,
            Snapshot {
                remaining_ms: 23_000,
                running: true
            }
        );
        drop(c);

        let mut restored = controller();
        let event = restored.restore(snapshot).unwrap();
        assert_eq!(
            event,
            Event::Restored {
                remaining: Duration::from_secs(23),
                running: true
            }
        );
        assert!(restored.running());
        assert_eq!(restored.display_text(), "00:23");

        tick_n(&mut restored, 1);
        assert_eq!(restored.remaining_ms(), 22_000);
    }

    #[test]
    fn test_restore_paused_snapshot() {
        let mut c = controller();
        c.restore(Snapshot {
            remaining_ms: 12_345,
            running: false,
        })
        .unwrap();

        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.display_text(), "00:12");
        assert!(c.active_handle().is_none());

        c.start();
        assert_eq!(c.remaining_ms(), 12_345);
    }

    #[test]
    fn test_restore_empty_snapshot_shows_full_duration() {
        let mut c = controller();
        c.start();
        c.restore(Snapshot::default()).unwrap();

        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.display_text(), "00:30");
        assert!(c.source().armed().is_none());
    }

    #[test]
    fn test_restore_rejects_out_of_range() {
        let mut c = controller();
        c.start();
        tick_n(&mut c, 1);

        let err = c
            .restore(Snapshot {
                remaining_ms: 31_000,
                running: true,
            })
            .unwrap_err();
        assert_eq!(
            err,
            Error::SnapshotOutOfRange {
                remaining_ms: 31_000,
                total_ms: 30_000
            }
        );
        assert!(c.running());
        assert_eq!(c.remaining_ms(), 29_000);
    }

    #[test]
    fn test_remaining_stays_in_bounds() {
        let mut c = controller();
        let total = c.config().total();
        let ops: [fn(&mut Controller<ManualTicks>); 4] = [
            |c| {
                c.start();
            },
            |c| {
                c.stop();
            },
            |c| {
                c.reset();
            },
            |c| {
                if let Some(h) = c.active_handle() {
                    c.tick(h);
                }
            },
        ];

        // Deterministic walk over the operations with a skewed mix of ticks.
        let mut state: u32 = 17;
        for _ in 0..2_000 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let pick = (state >> 16) % 10;
            let op = match pick {
                0 => 0,
                1 => 1,
                2 => 2,
                _ => 3,
            };
            ops[op](&mut c);

            assert!(c.remaining() <= total);
            assert!((0.0..=1.0).contains(&c.progress()));
            assert_eq!(c.running(), c.active_handle().is_some());
            assert_eq!(c.running(), c.source().armed().is_some());
        }
    }
}
