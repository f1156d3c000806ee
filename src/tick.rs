//! Tick sources that drive a countdown.
//!
//! A [`TickSource`] is the one asynchronous input of a countdown: something
//! that, once scheduled, delivers a tick every `interval` until cancelled.
//! The controller never waits on a source. It asks for a handle with
//! [`TickSource::schedule`], accepts ticks that carry its current handle, and
//! calls [`TickSource::cancel`] whenever it stops running.
//!
//! Two sources are provided:
//!
//! - [`ManualTicks`]: a deterministic fake. Nothing fires on its own; tests
//!   read the armed handle and deliver ticks by hand.
//! - [`CmdTicks`]: the bubbletea-rs source. Each armed handle turns into a
//!   one-shot `tick` command that is re-armed after every delivered
//!   [`TickMsg`], giving a fixed-period ticker.
//!
//! ```rust
//! use countdown_widget::tick::{ManualTicks, TickSource};
//! use std::time::Duration;
//!
//! let mut ticks = ManualTicks::new();
//! let handle = ticks.schedule(Duration::from_secs(1));
//! assert_eq!(ticks.armed(), Some(handle));
//!
//! ticks.cancel(handle);
//! assert_eq!(ticks.armed(), None);
//! ```

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use std::fmt;
use std::time::Duration;

/// Identifies one scheduled run of a tick source.
///
/// Handles are never reused by a source, so a tick carrying an old handle
/// can always be told apart from a tick of the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    /// Wraps a raw handle value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TickHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cancellable periodic tick source.
pub trait TickSource {
    /// Starts delivering ticks every `interval` and returns the handle
    /// those ticks will carry.
    fn schedule(&mut self, interval: Duration) -> TickHandle;

    /// Stops the run identified by `handle`. Cancelling an unknown or
    /// already cancelled handle does nothing.
    fn cancel(&mut self, handle: TickHandle);
}

/// Message delivered on every tick of a [`CmdTicks`] source.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// Identifier of the widget whose source produced this tick.
    pub id: i64,
    /// The run this tick belongs to.
    pub handle: TickHandle,
}

/// A tick source driven entirely by the caller.
///
/// Keeps a record of every schedule and cancel call so tests can assert
/// that no run is left armed.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    last: u64,
    armed: Option<(TickHandle, Duration)>,
    scheduled: usize,
    cancelled: Vec<TickHandle>,
}

impl ManualTicks {
    /// Creates a source with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle of the currently armed run, if any.
    pub fn armed(&self) -> Option<TickHandle> {
        self.armed.map(|(h, _)| h)
    }

    /// The interval of the currently armed run, if any.
    pub fn interval(&self) -> Option<Duration> {
        self.armed.map(|(_, i)| i)
    }

    /// How many runs have been scheduled so far.
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Every handle that has been cancelled, in order.
    pub fn cancelled(&self) -> &[TickHandle] {
        &self.cancelled
    }
}

impl TickSource for ManualTicks {
    fn schedule(&mut self, interval: Duration) -> TickHandle {
        self.last += 1;
        let handle = TickHandle(self.last);
        self.armed = Some((handle, interval));
        self.scheduled += 1;
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.armed() == Some(handle) {
            self.armed = None;
            self.cancelled.push(handle);
        }
    }
}

/// A tick source backed by bubbletea-rs `tick` commands.
///
/// bubbletea ticks fire once, so the owner asks for [`CmdTicks::next_cmd`]
/// after scheduling and again after each accepted [`TickMsg`]. Once the run
/// is cancelled `next_cmd` yields nothing and the chain ends; a command
/// already in flight still delivers its message, which the owner drops
/// because the handle is no longer armed.
#[derive(Debug, Clone)]
pub struct CmdTicks {
    id: i64,
    last: u64,
    armed: Option<(TickHandle, Duration)>,
}

impl CmdTicks {
    /// Creates a source whose messages carry the widget identifier `id`.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            last: 0,
            armed: None,
        }
    }

    /// The widget identifier stamped on every [`TickMsg`].
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The handle of the currently armed run, if any.
    pub fn armed(&self) -> Option<TickHandle> {
        self.armed.map(|(h, _)| h)
    }

    /// Whether `msg` belongs to the armed run of this source.
    pub fn accepts(&self, msg: &TickMsg) -> bool {
        msg.id == self.id && self.armed() == Some(msg.handle)
    }

    /// The command that delivers the next tick of the armed run.
    pub fn next_cmd(&self) -> Option<Cmd> {
        let (handle, interval) = self.armed?;
        let id = self.id;
        Some(bubbletea_tick(interval, move |_| {
            Box::new(TickMsg { id, handle }) as Msg
        }))
    }
}

impl TickSource for CmdTicks {
    fn schedule(&mut self, interval: Duration) -> TickHandle {
        self.last += 1;
        let handle = TickHandle(self.last);
        self.armed = Some((handle, interval));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if self.armed() == Some(handle) {
            self.armed = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_handles_are_unique() {
        let mut ticks = ManualTicks::new();
        let a = ticks.schedule(Duration::from_secs(1));
        ticks.cancel(a);
        let b = ticks.schedule(Duration::from_secs(1));

        assert_ne!(a, b);
        assert_eq!(ticks.armed(), Some(b));
        assert_eq!(ticks.scheduled(), 2);
        assert_eq!(ticks.cancelled(), &[a]);
    }

    #[test]
    fn test_manual_cancel_of_stale_handle_is_ignored() {
        let mut ticks = ManualTicks::new();
        let a = ticks.schedule(Duration::from_secs(1));
        ticks.cancel(a);
        let b = ticks.schedule(Duration::from_secs(2));

        ticks.cancel(a);
        assert_eq!(ticks.armed(), Some(b));
        assert_eq!(ticks.interval(), Some(Duration::from_secs(2)));
        assert_eq!(ticks.cancelled().len(), 1);
    }

    #[test]
    fn test_cmd_ticks_only_accept_armed_run() {
        let mut ticks = CmdTicks::new(7);
        let first = ticks.schedule(Duration::from_millis(10));

        assert!(ticks.accepts(&TickMsg { id: 7, handle: first }));
        assert!(!ticks.accepts(&TickMsg { id: 8, handle: first }));

        ticks.cancel(first);
        assert!(!ticks.accepts(&TickMsg { id: 7, handle: first }));
        assert!(ticks.next_cmd().is_none());

        let second = ticks.schedule(Duration::from_millis(10));
        assert!(!ticks.accepts(&TickMsg { id: 7, handle: first }));
        assert!(ticks.accepts(&TickMsg { id: 7, handle: second }));
        assert!(ticks.next_cmd().is_some());
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(TickHandle::new(3).to_string(), "#3");
        assert_eq!(TickHandle::new(3).get(), 3);
    }

    #[tokio::test]
    async fn test_cmd_ticks_deliver_tick_msg() {
        let mut ticks = CmdTicks::new(42);
        let handle = ticks.schedule(Duration::from_millis(5));
        let cmd = ticks.next_cmd().unwrap();

        let msg = cmd.await.unwrap();
        let tick = msg.downcast_ref::<TickMsg>().unwrap();
        assert_eq!(tick.id, 42);
        assert_eq!(tick.handle, handle);
    }
}
