#![warn(missing_docs)]

//! # countdown-widget
//!
//! A countdown timer component for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! terminal applications: a fixed-duration countdown shown as `MM:SS` text,
//! an animated fill bar tracking the time left, and start / stop / reset
//! controls.
//!
//! ## Layers
//!
//! - [`controller`]: the countdown state machine (`Idle`, `Running`,
//!   `Finished`). Runtime-agnostic and driven by any [`tick::TickSource`].
//! - [`tick`]: tick sources. [`tick::ManualTicks`] for deterministic tests,
//!   [`tick::CmdTicks`] for bubbletea-rs.
//! - [`progress`]: the animated bar. It eases to the remaining fraction and
//!   then decays linearly so it empties just after the countdown does.
//! - [`countdown`]: the bubbletea component tying the above together, with
//!   key bindings and a view.
//! - [`config`], [`format`], [`error`]: options, time formatting and errors.
//!
//! ## Driving the state machine directly
//!
//! ```rust
//! use countdown_widget::prelude::*;
//! use std::time::Duration;
//!
//! let config = Config::new(&[with_duration(Duration::from_secs(3))]).unwrap();
//! let mut countdown = Controller::new(config, ManualTicks::new());
//!
//! countdown.start();
//! let handle = countdown.active_handle().unwrap();
//! assert_eq!(countdown.tick(handle), Some(Event::Ticked { remaining: Duration::from_secs(2) }));
//! countdown.tick(handle);
//! assert_eq!(countdown.tick(handle), Some(Event::Finished));
//!
//! // Ticks of a finished run are dropped.
//! assert_eq!(countdown.tick(handle), None);
//! ```
//!
//! ## As a bubbletea-rs component
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model, Msg};
//! use countdown_widget::prelude::*;
//!
//! struct App {
//!     countdown: Countdown,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut countdown = Countdown::default();
//!         let cmd = countdown.start();
//!         (Self { countdown }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.countdown.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.countdown.view()
//!     }
//! }
//! ```

pub mod config;
pub mod controller;
pub mod countdown;
pub mod error;
pub mod format;
pub mod key;
pub mod progress;
pub mod tick;

pub use config::{
    with_done_text, with_duration, with_formatter, with_interval, with_settle_margin, Config,
    CountdownOption,
};
pub use controller::{Controller, Event, Phase, Snapshot};
pub use countdown::{
    default_key_map as countdown_default_key_map, new as countdown_new, FinishedMsg,
    KeyMap as CountdownKeyMap, Model as Countdown,
};
pub use error::{Error, Result};
pub use progress::{FrameMsg, Model as ProgressBar};
pub use tick::{CmdTicks, ManualTicks, TickHandle, TickMsg, TickSource};

/// Prelude module for convenient imports.
///
/// ```rust
/// use countdown_widget::prelude::*;
///
/// let countdown = Countdown::default();
/// assert_eq!(countdown.controller().phase(), Phase::Idle);
/// ```
pub mod prelude {
    pub use crate::config::{
        with_done_text, with_duration, with_formatter, with_interval, with_settle_margin, Config,
        CountdownOption,
    };
    pub use crate::controller::{Controller, Event, Phase, Snapshot};
    pub use crate::countdown::{
        default_key_map as countdown_default_key_map, new as countdown_new, FinishedMsg,
        KeyMap as CountdownKeyMap, Model as Countdown,
    };
    pub use crate::error::Error;
    pub use crate::key::{Binding, KeyMap};
    pub use crate::progress::{FrameMsg, Model as ProgressBar};
    pub use crate::tick::{CmdTicks, ManualTicks, TickHandle, TickMsg, TickSource};
}
