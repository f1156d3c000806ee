//! Countdown component for bubbletea-rs applications.
//!
//! [`Model`] wires a [`Controller`] to a bubbletea tick source, an animated
//! [`progress`](crate::progress) bar and a pair of key bindings. Mount it in
//! your model, forward messages to [`Model::update`] and render
//! [`Model::view`].
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use countdown_widget::countdown::{self, FinishedMsg};
//!
//! struct App {
//!     countdown: countdown::Model,
//!     done: bool,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let countdown = countdown::Model::default();
//!         (App { countdown, done: false }, None)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(finished) = msg.downcast_ref::<FinishedMsg>() {
//!             if finished.id == self.countdown.id() {
//!                 self.done = true;
//!             }
//!             return None;
//!         }
//!         self.countdown.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.countdown.view()
//!     }
//! }
//! ```
//!
//! # Controls
//!
//! | Key | Action |
//! |-----|--------|
//! | `space` / `enter` / `s` | start or stop |
//! | `r` | reset |
//!
//! The same actions are available as [`Model::start`], [`Model::stop`],
//! [`Model::toggle`] and [`Model::reset`]; each returns the commands that
//! keep ticks and animation frames flowing.

use crate::config::{Config, CountdownOption};
use crate::controller::{Controller, Event, Phase, Snapshot};
use crate::error::Result;
use crate::key::{self, KeyMap as _};
use crate::progress::{self, FrameMsg};
use crate::tick::{CmdTicks, TickMsg};
use bubbletea_rs::{batch, tick as bubbletea_tick, Cmd, KeyMsg, Model as BubbleTeaModel, Msg};
use crossterm::event::KeyCode;
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Sent once when a countdown runs out.
#[derive(Debug, Clone)]
pub struct FinishedMsg {
    /// Identifier of the countdown that finished.
    pub id: i64,
}

/// Key bindings for the countdown.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Starts a stopped countdown or stops a running one.
    pub toggle: key::Binding,
    /// Resets to the full duration.
    pub reset: key::Binding,
}

impl key::KeyMap for KeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.toggle, &self.reset]
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        default_key_map()
    }
}

/// The default bindings: space, enter or `s` toggles; `r` resets.
pub fn default_key_map() -> KeyMap {
    KeyMap {
        toggle: key::Binding::new(vec![KeyCode::Char(' '), KeyCode::Enter, KeyCode::Char('s')])
            .with_help("space", "start"),
        reset: key::Binding::new(vec![KeyCode::Char('r')]).with_help("r", "reset"),
    }
}

/// Styles used by [`Model::view`].
#[derive(Debug, Clone)]
pub struct Styles {
    /// The remaining time.
    pub time: Style,
    /// The done message.
    pub done: Style,
    /// Key labels in the help line.
    pub help_key: Style,
    /// Action descriptions in the help line.
    pub help_desc: Style,
    /// Separator between help entries.
    pub help_separator: Style,
}

impl Default for Styles {
    fn default() -> Self {
        use lipgloss::AdaptiveColor;

        let key_style = Style::new().foreground(AdaptiveColor {
            Light: "#909090",
            Dark: "#626262",
        });
        let desc_style = Style::new().foreground(AdaptiveColor {
            Light: "#B2B2B2",
            Dark: "#4A4A4A",
        });
        let sep_style = Style::new().foreground(AdaptiveColor {
            Light: "#DDDADA",
            Dark: "#3C3C3C",
        });

        Self {
            time: Style::new().bold(true),
            done: Style::new().bold(true).foreground(lipgloss::Color::from("#EE6FF8")),
            help_key: key_style,
            help_desc: desc_style,
            help_separator: sep_style,
        }
    }
}

/// Countdown component.
#[derive(Debug)]
pub struct Model {
    id: i64,
    controller: Controller<CmdTicks>,
    bar: progress::Model,
    /// Key bindings.
    pub keys: KeyMap,
    /// View styles.
    pub styles: Styles,
    /// Whether [`Model::view`] includes the help line.
    pub show_help: bool,
}

/// Creates a countdown from options.
///
/// # Errors
///
/// Fails if the options do not form a valid [`Config`].
pub fn new(opts: &[CountdownOption]) -> Result<Model> {
    Ok(Model::with_config(Config::new(opts)?))
}

impl Model {
    /// Creates a countdown from an already validated configuration.
    pub fn with_config(config: Config) -> Self {
        let id = next_id();
        let bar = progress::new(&[progress::with_settle_margin(config.settle_margin())]);
        Self {
            id,
            controller: Controller::new(config, CmdTicks::new(id)),
            bar,
            keys: default_key_map(),
            styles: Styles::default(),
            show_help: true,
        }
    }

    /// Replaces the bar, e.g. to change its width or colours. The bar takes
    /// over this countdown's settle margin.
    pub fn with_bar(mut self, mut bar: progress::Model) -> Self {
        bar.set_settle_margin(self.controller.config().settle_margin());
        self.bar = bar;
        self
    }

    /// Unique identifier of this countdown, carried by its messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The underlying state machine.
    pub fn controller(&self) -> &Controller<CmdTicks> {
        &self.controller
    }

    /// The animated bar.
    pub fn bar(&self) -> &progress::Model {
        &self.bar
    }

    /// Whether the countdown is counting.
    pub fn running(&self) -> bool {
        self.controller.running()
    }

    /// Starts or resumes the countdown.
    pub fn start(&mut self) -> Option<Cmd> {
        let event = self.controller.start()?;
        self.after(event)
    }

    /// Pauses the countdown.
    pub fn stop(&mut self) -> Option<Cmd> {
        let event = self.controller.stop()?;
        self.after(event)
    }

    /// Starts when stopped, stops when running.
    pub fn toggle(&mut self) -> Option<Cmd> {
        if self.running() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Returns to the full duration.
    pub fn reset(&mut self) -> Option<Cmd> {
        let event = self.controller.reset()?;
        self.after(event)
    }

    /// Captures the countdown state for a later [`Model::restore`].
    pub fn snapshot(&self) -> Snapshot {
        self.controller.snapshot()
    }

    /// Restores state captured by [`Model::snapshot`].
    ///
    /// # Errors
    ///
    /// Fails if the snapshot holds more time than this countdown's duration.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<Option<Cmd>> {
        let event = self.controller.restore(snapshot)?;
        Ok(self.after(event))
    }

    /// Cancels the tick source and halts the bar ahead of unmounting.
    pub fn teardown(&mut self) {
        self.controller.teardown();
        self.bar.halt();
        self.sync_keys();
    }

    fn after(&mut self, event: Event) -> Option<Cmd> {
        self.sync_keys();
        match event {
            Event::Started { remaining, .. }
            | Event::Restored {
                remaining,
                running: true,
            } => {
                let target = self.controller.progress();
                let ease = self.bar.animate_then_decay(target, remaining);
                combine(vec![self.controller.source().next_cmd(), Some(ease)])
            }
            Event::Ticked { .. } => self.controller.source().next_cmd(),
            Event::Stopped { .. } | Event::Reset | Event::Restored { running: false, .. } => {
                Some(self.bar.animate_to(0.0))
            }
            Event::Finished => {
                let id = self.id;
                let signal = bubbletea_tick(Duration::from_nanos(1), move |_| {
                    Box::new(FinishedMsg { id }) as Msg
                });
                combine(vec![Some(self.bar.animate_to(0.0)), Some(signal)])
            }
        }
    }

    fn sync_keys(&mut self) {
        let desc = if self.running() { "stop" } else { "start" };
        self.keys.toggle.set_desc(desc);
    }

    /// Handles key presses, ticks and animation frames.
    pub fn update(&mut self, msg: Msg) -> std::option::Option<Cmd> {
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keys.toggle.matches(key_msg) {
                return self.toggle();
            }
            if self.keys.reset.matches(key_msg) {
                return self.reset();
            }
            return std::option::Option::None;
        }

        if let Some(tick_msg) = msg.downcast_ref::<TickMsg>() {
            if tick_msg.id != self.id {
                return std::option::Option::None;
            }
            let event = self.controller.tick(tick_msg.handle)?;
            return self.after(event);
        }

        if msg.downcast_ref::<FrameMsg>().is_some() {
            return self.bar.update(msg);
        }

        std::option::Option::None
    }

    /// Renders the time, the bar and (optionally) the help line.
    pub fn view(&self) -> String {
        let text = self.controller.display_text();
        let style = if self.controller.phase() == Phase::Finished {
            &self.styles.done
        } else {
            &self.styles.time
        };

        let width = self.bar.width.max(0) as usize;
        let pad = width.saturating_sub(UnicodeWidthStr::width(text)) / 2;
        let mut lines = vec![
            format!("{}{}", " ".repeat(pad), style.render(text)),
            self.bar.view(),
        ];
        if self.show_help {
            lines.push(self.help_view());
        }
        lines.join("\n")
    }

    fn help_view(&self) -> String {
        let separator = self.styles.help_separator.render(" • ");
        self.keys
            .short_help()
            .into_iter()
            .filter(|b| b.enabled())
            .map(|b| {
                format!(
                    "{} {}",
                    self.styles.help_key.render(&b.help().key),
                    self.styles.help_desc.render(&b.help().desc)
                )
            })
            .collect::<Vec<_>>()
            .join(&separator)
    }
}

fn combine(cmds: Vec<Option<Cmd>>) -> Option<Cmd> {
    let mut cmds: Vec<Cmd> = cmds.into_iter().flatten().collect();
    match cmds.len() {
        0 => None,
        1 => cmds.pop(),
        _ => Some(batch(cmds)),
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, std::option::Option<Cmd>) {
        (Model::default(), std::option::Option::None)
    }

    fn update(&mut self, msg: Msg) -> std::option::Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::with_config(Config::default())
    }
}
