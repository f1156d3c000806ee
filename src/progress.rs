//! Animated fill bar for the countdown.
//!
//! The bar never jumps to the countdown's raw progress. It moves in two
//! phases instead:
//!
//! 1. **Ease**: a critically damped spring carries the shown value from
//!    wherever it is to the target fraction.
//! 2. **Decay**: once the spring settles, the bar falls linearly to zero over
//!    the remaining countdown time plus a small margin, so it empties just
//!    after the countdown finishes rather than just before.
//!
//! Stopping or resetting eases back to zero with the spring alone.
//!
//! The animator is purely cosmetic. Nothing in the countdown reads its value.
//!
//! ```rust
//! use countdown_widget::progress::{new, with_width};
//! use std::time::Duration;
//!
//! let mut bar = new(&[with_width(20)]);
//! let _cmd = bar.animate_then_decay(1.0, Duration::from_secs(30));
//!
//! // Drive frames by hand instead of through the runtime.
//! while bar.step() {}
//! assert_eq!(bar.shown(), 0.0);
//! ```

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::config::{DEFAULT_SETTLE_MARGIN, MAX_SETTLE_MARGIN};

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

const FPS: u32 = 60;
const DEFAULT_WIDTH: i32 = 40;
const DEFAULT_FREQUENCY: f64 = 18.0;
const DEFAULT_DAMPING: f64 = 1.0;

// Equilibrium thresholds for the spring.
const SETTLE_DISTANCE: f64 = 0.001;
const SETTLE_VELOCITY: f64 = 0.01;

/// Option for configuring the bar.
#[derive(Debug, Clone)]
pub enum BarOption {
    /// Total width in cells.
    WithWidth(i32),
    /// Characters for the filled and empty parts.
    WithFillCharacters(char, char),
    /// Colour of the filled part.
    WithFillColor(String),
    /// Colour of the empty part.
    WithEmptyColor(String),
    /// Spring frequency and damping ratio for the ease phase.
    WithSpringOptions(f64, f64),
    /// Margin added to the decay duration.
    WithSettleMargin(f64),
}

impl BarOption {
    fn apply(&self, m: &mut Model) {
        match self {
            BarOption::WithWidth(width) => m.width = *width,
            BarOption::WithFillCharacters(full, empty) => {
                m.full = *full;
                m.empty = *empty;
            }
            BarOption::WithFillColor(color) => m.full_color = color.clone(),
            BarOption::WithEmptyColor(color) => m.empty_color = color.clone(),
            BarOption::WithSpringOptions(frequency, damping) => {
                m.set_spring_options(*frequency, *damping)
            }
            BarOption::WithSettleMargin(margin) => m.set_settle_margin(*margin),
        }
    }
}

/// Sets the bar width in terminal cells.
pub fn with_width(w: i32) -> BarOption {
    BarOption::WithWidth(w)
}

/// Sets the filled and empty characters.
pub fn with_fill_characters(full: char, empty: char) -> BarOption {
    BarOption::WithFillCharacters(full, empty)
}

/// Sets the colour of the filled cells.
pub fn with_fill_color(color: impl Into<String>) -> BarOption {
    BarOption::WithFillColor(color.into())
}

/// Sets the colour of the empty cells.
pub fn with_empty_color(color: impl Into<String>) -> BarOption {
    BarOption::WithEmptyColor(color.into())
}

/// Sets the spring's angular frequency and damping ratio.
pub fn with_spring_options(frequency: f64, damping: f64) -> BarOption {
    BarOption::WithSpringOptions(frequency, damping)
}

/// Sets the fraction added to the decay duration, clamped to
/// `0.0..=MAX_SETTLE_MARGIN`. `NaN` becomes zero.
pub fn with_settle_margin(margin: f64) -> BarOption {
    BarOption::WithSettleMargin(margin)
}

/// Message driving one animation frame.
#[derive(Debug, Clone)]
pub struct FrameMsg {
    id: i64,
    tag: i64,
}

impl FrameMsg {
    #[cfg(test)]
    pub(crate) fn new(id: i64, tag: i64) -> Self {
        Self { id, tag }
    }
}

#[derive(Debug, Clone)]
struct Spring {
    frequency: f64,
    damping: f64,
    fps: f64,
}

impl Spring {
    fn new(fps: f64, frequency: f64, damping: f64) -> Self {
        Self {
            frequency,
            damping,
            fps,
        }
    }

    fn update(&self, position: f64, velocity: f64, target: f64) -> (f64, f64) {
        let dt = 1.0 / self.fps;
        let spring_force = -self.frequency * self.frequency * (position - target);
        let damping_force = -2.0 * self.damping * self.frequency * velocity;
        let acceleration = spring_force + damping_force;

        let new_velocity = velocity + acceleration * dt;
        let new_position = position + new_velocity * dt;

        (new_position, new_velocity)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Motion {
    Rest,
    // `decay` is the countdown time left to spend on the linear phase once
    // the spring settles; it shrinks with every easing frame.
    Easing {
        decay: Option<Duration>,
    },
    Decaying {
        from: f64,
        elapsed: Duration,
        duration: Duration,
    },
}

/// Animated countdown bar.
#[derive(Debug, Clone)]
pub struct Model {
    id: i64,
    tag: i64,

    /// Total width in cells.
    pub width: i32,
    /// Filled cell character.
    pub full: char,
    /// Filled cell colour.
    pub full_color: String,
    /// Empty cell character.
    pub empty: char,
    /// Empty cell colour.
    pub empty_color: String,

    spring: Spring,
    settle_margin: f64,
    motion: Motion,
    shown: f64,
    target: f64,
    velocity: f64,
}

/// Creates a bar at rest at zero.
pub fn new(opts: &[BarOption]) -> Model {
    let mut m = Model {
        id: next_id(),
        tag: 0,
        width: DEFAULT_WIDTH,
        full: '█',
        full_color: "#7571F9".to_string(),
        empty: '░',
        empty_color: "#606060".to_string(),
        spring: Spring::new(FPS as f64, DEFAULT_FREQUENCY, DEFAULT_DAMPING),
        settle_margin: DEFAULT_SETTLE_MARGIN,
        motion: Motion::Rest,
        shown: 0.0,
        target: 0.0,
        velocity: 0.0,
    };

    for opt in opts {
        opt.apply(&mut m);
    }

    m
}

impl Model {
    /// Replaces the spring parameters of the ease phase.
    pub fn set_spring_options(&mut self, frequency: f64, damping: f64) {
        self.spring = Spring::new(FPS as f64, frequency, damping);
    }

    /// Sets the decay margin, clamped to `0.0..=MAX_SETTLE_MARGIN`. `NaN`
    /// becomes zero.
    pub fn set_settle_margin(&mut self, margin: f64) {
        self.settle_margin = if margin.is_nan() {
            0.0
        } else {
            margin.clamp(0.0, MAX_SETTLE_MARGIN)
        };
    }

    /// Stops any animation at once and empties the bar.
    ///
    /// Frames already in flight are dropped because their tag no longer
    /// matches.
    pub fn halt(&mut self) {
        self.tag += 1;
        self.motion = Motion::Rest;
        self.shown = 0.0;
        self.target = 0.0;
        self.velocity = 0.0;
    }

    /// Identifier carried by this bar's frame messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn tag(&self) -> i64 {
        self.tag
    }

    /// The value currently drawn, in `[0, 1]`.
    pub fn shown(&self) -> f64 {
        self.shown.clamp(0.0, 1.0)
    }

    /// The value the ease phase is heading for.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Whether a frame would still change the shown value.
    pub fn is_animating(&self) -> bool {
        self.motion != Motion::Rest
    }

    /// Whether the bar is in its linear decay phase.
    pub fn is_decaying(&self) -> bool {
        matches!(self.motion, Motion::Decaying { .. })
    }

    /// Eases to `target` and stays there.
    pub fn animate_to(&mut self, target: f64) -> Cmd {
        self.retarget(target, None)
    }

    /// Eases to `target`, then decays linearly to zero.
    ///
    /// `remaining` is the countdown time left now. The decay lasts for what
    /// is left of it once the ease settles, stretched by the settle margin.
    pub fn animate_then_decay(&mut self, target: f64, remaining: Duration) -> Cmd {
        self.retarget(target, Some(remaining))
    }

    fn retarget(&mut self, target: f64, decay: Option<Duration>) -> Cmd {
        self.target = target.clamp(0.0, 1.0);
        self.motion = Motion::Easing { decay };
        self.tag += 1;
        self.next_frame()
    }

    /// Advances the animation by one frame. Returns whether it is still moving.
    pub fn step(&mut self) -> bool {
        let frame = frame_duration();
        match self.motion.clone() {
            Motion::Rest => false,
            Motion::Easing { decay } => {
                let (position, velocity) = self.spring.update(self.shown, self.velocity, self.target);
                self.shown = position;
                self.velocity = velocity;

                let decay = decay.map(|d| d.saturating_sub(frame));
                if !self.settled() {
                    self.motion = Motion::Easing { decay };
                    return true;
                }

                self.shown = self.target;
                self.velocity = 0.0;
                match decay {
                    Some(left) => {
                        self.motion = Motion::Decaying {
                            from: self.shown,
                            elapsed: Duration::ZERO,
                            duration: stretch(left, self.settle_margin),
                        };
                        true
                    }
                    None => {
                        self.motion = Motion::Rest;
                        false
                    }
                }
            }
            Motion::Decaying {
                from,
                elapsed,
                duration,
            } => {
                let elapsed = elapsed + frame;
                if elapsed >= duration {
                    self.shown = 0.0;
                    self.target = 0.0;
                    self.motion = Motion::Rest;
                    return false;
                }
                let fraction = elapsed.as_secs_f64() / duration.as_secs_f64();
                self.shown = from * (1.0 - fraction);
                self.target = self.shown;
                self.motion = Motion::Decaying {
                    from,
                    elapsed,
                    duration,
                };
                true
            }
        }
    }

    fn settled(&self) -> bool {
        (self.shown - self.target).abs() < SETTLE_DISTANCE && self.velocity.abs() < SETTLE_VELOCITY
    }

    /// Handles frame messages, returning the next frame while animating.
    pub fn update(&mut self, msg: Msg) -> std::option::Option<Cmd> {
        if let Some(frame_msg) = msg.downcast_ref::<FrameMsg>() {
            if frame_msg.id != self.id || frame_msg.tag != self.tag {
                return std::option::Option::None;
            }
            if self.step() {
                return std::option::Option::Some(self.next_frame());
            }
        }
        std::option::Option::None
    }

    fn next_frame(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(frame_duration(), move |_| {
            Box::new(FrameMsg { id, tag }) as Msg
        })
    }

    /// Renders the bar at its current value.
    pub fn view(&self) -> String {
        self.view_as(self.shown())
    }

    /// Renders the bar at an arbitrary value.
    pub fn view_as(&self, percent: f64) -> String {
        let tw = std::cmp::max(0, self.width);
        let fw = ((tw as f64) * percent.clamp(0.0, 1.0)).round() as i32;
        let fw = fw.clamp(0, tw);

        let full = Style::new()
            .foreground(lipgloss::Color::from(self.full_color.as_str()))
            .render(&self.full.to_string());
        let empty = Style::new()
            .foreground(lipgloss::Color::from(self.empty_color.as_str()))
            .render(&self.empty.to_string());

        let mut bar = full.repeat(fw as usize);
        bar.push_str(&empty.repeat((tw - fw) as usize));
        bar
    }
}

// Saturates instead of panicking when the product overflows `Duration`.
fn stretch(d: Duration, margin: f64) -> Duration {
    Duration::try_from_secs_f64(d.as_secs_f64() * (1.0 + margin)).unwrap_or(Duration::MAX)
}

fn frame_duration() -> Duration {
    Duration::from_nanos(1_000_000_000 / FPS as u64)
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, std::option::Option<Cmd>) {
        (new(&[]), std::option::Option::None)
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
        new(&[])
    }
}
