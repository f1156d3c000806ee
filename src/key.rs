//! Key bindings for the countdown controls.
//!
//! ```rust
//! use countdown_widget::key::KeyMap;
//! use countdown_widget::countdown::default_key_map;
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let keys = default_key_map();
//! let press = KeyMsg { key: KeyCode::Char('r'), modifiers: KeyModifiers::NONE };
//! assert!(keys.reset.matches(&press));
//! assert_eq!(keys.short_help().len(), 2);
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// Help text for a binding: the key as shown to the user and what it does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Help {
    /// Key label, e.g. `"space"`.
    pub key: String,
    /// Action description, e.g. `"start"`.
    pub desc: String,
}

/// A set of keys that trigger one action.
#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<KeyCode>,
    help: Help,
    enabled: bool,
}

impl Binding {
    /// Creates an enabled binding for `keys` with no help text.
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self {
            keys,
            help: Help::default(),
            enabled: true,
        }
    }

    /// Attaches help text.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Replaces only the description, keeping the key label.
    pub fn set_desc(&mut self, desc: impl Into<String>) {
        self.help.desc = desc.into();
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the binding currently responds to keys.
    pub fn enabled(&self) -> bool {
        self.enabled && !self.keys.is_empty()
    }

    /// The help text.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Whether `msg` is one of this binding's keys. Disabled bindings never match.
    ///
    /// Presses held with ctrl, alt or another modifier never match, so
    /// `ctrl+r` is not `r`. Shift is allowed on character keys since it is
    /// already folded into the character.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        let plain = match msg.key {
            KeyCode::Char(_) => msg.modifiers.difference(KeyModifiers::SHIFT).is_empty(),
            _ => msg.modifiers.is_empty(),
        };
        plain && self.enabled() && self.keys.contains(&msg.key)
    }
}

/// Something that can list its key bindings for a help line.
pub trait KeyMap {
    /// Bindings to show in the one-line help.
    fn short_help(&self) -> Vec<&Binding>;
}
