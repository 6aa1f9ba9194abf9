use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;

/// A set of keys that trigger one action, plus the text shown for it in a help bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    pub keys: Vec<KeyEvent>,
    pub help_key: String,
    pub help_desc: String,
}

impl Binding {
    pub fn new(
        help_key: impl Into<String>,
        help_desc: impl Into<String>,
        keys: Vec<KeyEvent>,
    ) -> Self {
        Self {
            keys,
            help_key: help_key.into(),
            help_desc: help_desc.into(),
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys.iter().any(|k| key_event_matches(k, event))
    }
}

/// An ordered table of `(binding, action)` pairs. The first matching binding wins.
#[derive(Clone, Debug)]
pub struct Keymap<A> {
    entries: Vec<(Binding, A)>,
}

impl<A> Default for Keymap<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A: Copy> Keymap<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, binding: Binding, action: A) -> Self {
        self.entries.push((binding, action));
        self
    }

    pub fn action_for(&self, event: &KeyEvent) -> Option<A> {
        self.entries
            .iter()
            .find(|(binding, _)| binding.matches(event))
            .map(|(_, action)| *action)
    }

    /// Bindings in declaration order, for help bars.
    pub fn bindings(&self) -> Vec<Binding> {
        self.entries.iter().map(|(b, _)| b.clone()).collect()
    }
}

pub fn key_event_matches(pattern: &KeyEvent, event: &KeyEvent) -> bool {
    if pattern.code != event.code {
        return false;
    }
    // Terminals report shift on uppercase letters and BackTab inconsistently; the code already
    // encodes it.
    let shift_matters = !matches!(pattern.code, KeyCode::Char(_) | KeyCode::BackTab);
    modifiers_match(pattern.modifiers, event.modifiers, shift_matters)
}

fn modifiers_match(pattern: KeyModifiers, event: KeyModifiers, shift_matters: bool) -> bool {
    (!shift_matters || pattern.shift == event.shift)
        && pattern.ctrl == event.ctrl
        && pattern.alt == event.alt
}

pub fn key_char(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c))
}

pub fn key_ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c)).with_modifiers(KeyModifiers::ctrl())
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code)
}
