//! Key Module - Keyboard, text edit and focus event types
//!
//! Three kinds of keyboard input reach a focused handler:
//!
//! - [`KeyEvent`] - a logical key going down or up ("Enter", "ArrowUp", "a")
//! - [`EditEvent`] - text inserted or replaced by typing, paste or an IME
//! - [`FocusEvent`] - the handler gained or lost keyboard focus
//!
//! [`TextInputState`] is the summary the platform layer reads to show or hide
//! a soft keyboard or IME composition UI.

use std::ops::Range;

use crate::types::HandlerId;

// =============================================================================
// KEY EVENTS
// =============================================================================

bitflags::bitflags! {
    /// Keyboard modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        const SUPER = 1 << 3;
    }
}

/// Key state (press, repeat, release)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// A logical key going down, repeating or coming up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Logical key name (e.g., "a", "Enter", "ArrowUp")
    pub name: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyEvent {
    /// Create a key press event
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Modifiers::empty(),
            state: KeyState::Press,
        }
    }

    /// Create a key press with modifiers
    pub fn with_modifiers(name: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            ..Self::new(name)
        }
    }

    /// Create a key release event
    pub fn release(name: impl Into<String>) -> Self {
        Self {
            state: KeyState::Release,
            ..Self::new(name)
        }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }
}

/// Text inserted into, or replacing part of, the focused handler's content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditEvent {
    /// Replaced range in chars. `None` inserts at the caret.
    pub range: Option<Range<usize>>,
    pub text: String,
}

impl EditEvent {
    /// Insert text at the caret.
    pub fn insert(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }

    /// Replace a char range with text.
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }
}

/// Delivered when a handler gains (`focus: true`) or loses keyboard focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusEvent {
    pub focus: bool,
}

// =============================================================================
// TEXT INPUT STATE
// =============================================================================

/// What the platform should do with its soft keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextInputVisibility {
    /// Leave it as it is.
    #[default]
    Keep,
    /// Show it.
    Open,
    /// Hide it.
    Close,
}

/// Soft keyboard / IME summary, mirrored from the edits routed to the
/// focused handler since it gained focus.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TextInputState {
    pub visibility: TextInputVisibility,
    pub focus: Option<HandlerId>,
    pub text: String,
    /// Caret position in chars.
    pub caret: usize,
}

impl TextInputState {
    /// Forget mirrored content, e.g. after focus moved.
    pub fn reset_content(&mut self) {
        self.text.clear();
        self.caret = 0;
    }

    /// Apply an edit to the mirrored content. Ranges are clamped to the
    /// current content, and the caret ends after the inserted text.
    pub fn apply(&mut self, edit: &EditEvent) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let len = chars.len();
        let range = match &edit.range {
            Some(r) => {
                let start = r.start.min(len);
                start..r.end.clamp(start, len)
            }
            None => {
                let at = self.caret.min(len);
                at..at
            }
        };

        let inserted: Vec<char> = edit.text.chars().collect();
        let caret = range.start + inserted.len();
        chars.splice(range, inserted);

        self.text = chars.into_iter().collect();
        self.caret = caret;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_event_constructors() {
        let ev = KeyEvent::with_modifiers("c", Modifiers::CTRL);
        assert!(ev.is_press());
        assert!(ev.modifiers.contains(Modifiers::CTRL));
        assert!(!KeyEvent::release("Enter").is_press());
    }

    #[test]
    fn test_apply_insert_at_caret() {
        let mut state = TextInputState::default();
        state.apply(&EditEvent::insert("hé"));
        state.apply(&EditEvent::insert("llo"));
        assert_eq!(state.text, "héllo");
        assert_eq!(state.caret, 5);
    }

    #[test]
    fn test_apply_replace_range() {
        let mut state = TextInputState::default();
        state.apply(&EditEvent::insert("hello world"));
        state.apply(&EditEvent::replace(0..5, "howdy"));
        assert_eq!(state.text, "howdy world");
        assert_eq!(state.caret, 5);

        // Next insert lands at the caret, not the end.
        state.apply(&EditEvent::insert(","));
        assert_eq!(state.text, "howdy, world");
    }

    #[test]
    fn test_apply_clamps_range() {
        let mut state = TextInputState::default();
        state.apply(&EditEvent::insert("abc"));
        state.apply(&EditEvent::replace(2..99, "Z"));
        assert_eq!(state.text, "abZ");
        state.apply(&EditEvent::replace(50..60, "!"));
        assert_eq!(state.text, "abZ!");
        assert_eq!(state.caret, 4);
    }

    #[test]
    fn test_reset_content() {
        let mut state = TextInputState::default();
        state.apply(&EditEvent::insert("abc"));
        state.reset_content();
        assert_eq!(state.text, "");
        assert_eq!(state.caret, 0);
    }
}
