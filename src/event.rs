//! Event enums crossing the router boundary.
//!
//! [`InputEvent`] flows in from the platform layer through
//! [`crate::Router::add`]; [`Event`] flows out to widget code through
//! [`crate::Router::next`].

use crate::key::{EditEvent, FocusEvent, KeyEvent};
use crate::pointer::PointerEvent;
use crate::types::HandlerId;

/// Performance summary delivered to handlers that asked for it with a
/// [`crate::ops::ProfileOp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEvent {
    pub timings: String,
}

/// An event queued for a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Edit(EditEvent),
    Focus(FocusEvent),
    Profile(ProfileEvent),
}

/// Raw input from the platform layer.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Edit(EditEvent),
    /// Move keyboard focus to a handler, or clear it with `None`.
    Focus(Option<HandlerId>),
}

impl From<PointerEvent> for InputEvent {
    fn from(e: PointerEvent) -> Self {
        InputEvent::Pointer(e)
    }
}

impl From<KeyEvent> for InputEvent {
    fn from(e: KeyEvent) -> Self {
        InputEvent::Key(e)
    }
}

impl From<EditEvent> for InputEvent {
    fn from(e: EditEvent) -> Self {
        InputEvent::Edit(e)
    }
}

impl Event {
    /// The pointer event, if this is one.
    pub fn as_pointer(&self) -> Option<&PointerEvent> {
        match self {
            Event::Pointer(e) => Some(e),
            _ => None,
        }
    }
}
