//! Terminal Module - crossterm platform adapter
//!
//! Bridges crossterm's event system to [`InputEvent`]s for the router.
//!
//! # API
//!
//! - `TerminalInput::convert` - Convert a crossterm event, if the router cares
//! - `TerminalInput::poll_event` - Non-blocking event check with timeout
//! - `TerminalInput::read_event` - Blocking event read
//! - `enable_mouse` / `disable_mouse` - Control mouse capture
//!
//! The mouse is pointer 0 and cell coordinates become positions. Printable
//! keys typed without Ctrl/Alt arrive as text edits, everything else as key
//! events.
//!
//! # Example
//!
//! ```ignore
//! use spark_input::{Router, terminal::TerminalInput};
//! use std::time::Duration;
//!
//! let input = TerminalInput::new();
//! loop {
//!     if let Ok(Some(event)) = input.poll_event(Duration::from_millis(16)) {
//!         router.add(event);
//!     }
//! }
//! ```

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode,
    KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers, MouseEvent as CrosstermMouseEvent,
    MouseEventKind, poll, read,
};
use crossterm::execute;
use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crate::event::InputEvent;
use crate::key::{EditEvent, KeyEvent, KeyState, Modifiers};
use crate::pointer::{Kind, PointerEvent, Source};
use crate::types::Point;

// =============================================================================
// INPUT SOURCE
// =============================================================================

/// Terminal input source. Timestamps count from its creation.
#[derive(Debug, Clone)]
pub struct TerminalInput {
    started: Instant,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Convert a crossterm event. Events the router has no use for (resize,
    /// focus gained) give `None`.
    pub fn convert(&self, event: CrosstermEvent) -> Option<InputEvent> {
        match event {
            CrosstermEvent::Mouse(mouse) => Some(InputEvent::Pointer(convert_mouse_event(
                mouse,
                self.started.elapsed(),
            ))),
            CrosstermEvent::Key(key) => Some(convert_key_event(key)),
            CrosstermEvent::Paste(text) => Some(InputEvent::Edit(EditEvent::insert(text))),
            // The terminal lost focus, so nothing inside it has keyboard focus.
            CrosstermEvent::FocusLost => Some(InputEvent::Focus(None)),
            CrosstermEvent::FocusGained | CrosstermEvent::Resize(..) => None,
        }
    }

    /// Poll for an event with timeout.
    /// Returns None if no event arrived or it was not routable.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if poll(timeout)? {
            self.read_event()
        } else {
            Ok(None)
        }
    }

    /// Read the next event (blocking).
    pub fn read_event(&self) -> io::Result<Option<InputEvent>> {
        Ok(self.convert(read()?))
    }
}

impl Default for TerminalInput {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// MOUSE EVENT CONVERSION
// =============================================================================

/// Convert crossterm MouseEvent to a pointer event for pointer 0.
pub fn convert_mouse_event(event: CrosstermMouseEvent, time: Duration) -> PointerEvent {
    let (kind, scroll) = match event.kind {
        MouseEventKind::Down(_) => (Kind::Press, Point::ZERO),
        MouseEventKind::Up(_) => (Kind::Release, Point::ZERO),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => (Kind::Move, Point::ZERO),
        MouseEventKind::ScrollUp => (Kind::Move, Point::new(0.0, -1.0)),
        MouseEventKind::ScrollDown => (Kind::Move, Point::new(0.0, 1.0)),
        MouseEventKind::ScrollLeft => (Kind::Move, Point::new(-1.0, 0.0)),
        MouseEventKind::ScrollRight => (Kind::Move, Point::new(1.0, 0.0)),
    };

    PointerEvent::new(kind, Point::new(event.column as f32, event.row as f32))
        .with_source(Source::Mouse)
        .with_pointer(0)
        .with_time(time)
        .with_scroll(scroll.x, scroll.y)
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyEvent to a key or edit event.
pub fn convert_key_event(event: CrosstermKeyEvent) -> InputEvent {
    let mut modifiers = convert_modifiers(event.modifiers);
    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    let name = match event.code {
        KeyCode::Char(c) => {
            let typed = !modifiers.intersects(Modifiers::CTRL | Modifiers::ALT);
            if typed && state != KeyState::Release {
                return InputEvent::Edit(EditEvent::insert(c));
            }
            c.to_string()
        }
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => {
            modifiers |= Modifiers::SHIFT;
            "Tab".to_string()
        }
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Insert => "Insert".to_string(),
        _ => String::new(),
    };

    InputEvent::Key(KeyEvent {
        name,
        modifiers,
        state,
    })
}

// =============================================================================
// MODIFIER CONVERSION
// =============================================================================

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, mods.contains(KeyModifiers::SHIFT));
    out.set(Modifiers::ALT, mods.contains(KeyModifiers::ALT));
    out.set(Modifiers::CTRL, mods.contains(KeyModifiers::CONTROL));
    out.set(Modifiers::SUPER, mods.contains(KeyModifiers::SUPER));
    out
}

// =============================================================================
// MOUSE CAPTURE
// =============================================================================

/// Enable mouse capture.
pub fn enable_mouse() -> io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable mouse capture.
pub fn disable_mouse() -> io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

// =============================================================================
// TESTS
// =============================================================================
