//! Key queue - keyboard focus and soft keyboard state.

use tracing::{debug, trace, warn};

use super::handlers::HandlerEvents;
use crate::event::Event;
use crate::key::{EditEvent, FocusEvent, KeyEvent, TextInputState, TextInputVisibility};
use crate::ops::KeyHandlerOp;
use crate::types::HandlerId;

#[derive(Debug, Default)]
pub(crate) struct KeyQueue {
    /// Key handlers registered in the current frame.
    handlers: Vec<HandlerId>,
    focus: Option<HandlerId>,
    state: TextInputState,
}

impl KeyQueue {
    /// Install this frame's key handler registrations and resolve focus.
    pub(crate) fn frame(&mut self, regs: &[KeyHandlerOp], hide: bool, events: &mut HandlerEvents) {
        self.handlers = regs.iter().map(|r| r.key).collect();
        let requested = regs.iter().rev().find(|r| r.focus).map(|r| r.key);

        // A focused handler that stopped registering loses focus silently;
        // there is nobody left to tell.
        let mut dropped = false;
        if let Some(focused) = self.focus {
            if !self.is_registered(focused) {
                debug!(handler = focused.raw(), "focused handler gone");
                self.focus = None;
                self.state.focus = None;
                self.state.reset_content();
                dropped = true;
            }
        }

        let mut gained = false;
        if let Some(target) = requested {
            if self.focus != Some(target) {
                for (key, ev) in self.move_focus(Some(target)) {
                    events.set_all(key, vec![Event::Focus(ev)]);
                }
                gained = true;
            }
        }

        self.state.visibility = if hide {
            TextInputVisibility::Close
        } else if gained {
            TextInputVisibility::Open
        } else if dropped {
            TextInputVisibility::Close
        } else {
            TextInputVisibility::Keep
        };
    }

    /// Route a key press or release to the focused handler.
    pub(crate) fn push_key(&mut self, e: KeyEvent, events: &mut HandlerEvents) {
        if let Some(focused) = self.focus {
            trace!(handler = focused.raw(), key = %e.name, "key");
            events.add(focused, Event::Key(e));
        }
    }

    /// Route a text edit to the focused handler and mirror it.
    pub(crate) fn push_edit(&mut self, e: EditEvent, events: &mut HandlerEvents) {
        if let Some(focused) = self.focus {
            self.state.apply(&e);
            events.add(focused, Event::Edit(e));
        }
    }

    /// Move focus to `target`, or clear it.
    pub(crate) fn push_focus(&mut self, target: Option<HandlerId>, events: &mut HandlerEvents) {
        if let Some(k) = target {
            if !self.is_registered(k) {
                warn!(handler = k.raw(), "focus requested for unregistered key handler");
                return;
            }
        }
        if target == self.focus {
            return;
        }

        for (key, ev) in self.move_focus(target) {
            events.add(key, Event::Focus(ev));
        }
        self.state.visibility = match target {
            Some(_) => TextInputVisibility::Open,
            None => TextInputVisibility::Close,
        };
    }

    pub(crate) fn input_state(&self) -> &TextInputState {
        &self.state
    }

    fn is_registered(&self, key: HandlerId) -> bool {
        self.handlers.contains(&key)
    }

    /// Switch focus and return the notifications to deliver, lost first.
    fn move_focus(&mut self, target: Option<HandlerId>) -> Vec<(HandlerId, FocusEvent)> {
        let mut out = Vec::with_capacity(2);
        if let Some(prev) = self.focus.take() {
            out.push((prev, FocusEvent { focus: false }));
        }
        if let Some(next) = target {
            out.push((next, FocusEvent { focus: true }));
        }
        debug!(
            from = ?out.first().map(|(k, _)| k.raw()),
            to = ?target.map(HandlerId::raw),
            "focus moved"
        );

        self.focus = target;
        self.state.focus = target;
        self.state.reset_content();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: HandlerId = HandlerId::new(1);
    const B: HandlerId = HandlerId::new(2);

    fn focus_event(events: &mut HandlerEvents, key: HandlerId) -> Option<bool> {
        match events.next(key) {
            Some(Event::Focus(f)) => Some(f.focus),
            Some(other) => panic!("unexpected event {other:?}"),
            None => None,
        }
    }

    fn registered(q: &mut KeyQueue, events: &mut HandlerEvents) {
        q.frame(&[KeyHandlerOp::new(A), KeyHandlerOp::new(B)], false, events);
    }

    #[test]
    fn test_keys_go_to_focused_only() {
        let mut q = KeyQueue::default();
        let mut events = HandlerEvents::default();
        registered(&mut q, &mut events);

        q.push_key(KeyEvent::new("a"), &mut events);
        assert!(!events.take_dirty());

        q.push_focus(Some(A), &mut events);
        q.push_key(KeyEvent::new("Enter"), &mut events);
        assert_eq!(focus_event(&mut events, A), Some(true));
        assert_eq!(events.next(A), Some(Event::Key(KeyEvent::new("Enter"))));
        assert_eq!(events.next(B), None);
    }

    #[test]
    fn test_focus_transition_notifies_both() {
        let mut q = KeyQueue::default();
        let mut events = HandlerEvents::default();
        registered(&mut q, &mut events);

        q.push_focus(Some(A), &mut events);
        q.push_focus(Some(B), &mut events);
        assert_eq!(focus_event(&mut events, A), Some(true));
        assert_eq!(focus_event(&mut events, A), Some(false));
        assert_eq!(focus_event(&mut events, B), Some(true));
        assert_eq!(q.input_state().focus, Some(B));
        assert_eq!(q.input_state().visibility, TextInputVisibility::Open);

        q.push_focus(None, &mut events);
        assert_eq!(focus_event(&mut events, B), Some(false));
        assert_eq!(q.input_state().visibility, TextInputVisibility::Close);
    }

    #[test]
    fn test_focus_unregistered_is_ignored() {
        let mut q = KeyQueue::default();
        let mut events = HandlerEvents::default();
        registered(&mut q, &mut events);

        q.push_focus(Some(HandlerId::new(99)), &mut events);
        assert!(!events.take_dirty());
        assert_eq!(q.input_state().focus, None);
    }

    #[test]
    fn test_frame_focus_request() {
        let mut q = KeyQueue::default();
        let mut events = HandlerEvents::default();

        q.frame(&[KeyHandlerOp::new(A).focus(true), KeyHandlerOp::new(B)], false, &mut events);
        assert_eq!(focus_event(&mut events, A), Some(true));
        assert_eq!(q.input_state().visibility, TextInputVisibility::Open);

        // Same request next frame changes nothing.
        q.frame(&[KeyHandlerOp::new(A).focus(true), KeyHandlerOp::new(B)], false, &mut events);
        assert_eq!(focus_event(&mut events, A), None);
        assert_eq!(q.input_state().visibility, TextInputVisibility::Keep);
    }

    #[test]
    fn test_frame_drops_vanished_focus() {
        let mut q = KeyQueue::default();
        let mut events = HandlerEvents::default();
        registered(&mut q, &mut events);
        q.push_focus(Some(A), &mut events);
        focus_event(&mut events, A);

        q.frame(&[KeyHandlerOp::new(B)], false, &mut events);
        assert_eq!(q.input_state().focus, None);
        assert_eq!(q.input_state().visibility, TextInputVisibility::Close);
        assert_eq!(focus_event(&mut events, A), None);

        q.push_key(KeyEvent::new("x"), &mut events);
        assert_eq!(events.next(B), None);
    }

    #[test]
    fn test_hide_input_closes() {
        let mut q = KeyQueue::default();
        let mut events = HandlerEvents::default();
        q.frame(&[KeyHandlerOp::new(A).focus(true)], true, &mut events);
        assert_eq!(q.input_state().focus, Some(A));
        assert_eq!(q.input_state().visibility, TextInputVisibility::Close);
    }

    #[test]
    fn test_edits_mirror_into_state() {
        let mut q = KeyQueue::default();
        let mut events = HandlerEvents::default();
        registered(&mut q, &mut events);

        // Without focus edits go nowhere.
        q.push_edit(EditEvent::insert("lost"), &mut events);
        assert_eq!(q.input_state().text, "");

        q.push_focus(Some(A), &mut events);
        q.push_edit(EditEvent::insert("hi"), &mut events);
        assert_eq!(q.input_state().text, "hi");
        focus_event(&mut events, A);
        assert_eq!(events.next(A), Some(Event::Edit(EditEvent::insert("hi"))));

        // Content belongs to the focused handler.
        q.push_focus(Some(B), &mut events);
        assert_eq!(q.input_state().text, "");
    }
}
