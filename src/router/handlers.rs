//! Handler event store - per-handler FIFO queues plus one dirty bit.
//!
//! The dirty bit covers the whole store, not individual handlers: any queue
//! mutation sets it and reading it clears it. The host loop only needs to
//! know that *somebody* has events waiting.

use std::collections::{HashMap, VecDeque};

use crate::event::Event;
use crate::types::HandlerId;

#[derive(Debug, Default)]
pub(crate) struct HandlerEvents {
    handlers: HashMap<HandlerId, VecDeque<Event>>,
    updated: bool,
}

impl HandlerEvents {
    /// Append an event to a handler's queue.
    pub(crate) fn add(&mut self, key: HandlerId, event: Event) {
        self.handlers.entry(key).or_default().push_back(event);
        self.updated = true;
    }

    /// Replace a handler's queue wholesale.
    pub(crate) fn set_all(&mut self, key: HandlerId, events: Vec<Event>) {
        self.handlers.insert(key, VecDeque::from(events));
        self.updated = true;
    }

    /// Pop the oldest event for a handler.
    pub(crate) fn next(&mut self, key: HandlerId) -> Option<Event> {
        let queue = self.handlers.get_mut(&key)?;
        let event = queue.pop_front();
        if queue.is_empty() {
            self.handlers.remove(&key);
        }
        event
    }

    /// Drop every queue. Does not touch the dirty bit.
    pub(crate) fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Return and reset the dirty bit.
    pub(crate) fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.updated)
    }

    #[cfg(test)]
    pub(crate) fn pending(&self, key: HandlerId) -> usize {
        self.handlers.get(&key).map_or(0, VecDeque::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::FocusEvent;

    fn focus(focus: bool) -> Event {
        Event::Focus(FocusEvent { focus })
    }

    #[test]
    fn test_fifo_order() {
        let mut store = HandlerEvents::default();
        let k = HandlerId::new(1);
        store.add(k, focus(true));
        store.add(k, focus(false));

        assert_eq!(store.next(k), Some(focus(true)));
        assert_eq!(store.next(k), Some(focus(false)));
        assert_eq!(store.next(k), None);
    }

    #[test]
    fn test_next_unknown_handler() {
        let mut store = HandlerEvents::default();
        assert_eq!(store.next(HandlerId::new(42)), None);
    }

    #[test]
    fn test_set_all_replaces_queue() {
        let mut store = HandlerEvents::default();
        let k = HandlerId::new(1);
        store.add(k, focus(true));
        store.set_all(k, vec![focus(false)]);

        assert_eq!(store.pending(k), 1);
        assert_eq!(store.next(k), Some(focus(false)));
    }

    #[test]
    fn test_dirty_bit_is_whole_store() {
        let mut store = HandlerEvents::default();
        assert!(!store.take_dirty());

        store.add(HandlerId::new(1), focus(true));
        store.add(HandlerId::new(2), focus(true));
        assert!(store.take_dirty());
        assert!(!store.take_dirty());

        // Draining does not mark dirty.
        store.next(HandlerId::new(1));
        assert!(!store.take_dirty());
    }

    #[test]
    fn test_clear_keeps_dirty_bit() {
        let mut store = HandlerEvents::default();
        let k = HandlerId::new(1);
        store.add(k, focus(true));
        store.clear();
        assert_eq!(store.next(k), None);
        // The pending add is still reported.
        assert!(store.take_dirty());

        store.clear();
        assert!(!store.take_dirty());
    }
}
