//! Router - routes platform input to the handlers registered each frame.
//!
//! # Cycle
//!
//! ```text
//! layout pass ──► Ops ──► Router::frame ──► clear queues
//!                                          decode registrations
//!                                          pointer queue frame pass
//!                                          key queue frame pass
//!                                          recompute wakeup
//!
//! platform ──► Router::add ──► pointer queue ─┐
//!                          └─► key queue ─────┴─► per-handler queues
//!
//! widget ──► Router::next(handler) ◄── one event at a time
//! ```
//!
//! The router is single-threaded and never blocks. Hosts that need it on
//! several threads should give it to one owning task and talk to that.

mod handlers;
mod key_queue;
mod pointer_queue;

use tracing::{debug, error};

use crate::error::{OpsError, RouterError};
use crate::event::{Event, InputEvent, ProfileEvent};
use crate::key::TextInputState;
use crate::ops::{
    InvalidateOp, KeyHandlerOp, OpType, Ops, PointerHandlerOp, ProfileOp, Reader, TransformOp,
};
use crate::types::{HandlerId, Point, Wakeup};

use handlers::HandlerEvents;
use key_queue::KeyQueue;
use pointer_queue::{AreaEntry, PointerQueue};

// =============================================================================
// FRAME SUMMARY
// =============================================================================

/// Everything the router needs from one operation stream.
#[derive(Default)]
struct FrameOps {
    areas: Vec<AreaEntry>,
    key_handlers: Vec<KeyHandlerOp>,
    hide_input: bool,
    wakeup: Option<Wakeup>,
    profilers: Vec<HandlerId>,
}

/// Decode a whole stream up front so a bad record leaves no half-applied
/// state behind.
fn collect(ops: &Ops) -> Result<FrameOps, OpsError> {
    let mut frame = FrameOps::default();
    let mut offset = Point::ZERO;
    let mut stack: Vec<Point> = Vec::new();

    let mut reader = Reader::new(ops);
    while let Some(op) = reader.decode()? {
        match op.kind {
            OpType::Push => stack.push(offset),
            OpType::Pop => {
                offset = stack
                    .pop()
                    .ok_or(OpsError::StackUnderflow { offset: op.offset })?;
            }
            OpType::Transform => {
                offset = offset + TransformOp::decode(&op)?.offset;
            }
            OpType::PointerHandler => {
                let h = PointerHandlerOp::decode(&op)?;
                frame.areas.push(AreaEntry {
                    key: h.key,
                    area: h.area,
                    offset,
                    grab: h.grab,
                });
            }
            OpType::KeyHandler => frame.key_handlers.push(KeyHandlerOp::decode(&op)?),
            OpType::HideInput => frame.hide_input = true,
            OpType::Invalidate => {
                let req = match InvalidateOp::decode(&op)?.at {
                    Some(at) => Wakeup::At(at),
                    None => Wakeup::Immediate,
                };
                frame.wakeup = Some(Wakeup::merge(frame.wakeup, req));
            }
            OpType::Profile => {
                let key = ProfileOp::decode(&op)?.key;
                if !frame.profilers.contains(&key) {
                    frame.profilers.push(key);
                }
            }
        }
    }
    Ok(frame)
}

// =============================================================================
// ROUTER
// =============================================================================

/// Routes input from all sources to the handlers registered in the latest
/// frame.
#[derive(Default)]
pub struct Router {
    pqueue: PointerQueue,
    kqueue: KeyQueue,
    handlers: HandlerEvents,
    wakeup: Option<Wakeup>,
    prof_handlers: Vec<HandlerId>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the next pending event for a handler.
    pub fn next(&mut self, key: HandlerId) -> Option<Event> {
        self.handlers.next(key)
    }

    /// Rebuild routing state from a frame's operations.
    ///
    /// Pending events from the previous frame are dropped. On a malformed
    /// stream the rebuild is abandoned: queues are left empty, handler
    /// registrations stay as of the last good frame, and no wakeup is
    /// scheduled.
    pub fn frame(&mut self, ops: &Ops) -> Result<(), RouterError> {
        self.handlers.clear();
        self.wakeup = None;
        self.prof_handlers.clear();

        let frame = match collect(ops) {
            Ok(frame) => frame,
            Err(err) => {
                error!(version = ops.version(), %err, "discarding frame");
                return Err(err.into());
            }
        };
        debug!(
            version = ops.version(),
            areas = frame.areas.len(),
            key_handlers = frame.key_handlers.len(),
            profilers = frame.profilers.len(),
            "frame"
        );

        self.wakeup = frame.wakeup;
        self.prof_handlers = frame.profilers;
        self.pqueue.frame(frame.areas);
        self.kqueue
            .frame(&frame.key_handlers, frame.hide_input, &mut self.handlers);

        if self.handlers.take_dirty() {
            self.wakeup = Some(Wakeup::Immediate);
        }
        Ok(())
    }

    /// Route one platform event. Returns whether any handler has new events,
    /// in which case a frame is due immediately.
    pub fn add(&mut self, event: impl Into<InputEvent>) -> bool {
        match event.into() {
            InputEvent::Pointer(e) => self.pqueue.push(e, &mut self.handlers),
            InputEvent::Key(e) => self.kqueue.push_key(e, &mut self.handlers),
            InputEvent::Edit(e) => self.kqueue.push_edit(e, &mut self.handlers),
            InputEvent::Focus(target) => self.kqueue.push_focus(target, &mut self.handlers),
        }
        let updated = self.handlers.take_dirty();
        if updated {
            self.wakeup = Some(Wakeup::Immediate);
        }
        updated
    }

    /// Soft keyboard / IME state for the platform layer.
    pub fn text_input_state(&self) -> &TextInputState {
        self.kqueue.input_state()
    }

    /// Deliver a performance summary to every handler that asked for one.
    pub fn add_profile(&mut self, e: ProfileEvent) {
        for &h in &self.prof_handlers {
            self.handlers.add(h, Event::Profile(e.clone()));
        }
    }

    /// Whether any handler asked for profile events this frame.
    pub fn profiling(&self) -> bool {
        !self.prof_handlers.is_empty()
    }

    /// When the next frame is due, if at all.
    pub fn wakeup_time(&self) -> Option<Wakeup> {
        self.wakeup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{FocusEvent, KeyEvent, TextInputVisibility};
    use crate::ops::{HideInputOp, PopOp, PushOp};
    use crate::pointer::{PointerEvent, Priority, Rect, RectArea};
    use std::time::{Duration, UNIX_EPOCH};

    const A: HandlerId = HandlerId::new(1);
    const B: HandlerId = HandlerId::new(2);

    fn at(secs: u64) -> std::time::SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_empty_frame() {
        let mut router = Router::new();
        router.frame(&Ops::new()).unwrap();
        assert_eq!(router.wakeup_time(), None);
        assert!(!router.profiling());
        assert_eq!(router.next(A), None);
    }

    #[test]
    fn test_wakeup_takes_earliest() {
        let mut ops = Ops::new();
        InvalidateOp::at(at(20)).add(&mut ops);
        InvalidateOp::at(at(10)).add(&mut ops);
        InvalidateOp::at(at(30)).add(&mut ops);

        let mut router = Router::new();
        router.frame(&ops).unwrap();
        assert_eq!(router.wakeup_time(), Some(Wakeup::At(at(10))));
    }

    #[test]
    fn test_zero_invalidate_wins() {
        let mut ops = Ops::new();
        InvalidateOp::at(at(10)).add(&mut ops);
        InvalidateOp::default().add(&mut ops);

        let mut router = Router::new();
        router.frame(&ops).unwrap();
        assert_eq!(router.wakeup_time(), Some(Wakeup::Immediate));
    }

    #[test]
    fn test_wakeup_recomputed_each_frame() {
        let mut ops = Ops::new();
        InvalidateOp::at(at(10)).add(&mut ops);
        let mut router = Router::new();
        router.frame(&ops).unwrap();

        router.frame(&Ops::new()).unwrap();
        assert_eq!(router.wakeup_time(), None);
    }

    #[test]
    fn test_profile_handlers() {
        let mut ops = Ops::new();
        ProfileOp { key: A }.add(&mut ops);
        ProfileOp { key: A }.add(&mut ops);

        let mut router = Router::new();
        router.frame(&ops).unwrap();
        assert!(router.profiling());

        let summary = ProfileEvent {
            timings: "frame:1ms".into(),
        };
        router.add_profile(summary.clone());
        assert_eq!(router.next(A), Some(Event::Profile(summary)));
        assert_eq!(router.next(A), None);
        assert_eq!(router.next(B), None);
    }

    #[test]
    fn test_add_sets_immediate_wakeup() {
        let mut ops = Ops::new();
        PointerHandlerOp::new(A, RectArea::opaque(Rect::new(0.0, 0.0, 10.0, 10.0))).add(&mut ops);
        let mut router = Router::new();
        router.frame(&ops).unwrap();
        assert_eq!(router.wakeup_time(), None);

        assert!(!router.add(PointerEvent::press(50.0, 50.0)));
        assert_eq!(router.wakeup_time(), None);

        assert!(router.add(PointerEvent::press(5.0, 5.0)));
        assert_eq!(router.wakeup_time(), Some(Wakeup::Immediate));
    }

    #[test]
    fn test_frame_clears_pending_events() {
        let mut ops = Ops::new();
        PointerHandlerOp::new(A, RectArea::opaque(Rect::new(0.0, 0.0, 10.0, 10.0))).add(&mut ops);
        let mut router = Router::new();
        router.frame(&ops).unwrap();
        router.add(PointerEvent::press(5.0, 5.0));

        router.frame(&ops).unwrap();
        assert_eq!(router.next(A), None);
    }

    #[test]
    fn test_transform_stack_scopes_offsets() {
        let mut ops = Ops::new();
        PushOp.add(&mut ops);
        TransformOp::offset(100.0, 0.0).add(&mut ops);
        PointerHandlerOp::new(A, RectArea::opaque(Rect::new(0.0, 0.0, 10.0, 10.0))).add(&mut ops);
        PopOp.add(&mut ops);
        PointerHandlerOp::new(B, RectArea::opaque(Rect::new(0.0, 0.0, 10.0, 10.0))).add(&mut ops);

        let mut router = Router::new();
        router.frame(&ops).unwrap();

        router.add(PointerEvent::press(105.0, 5.0));
        let a = router.next(A).unwrap();
        assert_eq!(a.as_pointer().unwrap().position, Point::new(5.0, 5.0));
        assert_eq!(router.next(B), None);

        router.add(PointerEvent::press(5.0, 5.0));
        assert_eq!(router.next(B).unwrap().as_pointer().unwrap().priority, Priority::Foremost);
    }

    #[test]
    fn test_pop_underflow_discards_frame() {
        let mut good = Ops::new();
        PointerHandlerOp::new(A, RectArea::opaque(Rect::new(0.0, 0.0, 10.0, 10.0))).add(&mut good);
        InvalidateOp::default().add(&mut good);
        let mut router = Router::new();
        router.frame(&good).unwrap();

        let mut bad = Ops::new();
        InvalidateOp::default().add(&mut bad);
        PopOp.add(&mut bad);
        let err = router.frame(&bad).unwrap_err();
        assert_eq!(err, RouterError::Ops(OpsError::StackUnderflow { offset: 9 }));
        assert_eq!(router.wakeup_time(), None);

        // Registrations from the last good frame still route.
        assert!(router.add(PointerEvent::press(5.0, 5.0)));
        assert!(router.next(A).is_some());
    }

    #[test]
    fn test_frame_focus_sets_wakeup_and_state() {
        let mut ops = Ops::new();
        KeyHandlerOp::new(A).focus(true).add(&mut ops);
        let mut router = Router::new();
        router.frame(&ops).unwrap();

        assert_eq!(router.next(A), Some(Event::Focus(FocusEvent { focus: true })));
        assert_eq!(router.wakeup_time(), Some(Wakeup::Immediate));
        assert_eq!(router.text_input_state().visibility, TextInputVisibility::Open);

        router.add(KeyEvent::new("q"));
        assert_eq!(router.next(A), Some(Event::Key(KeyEvent::new("q"))));
    }

    #[test]
    fn test_hide_input_op() {
        let mut ops = Ops::new();
        KeyHandlerOp::new(A).add(&mut ops);
        HideInputOp.add(&mut ops);
        let mut router = Router::new();
        router.frame(&ops).unwrap();
        assert_eq!(router.text_input_state().visibility, TextInputVisibility::Close);
    }
}
