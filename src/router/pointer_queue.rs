//! Pointer queue - hit-testing, priorities and grabs.
//!
//! Areas are rebuilt every frame from the operation stream and kept topmost
//! first. Per-pointer state (who received the last event, who holds a grab)
//! outlives frames.
//!
//! Delivery for one event:
//!
//! ```text
//! grabbed pointer ──► owner only, priority Grabbed
//!        │
//!        ▼ (no grab)
//! scan areas top → bottom
//!   transparent hit ──► recipient, keep scanning
//!   opaque hit      ──► recipient, stop
//!
//! foremost = the opaque hit that stopped the scan,
//!            else the topmost transparent hit
//! ```

use std::rc::Rc;

use tracing::{debug, trace};

use super::handlers::HandlerEvents;
use crate::event::Event;
use crate::pointer::{Area, HitResult, Kind, PointerEvent, PointerId, Priority};
use crate::types::{HandlerId, Point};

/// An area registration, with the offset active when it was recorded.
#[derive(Clone)]
pub(crate) struct AreaEntry {
    pub key: HandlerId,
    pub area: Rc<dyn Area>,
    pub offset: Point,
    pub grab: bool,
}

impl AreaEntry {
    fn hit(&self, pos: Point) -> HitResult {
        self.area.hit(pos - self.offset)
    }
}

#[derive(Debug)]
struct PointerInfo {
    id: PointerId,
    grab: Option<HandlerId>,
    /// Recipients of the last event for this pointer.
    handlers: Vec<HandlerId>,
}

#[derive(Debug, Clone, Copy)]
struct Hit {
    key: HandlerId,
    /// Index into `areas` of the topmost area that hit.
    area: usize,
    result: HitResult,
    /// Any of the handler's hit areas carries the grab flag.
    grab: bool,
}

#[derive(Default)]
pub(crate) struct PointerQueue {
    /// Topmost first.
    areas: Vec<AreaEntry>,
    pointers: Vec<PointerInfo>,
}

impl PointerQueue {
    /// Install this frame's area registrations, given in stream order.
    pub(crate) fn frame(&mut self, mut areas: Vec<AreaEntry>) {
        areas.reverse();
        self.areas = areas;

        let areas = &self.areas;
        let registered = |k: &HandlerId| areas.iter().any(|a| a.key == *k);
        for p in &mut self.pointers {
            p.handlers.retain(registered);
            if let Some(owner) = p.grab {
                if !registered(&owner) {
                    debug!(pointer = p.id.0, handler = owner.raw(), "grab owner gone, releasing");
                    p.grab = None;
                }
            }
        }
        self.pointers
            .retain(|p| p.grab.is_some() || !p.handlers.is_empty());
    }

    /// Route one pointer event.
    pub(crate) fn push(&mut self, e: PointerEvent, events: &mut HandlerEvents) {
        let pidx = match self.pointers.iter().position(|p| p.id == e.pointer_id) {
            Some(i) => i,
            None => {
                self.pointers.push(PointerInfo {
                    id: e.pointer_id,
                    grab: None,
                    handlers: Vec::new(),
                });
                self.pointers.len() - 1
            }
        };

        if let Some(owner) = self.pointers[pidx].grab {
            self.deliver_grabbed(owner, &e, events);
            if matches!(e.kind, Kind::Release | Kind::Cancel) {
                debug!(pointer = e.pointer_id.0, handler = owner.raw(), "grab ended");
                self.pointers.remove(pidx);
            }
            return;
        }

        if e.kind == Kind::Cancel {
            let p = self.pointers.remove(pidx);
            for key in p.handlers {
                let mut c = e.clone();
                c.hit = false;
                c.priority = Priority::Shared;
                events.add(key, Event::Pointer(c));
            }
            return;
        }

        let hits = self.hit_test(e.position);
        let foremost = hits
            .iter()
            .position(|h| h.result == HitResult::Opaque)
            .unwrap_or(0);

        for (i, h) in hits.iter().enumerate() {
            let mut ev = e.clone();
            ev.hit = true;
            ev.priority = if i == foremost {
                Priority::Foremost
            } else {
                Priority::Shared
            };
            ev.position = e.position - self.areas[h.area].offset;
            trace!(handler = h.key.raw(), kind = %ev.kind, priority = %ev.priority, "pointer");
            events.add(h.key, Event::Pointer(ev));
        }

        let grabber = match e.kind {
            Kind::Press => hits.iter().find(|h| h.grab).copied(),
            _ => None,
        };

        let p = &mut self.pointers[pidx];
        p.handlers = hits.iter().map(|h| h.key).collect();

        if let Some(g) = grabber {
            debug!(pointer = e.pointer_id.0, handler = g.key.raw(), "grab started");
            // Everyone else saw the press but will never see its release.
            for other in hits.iter().filter(|h| h.key != g.key) {
                let mut c = e.clone();
                c.kind = Kind::Cancel;
                c.hit = false;
                c.priority = Priority::Shared;
                c.position = e.position - self.areas[other.area].offset;
                events.add(other.key, Event::Pointer(c));
            }
            p.grab = Some(g.key);
            p.handlers = vec![g.key];
        } else if e.kind == Kind::Release {
            self.pointers.remove(pidx);
        }
    }

    fn deliver_grabbed(&self, owner: HandlerId, e: &PointerEvent, events: &mut HandlerEvents) {
        let entry = self
            .areas
            .iter()
            .find(|a| a.key == owner && a.grab)
            .or_else(|| self.areas.iter().find(|a| a.key == owner));

        let mut ev = e.clone();
        ev.priority = Priority::Grabbed;
        match entry {
            Some(a) => {
                ev.hit = a.hit(e.position).is_hit();
                ev.position = e.position - a.offset;
            }
            None => ev.hit = false,
        }
        trace!(handler = owner.raw(), kind = %ev.kind, "pointer grabbed");
        events.add(owner, Event::Pointer(ev));
    }

    /// Handlers hit at `pos`, topmost first, ending at the first opaque hit.
    /// A handler with several areas appears once, at its topmost hit.
    fn hit_test(&self, pos: Point) -> Vec<Hit> {
        let mut hits: Vec<Hit> = Vec::new();
        for (i, a) in self.areas.iter().enumerate() {
            let result = a.hit(pos);
            if !result.is_hit() {
                continue;
            }
            match hits.iter_mut().find(|h| h.key == a.key) {
                Some(existing) => {
                    if result == HitResult::Opaque {
                        existing.result = HitResult::Opaque;
                    }
                    existing.grab |= a.grab;
                }
                None => hits.push(Hit {
                    key: a.key,
                    area: i,
                    result,
                    grab: a.grab,
                }),
            }
            if result == HitResult::Opaque {
                break;
            }
        }
        hits
    }

    #[cfg(test)]
    fn grab_owner(&self, id: PointerId) -> Option<HandlerId> {
        self.pointers.iter().find(|p| p.id == id).and_then(|p| p.grab)
    }
}
