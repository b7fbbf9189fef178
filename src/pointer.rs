//! Pointer Module - Pointer event model and hit areas
//!
//! Platform code builds [`PointerEvent`]s with `hit` and `priority` left at
//! their defaults; the router fills both in for every recipient.
//!
//! Areas are registered once per frame through the operation stream (see
//! [`crate::ops::PointerHandlerOp`]) and answer one question: does a position
//! hit me, and if so does the event keep travelling to areas below?

use std::fmt;
use std::time::Duration;

use crate::types::Point;

// =============================================================================
// TYPES
// =============================================================================

/// Pointer event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// The gesture was aborted; forget any in-progress state.
    Cancel,
    Press,
    Release,
    Move,
}

/// Device that produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    #[default]
    Mouse,
    Touch,
}

/// How authoritative an event is for the handler receiving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    /// The event also reached other handlers.
    #[default]
    Shared,
    /// This handler is the one the user aimed at.
    Foremost,
    /// This handler owns the pointer exclusively.
    Grabbed,
}

/// Identifies one pointer (mouse, or a single finger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointerId(pub u16);

/// Pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: Kind,
    pub source: Source,
    pub pointer_id: PointerId,
    /// Computed by the router.
    pub priority: Priority,
    /// Time since an arbitrary platform epoch.
    pub time: Duration,
    /// Computed by the router: whether the position is inside the
    /// recipient's area.
    pub hit: bool,
    /// Position; in the recipient's local space once delivered.
    pub position: Point,
    pub scroll: Point,
}

impl PointerEvent {
    /// Create an event of the given kind at a position.
    pub fn new(kind: Kind, position: Point) -> Self {
        Self {
            kind,
            source: Source::Mouse,
            pointer_id: PointerId::default(),
            priority: Priority::Shared,
            time: Duration::ZERO,
            hit: false,
            position,
            scroll: Point::ZERO,
        }
    }

    /// Create a press event.
    pub fn press(x: f32, y: f32) -> Self {
        Self::new(Kind::Press, Point::new(x, y))
    }

    /// Create a release event.
    pub fn release(x: f32, y: f32) -> Self {
        Self::new(Kind::Release, Point::new(x, y))
    }

    /// Create a move event.
    pub fn move_to(x: f32, y: f32) -> Self {
        Self::new(Kind::Move, Point::new(x, y))
    }

    /// Create a cancel event.
    pub fn cancel() -> Self {
        Self::new(Kind::Cancel, Point::ZERO)
    }

    /// Set the pointer id.
    pub fn with_pointer(mut self, id: u16) -> Self {
        self.pointer_id = PointerId(id);
        self
    }

    /// Set the source device.
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    /// Set the timestamp.
    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = time;
        self
    }

    /// Set the scroll delta.
    pub fn with_scroll(mut self, dx: f32, dy: f32) -> Self {
        self.scroll = Point::new(dx, dy);
        self
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Cancel => "Cancel",
            Kind::Press => "Press",
            Kind::Release => "Release",
            Kind::Move => "Move",
        })
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Mouse => "Mouse",
            Source::Touch => "Touch",
        })
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Shared => "Shared",
            Priority::Foremost => "Foremost",
            Priority::Grabbed => "Grabbed",
        })
    }
}

// =============================================================================
// AREAS
// =============================================================================

/// Result of testing a position against an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    None,
    /// Hit, and areas below may be hit too.
    Transparent,
    /// Hit, and nothing below sees the event.
    Opaque,
}

impl HitResult {
    /// Whether the position was inside the area at all.
    pub fn is_hit(self) -> bool {
        self != HitResult::None
    }
}

/// A hit-testable region.
pub trait Area {
    fn hit(&self, pos: Point) -> HitResult;
}

impl<F> Area for F
where
    F: Fn(Point) -> HitResult,
{
    fn hit(&self, pos: Point) -> HitResult {
        self(pos)
    }
}

/// Axis-aligned rectangle, min inclusive and max exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    /// Create a rectangle from its corners.
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            min: Point::new(x0, y0),
            max: Point::new(x1, y1),
        }
    }

    /// Check whether a point lies inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

fn classify(inside: bool, pass: bool) -> HitResult {
    match (inside, pass) {
        (false, _) => HitResult::None,
        (true, true) => HitResult::Transparent,
        (true, false) => HitResult::Opaque,
    }
}

/// Rectangular area. With `pass` set, hits are transparent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectArea {
    pub rect: Rect,
    pub pass: bool,
}

impl RectArea {
    /// An opaque rectangle.
    pub fn opaque(rect: Rect) -> Self {
        Self { rect, pass: false }
    }

    /// A rectangle that lets events through to areas below.
    pub fn transparent(rect: Rect) -> Self {
        Self { rect, pass: true }
    }
}

impl Area for RectArea {
    fn hit(&self, pos: Point) -> HitResult {
        classify(self.rect.contains(pos), self.pass)
    }
}

/// Ellipse inscribed in a rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseArea {
    pub rect: Rect,
    pub pass: bool,
}

impl Area for EllipseArea {
    fn hit(&self, pos: Point) -> HitResult {
        let rx = self.rect.width() / 2.0;
        let ry = self.rect.height() / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return HitResult::None;
        }
        let dx = pos.x - (self.rect.min.x + rx);
        let dy = pos.y - (self.rect.min.y + ry);
        let inside = (dx * dx) / (rx * rx) + (dy * dy) / (ry * ry) <= 1.0;
        classify(inside, self.pass)
    }
}
