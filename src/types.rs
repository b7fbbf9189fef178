//! Core types for spark-input.
//!
//! The small value types every other module speaks: positions, handler
//! identities and wakeup deadlines.

use std::ops::{Add, Sub};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

// =============================================================================
// Point
// =============================================================================

/// A 2D position or offset in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// =============================================================================
// Handler Identity
// =============================================================================

/// Opaque token naming an input consumer.
///
/// Identities are created and owned by widget code. The router only compares
/// and hashes them, it never interprets the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Wrap a caller-chosen value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate a process-wide unique identity.
    pub fn new_unique() -> Self {
        // Starts high so it never collides with small hand-picked ids.
        static NEXT_ID: AtomicU64 = AtomicU64::new(1 << 32);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

// =============================================================================
// Wakeup
// =============================================================================

/// When the host loop should run the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// As soon as possible.
    Immediate,
    /// At (or after) an absolute time.
    At(SystemTime),
}

impl Wakeup {
    /// Collapse two requests into the earlier one. `Immediate` wins over any
    /// deadline.
    pub fn earliest(self, other: Wakeup) -> Wakeup {
        match (self, other) {
            (Wakeup::Immediate, _) | (_, Wakeup::Immediate) => Wakeup::Immediate,
            (Wakeup::At(a), Wakeup::At(b)) => Wakeup::At(a.min(b)),
        }
    }

    /// Fold an optional current request with a new one.
    pub fn merge(current: Option<Wakeup>, next: Wakeup) -> Wakeup {
        match current {
            Some(current) => current.earliest(next),
            None => next,
        }
    }
}
