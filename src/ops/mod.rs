//! Operation stream - the per-frame record of input registrations.
//!
//! The layout pass appends one flat, tagged record per operation to an
//! [`Ops`] list every frame. Plain data (flags, offsets, timestamps) is
//! encoded inline as little-endian bytes; values that cannot be flattened
//! (handler identities, hit areas) go into a parallel side table of [`Ref`]s
//! that the binary records index implicitly, in order.
//!
//! ```text
//! data: [tag|payload][tag|payload][tag|payload] ...
//! refs:  Handler,Area              Handler       ...
//! ```
//!
//! Record size and ref count are a pure function of the tag (see
//! [`OpType::size`] and [`OpType::num_refs`]), so a [`Reader`] can walk the
//! stream without understanding every kind.

mod reader;

use std::fmt;
use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use reader::{EncodedOp, Reader};

use crate::error::OpsError;
use crate::pointer::Area;
use crate::types::{HandlerId, Point};

// =============================================================================
// Op Types
// =============================================================================

/// Record tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpType {
    Push = 1,
    Pop = 2,
    Transform = 3,
    PointerHandler = 4,
    KeyHandler = 5,
    HideInput = 6,
    Invalidate = 7,
    Profile = 8,
}

impl OpType {
    /// Parse a tag byte.
    pub fn from_byte(b: u8) -> Option<OpType> {
        Some(match b {
            1 => OpType::Push,
            2 => OpType::Pop,
            3 => OpType::Transform,
            4 => OpType::PointerHandler,
            5 => OpType::KeyHandler,
            6 => OpType::HideInput,
            7 => OpType::Invalidate,
            8 => OpType::Profile,
            _ => return None,
        })
    }

    /// Encoded size in bytes, tag included.
    pub const fn size(self) -> usize {
        match self {
            OpType::Push | OpType::Pop | OpType::HideInput | OpType::Profile => 1,
            OpType::PointerHandler | OpType::KeyHandler => 2,
            OpType::Transform | OpType::Invalidate => 9,
        }
    }

    /// Number of side-table references the record consumes.
    pub const fn num_refs(self) -> usize {
        match self {
            OpType::PointerHandler => 2,
            OpType::KeyHandler | OpType::Profile => 1,
            _ => 0,
        }
    }
}

// =============================================================================
// Ops
// =============================================================================

/// Side-table entry.
#[derive(Clone)]
pub enum Ref {
    Handler(HandlerId),
    Area(Rc<dyn Area>),
}

impl fmt::Debug for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ref::Handler(k) => f.debug_tuple("Handler").field(k).finish(),
            Ref::Area(_) => f.write_str("Area(..)"),
        }
    }
}

/// A frame's operation list.
#[derive(Debug, Clone, Default)]
pub struct Ops {
    version: u32,
    data: Vec<u8>,
    refs: Vec<Ref>,
}

impl Ops {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already encoded stream, e.g. one replayed from a recording.
    /// Nothing is validated until a [`Reader`] walks it.
    pub fn from_parts(data: Vec<u8>, refs: Vec<Ref>) -> Self {
        Self {
            version: 0,
            data,
            refs,
        }
    }

    /// Clear all records for reuse in the next frame.
    pub fn reset(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.data.clear();
        self.refs.clear();
    }

    /// Incremented by every [`Ops::reset`].
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn refs(&self) -> &[Ref] {
        &self.refs
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn write(&mut self, bytes: &[u8], refs: impl IntoIterator<Item = Ref>) {
        debug_assert_eq!(
            OpType::from_byte(bytes[0]).map(OpType::size),
            Some(bytes.len())
        );
        self.data.extend_from_slice(bytes);
        self.refs.extend(refs);
    }
}

// =============================================================================
// Decode Helpers
// =============================================================================

/// Check the tag and length of a record, returning its bytes.
fn record<'a>(op: &EncodedOp<'a>, expected: OpType) -> Result<&'a [u8], OpsError> {
    let found = *op.data.first().ok_or(OpsError::Truncated {
        op: expected,
        offset: op.offset,
        need: expected.size(),
        have: 0,
    })?;
    if found != expected as u8 {
        return Err(OpsError::TagMismatch { expected, found });
    }
    op.data.get(..expected.size()).ok_or(OpsError::Truncated {
        op: expected,
        offset: op.offset,
        need: expected.size(),
        have: op.data.len(),
    })
}

fn handler_ref(op: &EncodedOp<'_>, slot: usize) -> Result<HandlerId, OpsError> {
    match op.refs.get(slot) {
        Some(Ref::Handler(k)) => Ok(*k),
        _ => Err(OpsError::RefType {
            op: op.kind,
            slot,
            expected: "handler",
        }),
    }
}

fn area_ref(op: &EncodedOp<'_>, slot: usize) -> Result<Rc<dyn Area>, OpsError> {
    match op.refs.get(slot) {
        Some(Ref::Area(a)) => Ok(Rc::clone(a)),
        _ => Err(OpsError::RefType {
            op: op.kind,
            slot,
            expected: "area",
        }),
    }
}

fn read_f32(d: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([d[at], d[at + 1], d[at + 2], d[at + 3]])
}

// =============================================================================
// Stack Ops
// =============================================================================

/// Save the current transform; undone by the matching [`PopOp`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PushOp;

impl PushOp {
    pub fn add(&self, ops: &mut Ops) {
        ops.write(&[OpType::Push as u8], []);
    }
}

/// Restore the transform saved by the matching [`PushOp`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PopOp;

impl PopOp {
    pub fn add(&self, ops: &mut Ops) {
        ops.write(&[OpType::Pop as u8], []);
    }
}

/// Offset subsequent areas, relative to the current transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformOp {
    pub offset: Point,
}

impl TransformOp {
    pub fn offset(x: f32, y: f32) -> Self {
        Self {
            offset: Point::new(x, y),
        }
    }

    pub fn add(&self, ops: &mut Ops) {
        let mut data = [0u8; 9];
        data[0] = OpType::Transform as u8;
        data[1..5].copy_from_slice(&self.offset.x.to_le_bytes());
        data[5..9].copy_from_slice(&self.offset.y.to_le_bytes());
        ops.write(&data, []);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Result<Self, OpsError> {
        let d = record(op, OpType::Transform)?;
        Ok(Self {
            offset: Point::new(read_f32(d, 1), read_f32(d, 5)),
        })
    }
}

// =============================================================================
// Handler Ops
// =============================================================================

/// Register a hit area for a pointer handler.
///
/// Areas registered later sit above earlier ones. With `grab` set, a press
/// inside the area makes the handler the exclusive owner of that pointer
/// until release.
#[derive(Clone)]
pub struct PointerHandlerOp {
    pub key: HandlerId,
    pub area: Rc<dyn Area>,
    pub grab: bool,
}

impl PointerHandlerOp {
    pub fn new(key: HandlerId, area: impl Area + 'static) -> Self {
        Self {
            key,
            area: Rc::new(area),
            grab: false,
        }
    }

    pub fn grab(mut self, grab: bool) -> Self {
        self.grab = grab;
        self
    }

    pub fn add(&self, ops: &mut Ops) {
        ops.write(
            &[OpType::PointerHandler as u8, self.grab as u8],
            [Ref::Handler(self.key), Ref::Area(Rc::clone(&self.area))],
        );
    }

    pub fn decode(op: &EncodedOp<'_>) -> Result<Self, OpsError> {
        let d = record(op, OpType::PointerHandler)?;
        Ok(Self {
            key: handler_ref(op, 0)?,
            area: area_ref(op, 1)?,
            grab: d[1] != 0,
        })
    }
}

impl fmt::Debug for PointerHandlerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerHandlerOp")
            .field("key", &self.key)
            .field("grab", &self.grab)
            .finish_non_exhaustive()
    }
}

/// Register a keyboard handler. With `focus` set, the handler asks for
/// keyboard focus this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHandlerOp {
    pub key: HandlerId,
    pub focus: bool,
}

impl KeyHandlerOp {
    pub fn new(key: HandlerId) -> Self {
        Self { key, focus: false }
    }

    pub fn focus(mut self, focus: bool) -> Self {
        self.focus = focus;
        self
    }

    pub fn add(&self, ops: &mut Ops) {
        ops.write(
            &[OpType::KeyHandler as u8, self.focus as u8],
            [Ref::Handler(self.key)],
        );
    }

    pub fn decode(op: &EncodedOp<'_>) -> Result<Self, OpsError> {
        let d = record(op, OpType::KeyHandler)?;
        Ok(Self {
            key: handler_ref(op, 0)?,
            focus: d[1] != 0,
        })
    }
}

/// Ask the platform to hide its soft keyboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct HideInputOp;

impl HideInputOp {
    pub fn add(&self, ops: &mut Ops) {
        ops.write(&[OpType::HideInput as u8], []);
    }
}

// =============================================================================
// Frame Scheduling Ops
// =============================================================================

/// Request another frame, at `at` or immediately when `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvalidateOp {
    pub at: Option<SystemTime>,
}

impl InvalidateOp {
    pub fn at(at: SystemTime) -> Self {
        Self { at: Some(at) }
    }

    pub fn add(&self, ops: &mut Ops) {
        // Times at or before the epoch encode as zero, i.e. immediately.
        let nanos = self
            .at
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        let mut data = [0u8; 9];
        data[0] = OpType::Invalidate as u8;
        data[1..9].copy_from_slice(&nanos.to_le_bytes());
        ops.write(&data, []);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Result<Self, OpsError> {
        let d = record(op, OpType::Invalidate)?;
        let mut nanos = [0u8; 8];
        nanos.copy_from_slice(&d[1..9]);
        let at = match u64::from_le_bytes(nanos) {
            0 => None,
            n => Some(UNIX_EPOCH + Duration::from_nanos(n)),
        };
        Ok(Self { at })
    }
}

/// Ask for a [`crate::event::ProfileEvent`] every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileOp {
    pub key: HandlerId,
}

impl ProfileOp {
    pub fn add(&self, ops: &mut Ops) {
        ops.write(&[OpType::Profile as u8], [Ref::Handler(self.key)]);
    }

    pub fn decode(op: &EncodedOp<'_>) -> Result<Self, OpsError> {
        record(op, OpType::Profile)?;
        Ok(Self {
            key: handler_ref(op, 0)?,
        })
    }
}
