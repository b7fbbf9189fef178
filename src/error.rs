//! Error types for spark-input.
//!
//! Only the operation stream can fail. It is produced by the layout pass, so
//! every variant here means the producer has a bug: a frame that hits one is
//! discarded and the error is handed back to the host loop.

use thiserror::Error;

use crate::ops::OpType;

/// A malformed record in an operation stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OpsError {
    /// The tag byte names no known op.
    #[error("unknown op tag {tag:#04x} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// Fewer payload bytes remain than the op's fixed size.
    #[error("truncated {op:?} op at offset {offset}: need {need} bytes, have {have}")]
    Truncated {
        op: OpType,
        offset: usize,
        need: usize,
        have: usize,
    },

    /// The side table ran out of references for this op.
    #[error("{op:?} op at offset {offset} needs {need} refs, {have} left")]
    MissingRef {
        op: OpType,
        offset: usize,
        need: usize,
        have: usize,
    },

    /// A typed decoder was handed a record of another kind.
    #[error("expected {expected:?} op, found tag {found:#04x}")]
    TagMismatch { expected: OpType, found: u8 },

    /// A reference resolved to the wrong kind of value.
    #[error("{op:?} op expected a {expected} ref in slot {slot}")]
    RefType {
        op: OpType,
        slot: usize,
        expected: &'static str,
    },

    /// A Pop with no matching Push.
    #[error("pop without matching push at offset {offset}")]
    StackUnderflow { offset: usize },
}

/// Errors surfaced by [`crate::Router`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The frame's operation stream could not be decoded.
    #[error("operation stream rejected: {0}")]
    Ops(#[from] OpsError),
}
