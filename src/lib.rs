//! # spark-input
//!
//! Input routing core for SparkTUI.
//!
//! Every frame the layout pass describes *where input may land* by appending
//! operations to an [`Ops`] list: pointer hit areas, key handlers, focus
//! requests, wakeup requests. The [`Router`] reads that list, then routes
//! platform input (mouse, touch, keys, text edits) to the registered handlers,
//! which drain their events with [`Router::next`].
//!
//! ## Architecture
//!
//! ```text
//! layout pass ──► Ops ──► Router::frame
//!                              │
//! platform ──► Router::add ──► pointer queue (hit-test, grabs)
//!                         └──► key queue (focus, text input state)
//!                                  │
//!                        per-handler FIFO queues ──► Router::next
//! ```
//!
//! Handler identities are opaque [`HandlerId`]s chosen by the caller. The
//! router never calls back into widget code.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Point, HandlerId, Wakeup)
//! - [`ops`] - Operation stream encoding and reading
//! - [`pointer`] - Pointer events and hit areas
//! - [`key`] - Key, edit and focus events, text input state
//! - [`event`] - Events in and out of the router
//! - [`router`] - The router itself
//! - [`terminal`] - crossterm adapter producing router input

pub mod error;
pub mod event;
pub mod key;
pub mod ops;
pub mod pointer;
pub mod router;
pub mod terminal;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{OpsError, RouterError};

pub use event::{Event, InputEvent, ProfileEvent};

pub use key::{
    EditEvent, FocusEvent, KeyEvent, KeyState, Modifiers, TextInputState, TextInputVisibility,
};

pub use ops::{
    EncodedOp, HideInputOp, InvalidateOp, KeyHandlerOp, OpType, Ops, PointerHandlerOp, PopOp,
    ProfileOp, PushOp, Reader, Ref, TransformOp,
};

pub use pointer::{
    Area, EllipseArea, HitResult, Kind, PointerEvent, PointerId, Priority, Rect, RectArea, Source,
};

pub use router::Router;

pub use terminal::TerminalInput;
