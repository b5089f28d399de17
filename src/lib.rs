//! # rivet-ui
//!
//! Reactive menu UI runtime for gamepad-navigable, data-driven screens.
//!
//! rivet-ui interprets declarative menu markup inside a host's real-time
//! frame loop: text interpolation, two-way value binding, conditional
//! rendering, event dispatch and directional focus navigation, with no
//! layout engine and no scripting language attached.
//!
//! ## Architecture
//!
//! Templates compile once at screen load into an immutable arena-backed
//! tree; everything per-frame is a full recompute rather than an observer
//! graph:
//! ```text
//! markup ──compile──▶ Template ─┐
//!                               ├─ dispatch events ─▶ StateStore ─▶ render ─▶ Frame
//! host input ──UiEvent──────────┘        (once per frame, in that order)
//! ```
//!
//! The host owns the loop: it seeds the [`StateStore`], registers handlers
//! in a [`HandlerTable`], feeds [`UiEvent`]s to [`Screen::advance`] each
//! frame, and draws the returned [`Frame`]. Only compilation can fail;
//! every post-compile error degrades gracefully and is logged via `tracing`.
//!
//! ## Modules
//!
//! - [`types`] - Core types (`Value`, `EventKind`, `Direction`, `NodeId`)
//! - [`template`] - Template compiler (markup → node tree + adjacency table)
//! - [`expr`] - Expression evaluator for conditionals and interpolation
//! - [`state`] - State store and focus/navigation state
//! - [`render`] - Per-frame binding renderer
//! - [`events`] - Event dispatch and host input adaptation
//! - [`screen`] - The per-screen façade the host drives

pub mod events;
pub mod expr;
pub mod render;
pub mod screen;
pub mod state;
pub mod template;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use template::{
    CallExpr, CheckedBinding, Directives, NodeKind, Template, TemplateError, TemplateNode,
    TextSegment,
};

pub use expr::{display, EvalError, Expr, ExprSyntaxError};

pub use state::{FocusChange, FocusState, StateStore};

pub use render::{render, BoundValue, Frame, RenderedNode};

pub use events::{
    dispatch, ButtonPad, Buttons, DispatchError, Handler, HandlerTable, UiEvent,
};

pub use screen::Screen;
