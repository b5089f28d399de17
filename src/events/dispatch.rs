//! Event Dispatcher - declared bindings to registered handlers.
//!
//! The host registers named handlers once, before the screen compiles its
//! template; templates reference them by name in `data-event-*` attributes.
//! Resolution happens at dispatch time, not compile time, so template
//! authoring never depends on registration order.
//!
//! A miss is [`DispatchError::UnboundHandler`]: the caller logs it and moves
//! on. One broken binding must never stall input processing for the rest of
//! the frame.

use std::collections::HashMap;

use thiserror::Error;

use crate::state::StateStore;
use crate::template::Template;
use crate::types::{Direction, EventKind, NodeId, Value};

// =============================================================================
// Types
// =============================================================================

/// A registered handler. Receives the screen's store and the call's
/// compile-time literal arguments; mutations land in the store and become
/// visible to the same cycle's render pass.
///
/// Handlers get the store and nothing else, so a handler cannot start a
/// nested render pass.
pub type Handler = Box<dyn FnMut(&mut StateStore, &[Value])>;

/// Host-supplied mapping from handler name to native callback.
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<String, Handler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a name. Re-registering replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl FnMut(&mut StateStore, &[Value]) + 'static,
    ) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("HandlerTable").field("names", &names).finish()
    }
}

/// Dispatch-time failure. Recovered by skipping the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no handler registered for `{0}`")]
    UnboundHandler(String),
}

/// A host-reported input signal, consumed in arrival order once per frame.
///
/// Focus-gain and focus-loss are engine-emitted by the navigation graph and
/// deliberately absent here.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    HoverEnter(NodeId),
    HoverLeave(NodeId),
    /// The user changed a two-way-bound control (drag, toggle, select).
    ValueChanged(NodeId, Value),
    Direction(Direction),
}

// =============================================================================
// Dispatch
// =============================================================================

/// Invoke the handler bound to `kind` on `node`, if the node declares one.
///
/// Returns `Ok(true)` when a handler ran, `Ok(false)` when the node has no
/// binding for this kind.
pub fn dispatch(
    template: &Template,
    node: NodeId,
    kind: EventKind,
    handlers: &mut HandlerTable,
    store: &mut StateStore,
) -> Result<bool, DispatchError> {
    let Some(call) = template.node(node).directives.event_binding(kind) else {
        return Ok(false);
    };
    let handler = handlers
        .handlers
        .get_mut(&call.name)
        .ok_or_else(|| DispatchError::UnboundHandler(call.name.clone()))?;
    tracing::trace!(node, kind = kind.name(), handler = %call.name, "dispatching event");
    handler(store, &call.args);
    Ok(true)
}
