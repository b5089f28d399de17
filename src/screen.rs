//! Screen - one compiled menu and everything it owns.
//!
//! A [`Screen`] ties the pieces together: the compiled template, its state
//! store, focus/hover state and the host's handler table. The host drives it
//! once per frame through [`Screen::advance`], which fixes the cycle order
//! the rest of the crate assumes:
//!
//! 1. dispatch host events (arrival order) and apply handler mutations
//! 2. recompute visibility and bindings
//! 3. hand the finished [`Frame`] back for drawing
//!
//! Screens are plain owned values. Dropping one tears the template and the
//! store down together, between frames, with no partial state observable;
//! other screens are unaffected.

use std::collections::HashSet;

use crate::events::{dispatch, HandlerTable, UiEvent};
use crate::render::{render, Frame};
use crate::state::{FocusState, StateStore};
use crate::template::{Template, TemplateError};
use crate::types::{EventKind, NodeId, Value};

pub struct Screen {
    template: Template,
    store: StateStore,
    handlers: HandlerTable,
    focus: FocusState,
    /// Visible set from the last render pass. Navigation consults this, so
    /// directional input only becomes effective after the first frame.
    visible: HashSet<NodeId>,
    entered: bool,
    rendered: bool,
}

impl Screen {
    /// Compile a screen from markup. The handler table is taken up front so
    /// dispatch never races registration; compilation is the only step here
    /// that can fail.
    pub fn new(markup: &str, handlers: HandlerTable) -> Result<Self, TemplateError> {
        let template = Template::compile(markup)?;
        tracing::debug!(nodes = template.len(), "menu screen compiled");
        Ok(Self {
            template,
            store: StateStore::new(),
            handlers,
            focus: FocusState::new(),
            visible: HashSet::new(),
            entered: false,
            rendered: false,
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Mutable store access for host seeding before the first frame and
    /// persistence reads after the last.
    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    /// Markup id of the focused node, if any.
    pub fn focused_id(&self) -> Option<&str> {
        self.focus
            .focused()
            .and_then(|node| self.template.node(node).id.as_deref())
    }

    /// Host override for entry focus. Replaces the default document-order
    /// choice and emits the usual focus-loss/focus-gain bindings.
    pub fn focus_on(&mut self, name: &str) -> bool {
        let Some(node) = self.template.node_by_name(name) else {
            return false;
        };
        if !self.template.is_focusable(node) {
            return false;
        }
        self.entered = true;
        if let Some(change) = self.focus.focus_on(node) {
            self.emit_focus_events(change.from, change.to);
        }
        true
    }

    /// Run one update cycle: dispatch `events` in arrival order, then
    /// recompute the frame. Handler mutations made while dispatching are
    /// visible to this same cycle's render.
    pub fn advance(&mut self, events: &[UiEvent]) -> Frame {
        if !self.entered {
            self.enter();
        }
        for event in events {
            self.apply(event);
        }
        let frame = render(&self.template, &self.store, &self.focus);
        self.visible = frame.visible_set().clone();
        self.rendered = true;
        frame
    }

    /// Screen entry: default focus goes to the first focusable node in
    /// document order, announced through its focus-gain binding.
    fn enter(&mut self) {
        self.entered = true;
        if self.focus.focused().is_none() {
            if let Some(first) = FocusState::initial(&self.template) {
                self.focus.focus_on(first);
                self.emit_focus_events(None, first);
            }
        }
    }

    fn apply(&mut self, event: &UiEvent) {
        // An excluded node produces no bindings: once a frame exists, events
        // aimed at nodes outside its visible set are dropped.
        let target = match event {
            UiEvent::HoverEnter(node)
            | UiEvent::HoverLeave(node)
            | UiEvent::ValueChanged(node, _) => Some(*node),
            UiEvent::Direction(_) => None,
        };
        if let Some(node) = target {
            if self.rendered && !self.visible.contains(&node) {
                tracing::debug!(node, "event on excluded node dropped");
                return;
            }
        }

        match event {
            UiEvent::HoverEnter(node) => {
                self.focus.set_hovered(Some(*node));
                self.dispatch_logged(*node, EventKind::HoverEnter);
            }
            UiEvent::HoverLeave(node) => {
                if self.focus.hovered() == Some(*node) {
                    self.focus.set_hovered(None);
                }
                self.dispatch_logged(*node, EventKind::HoverLeave);
            }
            UiEvent::ValueChanged(node, value) => {
                self.write_back(*node, value);
                self.dispatch_logged(*node, EventKind::ValueChanged);
            }
            UiEvent::Direction(direction) => {
                if let Some(change) = self.focus.step(&self.template, &self.visible, *direction) {
                    tracing::debug!(from = ?change.from, to = change.to, "focus moved");
                    self.emit_focus_events(change.from, change.to);
                }
            }
        }
    }

    /// Two-way write-back, ahead of the node's value-changed binding so the
    /// handler observes the fresh value.
    fn write_back(&mut self, node: NodeId, value: &Value) {
        let directives = &self.template.node(node).directives;
        if let Some(key) = &directives.value_binding {
            self.store.set(key.clone(), value.clone());
        } else if let Some(cb) = &directives.checked_binding {
            // Selecting a radio member writes its literal; there is no
            // separate uncheck operation.
            if value.is_truthy() {
                self.store.set(cb.key.clone(), cb.literal.clone());
            }
        }
    }

    fn emit_focus_events(&mut self, from: Option<NodeId>, to: NodeId) {
        if let Some(old) = from {
            self.dispatch_logged(old, EventKind::FocusLoss);
        }
        self.dispatch_logged(to, EventKind::FocusGain);
    }

    fn dispatch_logged(&mut self, node: NodeId, kind: EventKind) {
        if let Err(err) = dispatch(
            &self.template,
            node,
            kind,
            &mut self.handlers,
            &mut self.store,
        ) {
            tracing::warn!(node, kind = kind.name(), %err, "event dropped");
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        tracing::debug!("menu screen torn down");
    }
}
