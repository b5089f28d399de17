//! Binding Renderer - per-frame full recompute of the visible tree.
//!
//! Walks the compiled template once per update cycle and resolves everything
//! the host needs to draw: which nodes are visible, interpolated text,
//! two-way binding values, derived radio checked state, and focus/hover
//! flags. There is no observer graph and no incremental patching: the walk
//! is a pure function of (template, store, focus), so re-running it with
//! unchanged inputs reproduces an identical [`Frame`].
//!
//! Evaluation failures never escape: a conditional that fails to evaluate
//! excludes its subtree, an interpolation that fails renders empty, and both
//! are logged.

use std::collections::HashSet;

use crate::expr;
use crate::state::{FocusState, StateStore};
use crate::template::{NodeKind, Template, TextSegment};
use crate::types::{NodeId, Value};

// =============================================================================
// Output
// =============================================================================

/// A two-way binding as rendered this frame: the bound key and the store's
/// current value for it. A key that was never written renders as the
/// documented `""` default.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    pub key: String,
    pub value: Value,
}

/// One visible node with everything resolved for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNode {
    pub node: NodeId,
    /// Markup id, when the node has one.
    pub id: Option<String>,
    /// Element tag; `None` for text runs.
    pub tag: Option<String>,
    /// Resolved text for text runs (interpolation applied).
    pub text: Option<String>,
    /// Two-way binding, when the node declares one.
    pub binding: Option<BoundValue>,
    /// Derived radio state: `Some(true)` iff the store value equals this
    /// member's literal. `None` for nodes without a checked binding.
    pub checked: Option<bool>,
    pub focused: bool,
    pub hovered: bool,
}

/// Result of one render pass: visible nodes in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    nodes: Vec<RenderedNode>,
    visible: HashSet<NodeId>,
}

impl Frame {
    /// Visible nodes in document order.
    pub fn nodes(&self) -> &[RenderedNode] {
        &self.nodes
    }

    pub fn is_visible(&self, node: NodeId) -> bool {
        self.visible.contains(&node)
    }

    /// The visible-id set, as consumed by navigation.
    pub fn visible_set(&self) -> &HashSet<NodeId> {
        &self.visible
    }

    /// Find a visible node by markup id.
    pub fn by_name(&self, id: &str) -> Option<&RenderedNode> {
        self.nodes.iter().find(|n| n.id.as_deref() == Some(id))
    }
}

// =============================================================================
// Render walk
// =============================================================================

/// Recompute the visible node set against the current store snapshot.
pub fn render(template: &Template, store: &StateStore, focus: &FocusState) -> Frame {
    let mut frame = Frame {
        nodes: Vec::new(),
        visible: HashSet::new(),
    };
    for &root in template.roots() {
        visit(template, store, focus, root, &mut frame);
    }
    frame
}

fn visit(
    template: &Template,
    store: &StateStore,
    focus: &FocusState,
    node: NodeId,
    frame: &mut Frame,
) {
    let tnode = template.node(node);

    // A false (or failing) conditional excludes the whole subtree: no text,
    // no bindings, no navigation presence.
    if let Some(cond) = &tnode.directives.conditional {
        match cond.eval_bool(store) {
            Ok(true) => {}
            Ok(false) => return,
            Err(err) => {
                tracing::warn!(node, %err, "conditional failed to evaluate, excluding node");
                return;
            }
        }
    }

    frame.visible.insert(node);

    let (tag, text) = match &tnode.kind {
        NodeKind::Element(tag) => (Some(tag.clone()), None),
        NodeKind::Text(segments) => (None, Some(resolve_text(segments, store))),
    };

    let binding = tnode.directives.value_binding.as_ref().map(|key| BoundValue {
        key: key.clone(),
        value: store
            .get(key)
            .cloned()
            .unwrap_or_else(|| Value::Str(String::new())),
    });

    let checked = tnode
        .directives
        .checked_binding
        .as_ref()
        .map(|cb| store.get(&cb.key).is_some_and(|v| *v == cb.literal));

    frame.nodes.push(RenderedNode {
        node,
        id: tnode.id.clone(),
        tag,
        text,
        binding,
        checked,
        focused: focus.focused() == Some(node),
        hovered: focus.hovered() == Some(node),
    });

    for &child in &tnode.children {
        visit(template, store, focus, child, frame);
    }
}

/// Resolve interpolation segments against the store. Failures render empty.
fn resolve_text(segments: &[TextSegment], store: &StateStore) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            TextSegment::Literal(s) => out.push_str(s),
            TextSegment::Key(key) => match expr::display(store, key) {
                Ok(s) => out.push_str(&s),
                Err(err) => {
                    tracing::warn!(key = %key, %err, "interpolation failed, rendering empty");
                }
            },
        }
    }
    out
}
