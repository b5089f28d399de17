//! Focus System - directional navigation over the compiled adjacency table.
//!
//! Tracks which node holds focus and moves it along designer-authored
//! `nav-*` edges. Traversal is a single table lookup per input: no
//! wraparound, no fallback search. An absent or currently-invisible target
//! simply leaves focus where it is. Predictable beats clever here.
//!
//! Hover is an orthogonal signal tracked alongside focus: it never
//! participates in the focus state machine, it only feeds the same event
//! bindings.

use std::collections::HashSet;

use crate::template::Template;
use crate::types::{Direction, NodeId};

/// A completed focus move, for the caller to emit focus-loss/focus-gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChange {
    /// Previously focused node, if any.
    pub from: Option<NodeId>,
    /// Newly focused node.
    pub to: NodeId,
}

/// Focus and hover state of one screen. At most one node holds focus.
#[derive(Debug, Default)]
pub struct FocusState {
    focused: Option<NodeId>,
    hovered: Option<NodeId>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    /// Default entry focus: the first focusable node in document order.
    pub fn initial(template: &Template) -> Option<NodeId> {
        template.focusables().first().copied()
    }

    /// Move focus along the declared edge for `direction`.
    ///
    /// Focus moves only when the current node declares a neighbor there and
    /// that neighbor is in the currently visible set; otherwise the state is
    /// untouched and `None` is returned. Cycles among siblings are fine:
    /// each step is one lookup, so traversal always terminates.
    pub fn step(
        &mut self,
        template: &Template,
        visible: &HashSet<NodeId>,
        direction: Direction,
    ) -> Option<FocusChange> {
        let current = self.focused?;
        let target = template.neighbor(current, direction)?;
        if !visible.contains(&target) {
            tracing::debug!(node = target, ?direction, "nav target not visible, focus stays");
            return None;
        }
        if !template.is_focusable(target) {
            tracing::debug!(node = target, ?direction, "nav target not focusable, focus stays");
            return None;
        }
        self.focused = Some(target);
        Some(FocusChange {
            from: Some(current),
            to: target,
        })
    }

    /// Place focus on a specific node (screen entry or host override).
    ///
    /// Returns `None` when the node already holds focus.
    pub fn focus_on(&mut self, node: NodeId) -> Option<FocusChange> {
        if self.focused == Some(node) {
            return None;
        }
        let from = self.focused.replace(node);
        Some(FocusChange { from, to: node })
    }

    /// Track the hovered node (mouse-equivalent signal from the host).
    pub fn set_hovered(&mut self, node: Option<NodeId>) {
        self.hovered = node;
    }
}
