//! Template Compiler - markup to immutable node tree.
//!
//! Compilation runs once at screen load and is pure: identical markup always
//! yields a structurally identical tree. The tree is arena-backed: nodes
//! live in a `Vec` indexed by [`NodeId`] in document order, children are
//! index lists, and directional navigation is resolved once into an
//! adjacency table so traversal never re-parses presentation data.
//!
//! Only compilation can fail; everything downstream degrades gracefully.

mod directive;
mod parser;

use std::collections::HashMap;

use thiserror::Error;

use crate::expr::ExprSyntaxError;
use crate::types::{Direction, NodeId};

pub use directive::{CallExpr, CheckedBinding, Directives, TextSegment};

// =============================================================================
// Errors
// =============================================================================

/// Rejection of a malformed template. Fatal to the screen being compiled;
/// no partial tree is ever returned.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unexpected end of input at line {line}")]
    UnexpectedEof { line: u32 },

    #[error("malformed tag at line {line}: {reason}")]
    MalformedTag { line: u32, reason: &'static str },

    #[error("closing tag </{found}> at line {line} does not match <{expected}>")]
    MismatchedClosingTag {
        expected: String,
        found: String,
        line: u32,
    },

    #[error("closing tag </{found}> at line {line} has no matching opening tag")]
    UnexpectedClosingTag { found: String, line: u32 },

    #[error("element <{tag}> opened at line {line} is never closed")]
    UnclosedElement { tag: String, line: u32 },

    #[error("duplicate element id `{id}` at line {line}")]
    DuplicateId { id: String, line: u32 },

    #[error("unknown directive `{name}` at line {line}")]
    UnknownDirective { name: String, line: u32 },

    #[error("malformed interpolation in text at line {line}")]
    MalformedInterpolation { line: u32 },

    #[error("invalid conditional at line {line}: {source}")]
    InvalidConditional {
        line: u32,
        #[source]
        source: ExprSyntaxError,
    },

    #[error("invalid handler call `{text}` at line {line}: {reason}")]
    InvalidCall {
        text: String,
        line: u32,
        reason: &'static str,
    },

    #[error("`data-checked` at line {line} requires a `{missing}` attribute")]
    IncompleteCheckedBinding { line: u32, missing: &'static str },

    #[error("`{name}` at line {line} must not be empty")]
    EmptyDirective { name: &'static str, line: u32 },
}

// =============================================================================
// Tree
// =============================================================================

/// What a node is: an element with a tag, or a run of text content.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(String),
    Text(Vec<TextSegment>),
}

/// One compiled node. Created at compile time; immutable thereafter. The
/// directives never change, only the state they reference does.
#[derive(Debug, Clone)]
pub struct TemplateNode {
    pub kind: NodeKind,
    /// Markup `id`, when present. Identities are unique per template.
    pub id: Option<String>,
    /// Unrecognized attributes, preserved verbatim as presentation data.
    pub attrs: Vec<(String, String)>,
    pub children: Vec<NodeId>,
    pub directives: Directives,
}

impl TemplateNode {
    /// Tag name for elements, `None` for text runs.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Look up a preserved presentation attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A compiled template: arena of nodes plus the indices resolved from it.
#[derive(Debug)]
pub struct Template {
    nodes: Vec<TemplateNode>,
    roots: Vec<NodeId>,
    /// Per-node directional neighbors, `Direction::slot()` order. Dangling
    /// targets resolve to `None` and are inert at traversal time.
    nav: Vec<[Option<NodeId>; 4]>,
    ids: HashMap<String, NodeId>,
    /// Focusable nodes in document order.
    focusables: Vec<NodeId>,
}

impl Template {
    /// Compile markup into a template. The only fallible step in a screen's
    /// lifetime.
    pub fn compile(markup: &str) -> Result<Template, TemplateError> {
        let (nodes, roots) = parser::parse(markup)?;

        let mut ids = HashMap::new();
        for (index, node) in nodes.iter().enumerate() {
            if let Some(id) = &node.id {
                ids.insert(id.clone(), index);
            }
        }

        // Resolve style-declared targets into the adjacency table once.
        let nav = nodes
            .iter()
            .map(|node| {
                let mut edges = [None; 4];
                for dir in Direction::ALL {
                    edges[dir.slot()] = node.directives.nav_targets[dir.slot()]
                        .as_ref()
                        .and_then(|target| ids.get(target).copied());
                }
                edges
            })
            .collect();

        let focusables = (0..nodes.len())
            .filter(|&index| is_focusable(&nodes[index]))
            .collect();

        Ok(Template {
            nodes,
            roots,
            nav,
            ids,
            focusables,
        })
    }

    pub fn node(&self, id: NodeId) -> &TemplateNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level nodes in document order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Resolve a markup id to its node.
    pub fn node_by_name(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Directional neighbor, if the template declares one and it resolved.
    pub fn neighbor(&self, node: NodeId, direction: Direction) -> Option<NodeId> {
        self.nav[node][direction.slot()]
    }

    /// Focusable nodes in document order.
    pub fn focusables(&self) -> &[NodeId] {
        &self.focusables
    }

    pub fn is_focusable(&self, node: NodeId) -> bool {
        is_focusable(&self.nodes[node])
    }
}

/// A node can take focus when it has an identity and participates in
/// navigation or two-way binding.
fn is_focusable(node: &TemplateNode) -> bool {
    node.id.is_some()
        && (node.directives.value_binding.is_some()
            || node.directives.checked_binding.is_some()
            || node.directives.nav_targets.iter().any(Option::is_some))
}
