//! Directive extraction - typed instructions from raw attributes.
//!
//! Recognized directives all live under the `data-` prefix (`data-if`,
//! `data-value`, `data-checked`, `data-event-<kind>`), plus `nav-*`
//! declarations embedded in `style`. Anything else is opaque presentation
//! data and survives untouched: forward compatibility means ignoring what
//! we don't understand, and only rejecting what claims to be a directive
//! but isn't one.

use crate::expr::{self, Expr};
use crate::types::{Direction, EventKind, EventMask, Value};

use super::TemplateError;

// =============================================================================
// Types
// =============================================================================

/// Compiled directive set of a single node.
#[derive(Debug, Clone, Default)]
pub struct Directives {
    /// `data-if`: subtree excluded entirely while this evaluates false.
    pub conditional: Option<Expr>,
    /// `data-value`: two-way binding to a state key.
    pub value_binding: Option<String>,
    /// `data-checked`: radio-group membership.
    pub checked_binding: Option<CheckedBinding>,
    /// `data-event-<kind>` bindings, in attribute order.
    pub events: Vec<(EventKind, CallExpr)>,
    /// Union of declared event kinds.
    pub event_mask: EventMask,
    /// Raw `nav-*` targets in `Direction::slot()` order, resolved into the
    /// template's adjacency table after the whole tree is known.
    pub(crate) nav_targets: [Option<String>; 4],
}

impl Directives {
    /// Find the call bound to an event kind.
    pub fn event_binding(&self, kind: EventKind) -> Option<&CallExpr> {
        if !self.event_mask.contains(kind.mask()) {
            return None;
        }
        self.events
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, call)| call)
    }
}

/// Radio-group membership: writing `literal` into `key` checks this member
/// and, by derivation, un-checks every sibling sharing the key.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckedBinding {
    pub key: String,
    pub group: String,
    pub literal: Value,
}

/// A handler invocation: name plus literal arguments, both fixed at compile
/// time. Arguments never read state; that is what distinguishes handler
/// calls from conditionals and interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Value>,
}

/// One piece of a text run: literal markup text or a `{{key}}` marker.
#[derive(Debug, Clone, PartialEq)]
pub enum TextSegment {
    Literal(String),
    Key(String),
}

/// Attributes of one element after directive extraction.
#[derive(Debug)]
pub(super) struct Extracted {
    pub id: Option<String>,
    pub attrs: Vec<(String, String)>,
    pub directives: Directives,
}

// =============================================================================
// Extraction
// =============================================================================

/// Split an element's raw attributes into identity, directives and preserved
/// presentation data.
pub(super) fn extract(
    raw: Vec<(String, String)>,
    line: u32,
) -> Result<Extracted, TemplateError> {
    let mut id = None;
    let mut attrs = Vec::new();
    let mut directives = Directives::default();
    let mut checked_key: Option<String> = None;

    for (name, value) in &raw {
        match name.as_str() {
            "id" => id = Some(value.clone()),
            "data-if" => {
                let parsed = expr::parse(value)
                    .map_err(|source| TemplateError::InvalidConditional { line, source })?;
                directives.conditional = Some(parsed);
            }
            "data-value" => {
                if value.is_empty() {
                    return Err(TemplateError::EmptyDirective {
                        name: "data-value",
                        line,
                    });
                }
                directives.value_binding = Some(value.clone());
            }
            "data-checked" => {
                if value.is_empty() {
                    return Err(TemplateError::EmptyDirective {
                        name: "data-checked",
                        line,
                    });
                }
                checked_key = Some(value.clone());
            }
            "style" => {
                let kept = split_style(value, &mut directives.nav_targets);
                if !kept.is_empty() {
                    attrs.push((name.clone(), kept));
                }
            }
            _ => {
                if let Some(kind_name) = name.strip_prefix("data-event-") {
                    let kind = EventKind::from_name(kind_name).ok_or_else(|| {
                        TemplateError::UnknownDirective {
                            name: name.clone(),
                            line,
                        }
                    })?;
                    let call = parse_call(value, line)?;
                    directives.event_mask |= kind.mask();
                    directives.events.push((kind, call));
                } else if name.starts_with("data-") {
                    return Err(TemplateError::UnknownDirective {
                        name: name.clone(),
                        line,
                    });
                } else {
                    attrs.push((name.clone(), value.clone()));
                }
            }
        }
    }

    // A checked binding needs the group name and the member literal, which
    // ride on the plain `name`/`value` attributes.
    if let Some(key) = checked_key {
        let group = raw
            .iter()
            .find(|(n, _)| n == "name")
            .map(|(_, v)| v.clone())
            .ok_or(TemplateError::IncompleteCheckedBinding {
                line,
                missing: "name",
            })?;
        let literal = raw
            .iter()
            .find(|(n, _)| n == "value")
            .map(|(_, v)| coerce_literal(v))
            .ok_or(TemplateError::IncompleteCheckedBinding {
                line,
                missing: "value",
            })?;
        directives.checked_binding = Some(CheckedBinding {
            key,
            group,
            literal,
        });
    }

    Ok(Extracted {
        id,
        attrs,
        directives,
    })
}

/// Pull `nav-*` declarations out of a style string, returning what's left.
///
/// Target syntax is `#id`; a missing `#` is tolerated. Unknown properties
/// are presentation data and stay in the style verbatim.
fn split_style(style: &str, nav: &mut [Option<String>; 4]) -> String {
    let mut kept = Vec::new();
    for decl in style.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((prop, value)) = decl.split_once(':') else {
            kept.push(decl.to_string());
            continue;
        };
        match Direction::from_nav_property(prop.trim()) {
            Some(direction) => {
                let target = value.trim().trim_start_matches('#');
                if !target.is_empty() {
                    nav[direction.slot()] = Some(target.to_string());
                }
            }
            None => kept.push(decl.to_string()),
        }
    }
    kept.join("; ")
}

/// Coerce a bare attribute value into the literal it most plausibly is:
/// `true`/`false`, a number, or the string itself.
fn coerce_literal(value: &str) -> Value {
    match value {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = value.parse::<f64>() {
        if value.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-') {
            return Value::Number(n);
        }
    }
    Value::Str(value.to_string())
}

// =============================================================================
// Call expressions
// =============================================================================

/// Parse `name`, `name()` or `name(lit, lit, ...)`.
pub(super) fn parse_call(text: &str, line: u32) -> Result<CallExpr, TemplateError> {
    let fail = |reason: &'static str| TemplateError::InvalidCall {
        text: text.to_string(),
        line,
        reason,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(fail("empty handler call"));
    }

    let (name, rest) = match trimmed.find('(') {
        None => (trimmed, ""),
        Some(open) => {
            let inner = &trimmed[open + 1..];
            let close = inner.rfind(')').ok_or_else(|| fail("missing closing `)`"))?;
            if !inner[close + 1..].trim().is_empty() {
                return Err(fail("trailing input after `)`"));
            }
            (trimmed[..open].trim_end(), inner[..close].trim())
        }
    };

    if name.is_empty() || !is_ident(name) {
        return Err(fail("handler name must be an identifier"));
    }

    let mut args = Vec::new();
    if !rest.is_empty() {
        for piece in split_args(rest) {
            let piece = piece.trim();
            args.push(parse_arg(piece).ok_or_else(|| fail("arguments must be literals"))?);
        }
    }

    Ok(CallExpr {
        name: name.to_string(),
        args,
    })
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split on commas outside single quotes.
fn split_args(s: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_string = false;
    for (i, c) in s.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            ',' if !in_string => {
                pieces.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&s[start..]);
    pieces
}

/// A single literal argument: number or single-quoted string.
fn parse_arg(piece: &str) -> Option<Value> {
    if let Some(inner) = piece.strip_prefix('\'') {
        let inner = inner.strip_suffix('\'')?;
        if inner.contains('\'') {
            return None;
        }
        return Some(Value::Str(inner.to_string()));
    }
    piece.parse::<f64>().ok().map(Value::Number)
}

// =============================================================================
// Text interpolation
// =============================================================================

/// Split a text run into literal and `{{key}}` segments.
pub(super) fn segment_text(text: &str, line: u32) -> Result<Vec<TextSegment>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("{{") {
        if open > 0 {
            segments.push(TextSegment::Literal(rest[..open].to_string()));
        }
        let after = &rest[open + 2..];
        let close = after
            .find("}}")
            .ok_or(TemplateError::MalformedInterpolation { line })?;
        let key = after[..close].trim();
        if key.is_empty() || !is_ident(key) {
            return Err(TemplateError::MalformedInterpolation { line });
        }
        segments.push(TextSegment::Key(key.to_string()));
        rest = &after[close + 2..];
    }
    if !rest.is_empty() {
        segments.push(TextSegment::Literal(rest.to_string()));
    }
    Ok(segments)
}
