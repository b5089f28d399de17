//! Single-pass structural parser for menu markup.
//!
//! Scans the source once, maintaining a stack of open elements, and pushes
//! nodes into the arena in document order. Attribute directive extraction
//! happens inline per element, so a malformed directive surfaces with the
//! line of the element that declared it and no partial tree escapes.

use std::collections::HashSet;

use crate::types::NodeId;

use super::directive;
use super::{NodeKind, TemplateError, TemplateNode};

/// Parse markup into the node arena plus the root list.
pub(super) fn parse(markup: &str) -> Result<(Vec<TemplateNode>, Vec<NodeId>), TemplateError> {
    Parser::new(markup).run()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    nodes: Vec<TemplateNode>,
    roots: Vec<NodeId>,
    /// Open elements: (arena index, tag, line opened).
    stack: Vec<(NodeId, String, u32)>,
    seen_ids: HashSet<String>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            nodes: Vec::new(),
            roots: Vec::new(),
            stack: Vec::new(),
            seen_ids: HashSet::new(),
        }
    }

    fn run(mut self) -> Result<(Vec<TemplateNode>, Vec<NodeId>), TemplateError> {
        loop {
            self.consume_text()?;
            if self.at_end() {
                break;
            }
            if self.try_consume("<!--") {
                self.consume_comment()?;
            } else if self.try_consume("</") {
                self.consume_closing_tag()?;
            } else {
                // consume_text stopped at '<'
                self.pos += 1;
                self.consume_element()?;
            }
        }

        if let Some((_, tag, line)) = self.stack.pop() {
            return Err(TemplateError::UnclosedElement { tag, line });
        }
        Ok((self.nodes, self.roots))
    }

    // =========================================================================
    // Node construction
    // =========================================================================

    fn attach(&mut self, node: NodeId) {
        match self.stack.last() {
            Some(&(parent, _, _)) => self.nodes[parent].children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Text between tags. Whitespace-only runs (indentation) are dropped;
    /// interior spacing of real text is preserved.
    fn consume_text(&mut self) -> Result<(), TemplateError> {
        let start = self.pos;
        let start_line = self.line;
        while let Some(b) = self.peek() {
            if b == b'<' {
                break;
            }
            self.bump();
        }
        let text = self.src[start..self.pos].trim();
        if text.is_empty() {
            return Ok(());
        }
        let segments = directive::segment_text(text, start_line)?;
        let node = self.nodes.len();
        self.nodes.push(TemplateNode {
            kind: NodeKind::Text(segments),
            id: None,
            attrs: Vec::new(),
            children: Vec::new(),
            directives: Default::default(),
        });
        self.attach(node);
        Ok(())
    }

    fn consume_comment(&mut self) -> Result<(), TemplateError> {
        loop {
            if self.at_end() {
                return Err(TemplateError::UnexpectedEof { line: self.line });
            }
            if self.try_consume("-->") {
                return Ok(());
            }
            self.bump();
        }
    }

    fn consume_closing_tag(&mut self) -> Result<(), TemplateError> {
        self.skip_whitespace();
        let found = self.read_name();
        if found.is_empty() {
            return Err(TemplateError::MalformedTag {
                line: self.line,
                reason: "expected tag name after `</`",
            });
        }
        self.skip_whitespace();
        if !self.try_consume(">") {
            return Err(TemplateError::MalformedTag {
                line: self.line,
                reason: "expected `>` to end closing tag",
            });
        }
        match self.stack.pop() {
            None => Err(TemplateError::UnexpectedClosingTag {
                found,
                line: self.line,
            }),
            Some((_, expected, _)) if expected != found => {
                Err(TemplateError::MismatchedClosingTag {
                    expected,
                    found,
                    line: self.line,
                })
            }
            Some(_) => Ok(()),
        }
    }

    fn consume_element(&mut self) -> Result<(), TemplateError> {
        let open_line = self.line;
        let tag = self.read_name();
        if tag.is_empty() {
            return Err(TemplateError::MalformedTag {
                line: open_line,
                reason: "expected tag name after `<`",
            });
        }

        let mut raw_attrs: Vec<(String, String)> = Vec::new();
        let self_closing = loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(TemplateError::UnexpectedEof { line: self.line }),
                Some(b'>') => {
                    self.bump();
                    break false;
                }
                Some(b'/') => {
                    self.bump();
                    if !self.try_consume(">") {
                        return Err(TemplateError::MalformedTag {
                            line: self.line,
                            reason: "expected `>` after `/`",
                        });
                    }
                    break true;
                }
                Some(_) => {
                    let (name, value) = self.read_attribute()?;
                    raw_attrs.push((name, value));
                }
            }
        };

        let extracted = directive::extract(raw_attrs, open_line)?;
        if let Some(id) = &extracted.id {
            if !self.seen_ids.insert(id.clone()) {
                return Err(TemplateError::DuplicateId {
                    id: id.clone(),
                    line: open_line,
                });
            }
        }

        let node = self.nodes.len();
        self.nodes.push(TemplateNode {
            kind: NodeKind::Element(tag.clone()),
            id: extracted.id,
            attrs: extracted.attrs,
            children: Vec::new(),
            directives: extracted.directives,
        });
        self.attach(node);
        if !self_closing {
            self.stack.push((node, tag, open_line));
        }
        Ok(())
    }

    fn read_attribute(&mut self) -> Result<(String, String), TemplateError> {
        let name = self.read_name();
        if name.is_empty() {
            return Err(TemplateError::MalformedTag {
                line: self.line,
                reason: "expected attribute name",
            });
        }
        self.skip_whitespace();
        if !self.try_consume("=") {
            // Bare attribute, e.g. `disabled`
            return Ok((name, String::new()));
        }
        self.skip_whitespace();
        if !self.try_consume("\"") {
            return Err(TemplateError::MalformedTag {
                line: self.line,
                reason: "attribute value must be double-quoted",
            });
        }
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(TemplateError::UnexpectedEof { line: self.line }),
                Some(b'"') => break,
                Some(_) => self.bump(),
            }
        }
        let value = self.src[start..self.pos].to_string();
        self.bump(); // closing quote
        Ok((name, value))
    }

    // =========================================================================
    // Low-level scanning
    // =========================================================================

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        if let Some(b) = self.peek() {
            if b == b'\n' {
                self.line += 1;
            }
            // Step a whole UTF-8 sequence so slices stay on char boundaries.
            let mut next = self.pos + 1;
            while next < self.src.len() && !self.src.is_char_boundary(next) {
                next += 1;
            }
            self.pos = next;
        }
    }

    fn try_consume(&mut self, expected: &str) -> bool {
        if self.src[self.pos..].starts_with(expected) {
            for _ in 0..expected.len() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Tag and attribute names: `[A-Za-z_][A-Za-z0-9_-]*`.
    fn read_name(&mut self) -> String {
        let start = self.pos;
        let mut first = true;
        while let Some(b) = self.peek() {
            let ok = if first {
                b.is_ascii_alphabetic() || b == b'_'
            } else {
                b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
            };
            if !ok {
                break;
            }
            first = false;
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::super::{NodeKind, Template, TemplateError, TextSegment};

    #[test]
    fn test_parse_nested_elements() {
        let t = Template::compile("<menu><row><label>Audio</label></row></menu>").unwrap();
        assert_eq!(t.roots().len(), 1);
        let menu = t.node(t.roots()[0]);
        assert_eq!(menu.tag(), Some("menu"));
        assert_eq!(menu.children.len(), 1);
        let row = t.node(menu.children[0]);
        assert_eq!(row.tag(), Some("row"));
        let label = t.node(row.children[0]);
        assert_eq!(label.children.len(), 1);
        assert!(matches!(t.node(label.children[0]).kind, NodeKind::Text(_)));
    }

    #[test]
    fn test_parse_self_closing_and_bare_attribute() {
        let t = Template::compile(r#"<slider disabled data-value="bgm_volume" />"#).unwrap();
        let slider = t.node(t.roots()[0]);
        assert_eq!(slider.attr("disabled"), Some(""));
        assert_eq!(
            slider.directives.value_binding.as_deref(),
            Some("bgm_volume")
        );
    }

    #[test]
    fn test_parse_comment_is_skipped() {
        let t = Template::compile("<menu><!-- audio section --><label>A</label></menu>").unwrap();
        let menu = t.node(t.roots()[0]);
        assert_eq!(menu.children.len(), 1);
    }

    #[test]
    fn test_text_interpolation_segments() {
        let t = Template::compile("<label>BGM {{bgm_volume}}%</label>").unwrap();
        let label = t.node(t.roots()[0]);
        let text = t.node(label.children[0]);
        match &text.kind {
            NodeKind::Text(segments) => assert_eq!(
                segments,
                &vec![
                    TextSegment::Literal("BGM ".into()),
                    TextSegment::Key("bgm_volume".into()),
                    TextSegment::Literal("%".into()),
                ]
            ),
            other => panic!("expected text node, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let t = Template::compile("<menu>\n    <label>A</label>\n</menu>").unwrap();
        let menu = t.node(t.roots()[0]);
        assert_eq!(menu.children.len(), 1, "indentation must not become nodes");
    }

    #[test]
    fn test_multiple_roots() {
        let t = Template::compile("<a></a><b></b>").unwrap();
        assert_eq!(t.roots().len(), 2);
    }

    #[test]
    fn test_unbalanced_tags_are_fatal() {
        assert!(matches!(
            Template::compile("<menu><label>A</menu>"),
            Err(TemplateError::MismatchedClosingTag { .. })
        ));
        assert!(matches!(
            Template::compile("<menu>"),
            Err(TemplateError::UnclosedElement { .. })
        ));
        assert!(matches!(
            Template::compile("</menu>"),
            Err(TemplateError::UnexpectedClosingTag { .. })
        ));
    }

    #[test]
    fn test_error_carries_line_number() {
        let err = Template::compile("<menu>\n<label>\n").unwrap_err();
        match err {
            TemplateError::UnclosedElement { tag, line } => {
                assert_eq!(tag, "label");
                assert_eq!(line, 2);
            }
            other => panic!("expected UnclosedElement, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        assert!(matches!(
            Template::compile(r#"<a id="x"></a><b id="x"></b>"#),
            Err(TemplateError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_unterminated_attribute_value() {
        assert!(matches!(
            Template::compile(r#"<a id="x></a>"#),
            Err(TemplateError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_unterminated_comment() {
        assert!(matches!(
            Template::compile("<menu><!-- oops"),
            Err(TemplateError::UnexpectedEof { .. })
        ));
    }
}
