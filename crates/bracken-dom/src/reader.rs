//! Lenient HTML fragment reader.
//!
//! Builds an [`ElementTree`] out of an HTML-ish string. The hosting
//! application normally supplies the element tree itself (a browser DOM, a
//! proper HTML5 parser); this reader exists so the CLI and the round-trip
//! tests have a way to go from text to a tree without either.
//!
//! It is deliberately small and total: any input produces some tree.
//! Mismatched closing tags are matched against the nearest open ancestor or
//! ignored, comments and declarations are skipped, and a stray `<` is plain
//! text. No character-reference table beyond the entities the engine itself
//! emits, no CDATA, no foreign content.

use bracken_common::escape::unescape_entities;

use crate::{AttributeList, ElementTree, NodeId};

/// Elements that never have children and never take a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Parse an HTML fragment into an element tree. Never fails.
#[must_use]
pub fn parse_fragment(html: &str) -> ElementTree {
    Reader::new(html).run()
}

struct Reader<'a> {
    input: &'a str,
    pos: usize,
    tree: ElementTree,
    /// Stack of currently open elements; the fragment root sits at the bottom.
    stack: Vec<NodeId>,
}

impl<'a> Reader<'a> {
    fn new(input: &'a str) -> Self {
        let tree = ElementTree::new();
        let root = tree.root();
        Reader {
            input,
            pos: 0,
            tree,
            stack: vec![root],
        }
    }

    fn run(mut self) -> ElementTree {
        while self.pos < self.input.len() {
            if self.rest().starts_with('<') {
                self.read_markup();
            } else {
                self.read_text();
            }
        }
        self.tree
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn parent(&self) -> NodeId {
        *self.stack.last().unwrap_or(&NodeId::ROOT)
    }

    /// Consume a text run up to the next `<` and attach it as a text node.
    fn read_text(&mut self) {
        let rest = self.rest();
        let end = rest.find('<').unwrap_or(rest.len());
        let parent = self.parent();
        let _ = self.tree.text(parent, &unescape_entities(&rest[..end]));
        self.pos += end;
    }

    /// Consume one construct starting with `<`.
    fn read_markup(&mut self) {
        let rest = self.rest();
        if let Some(comment) = rest.strip_prefix("<!--") {
            // Comment: skip through the terminator (or everything, unterminated).
            self.pos += comment
                .find("-->")
                .map_or(rest.len(), |end| end + "<!--".len() + "-->".len());
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            // Declaration / processing instruction: skip through `>`.
            self.pos += rest.find('>').map_or(rest.len(), |end| end + 1);
        } else if let Some(close) = rest.strip_prefix("</") {
            self.read_closing_tag(close);
        } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            self.read_opening_tag();
        } else {
            // A `<` that opens nothing is literal text.
            let parent = self.parent();
            let _ = self.tree.text(parent, "<");
            self.pos += 1;
        }
    }

    fn read_closing_tag(&mut self, body: &str) {
        let end = body.find('>').unwrap_or(body.len());
        let name = body[..end].trim().to_ascii_lowercase();
        self.pos += "</".len() + end + usize::from(end < body.len());

        // Pop to the nearest matching open element; a close that matches
        // nothing is dropped. Index 0 is the fragment root and never pops.
        if let Some(depth) = self.stack[1..]
            .iter()
            .rposition(|&id| self.tree.as_element(id).is_some_and(|e| e.tag_name == name))
        {
            self.stack.truncate(depth + 1);
        }
    }

    fn read_opening_tag(&mut self) {
        let rest = self.rest();
        let body = &rest[1..];
        let name_len = body
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(body.len());
        let name = body[..name_len].to_ascii_lowercase();

        let mut cursor = 1 + name_len;
        let mut attrs = AttributeList::new();
        let mut self_closing = false;
        loop {
            let tail = &rest[cursor..];
            let trimmed = tail.trim_start();
            cursor += tail.len() - trimmed.len();
            if trimmed.is_empty() {
                break;
            }
            if let Some(after) = trimmed.strip_prefix("/>") {
                self_closing = true;
                cursor += trimmed.len() - after.len();
                break;
            }
            if let Some(after) = trimmed.strip_prefix('>') {
                cursor += trimmed.len() - after.len();
                break;
            }
            if let Some(after) = trimmed.strip_prefix('/') {
                cursor += trimmed.len() - after.len();
                continue;
            }
            cursor += Self::read_attribute(trimmed, &mut attrs);
        }
        self.pos += cursor;

        let parent = self.parent();
        let element = self.tree.element(parent, &name, attrs);
        if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            self.stack.push(element);
        }
    }

    /// Parse one `name` or `name=value` attribute at the start of `tail`;
    /// returns the number of bytes consumed.
    fn read_attribute(tail: &str, attrs: &mut AttributeList) -> usize {
        let name_len = tail
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(tail.len());
        if name_len == 0 {
            // An attribute must consume at least one byte or the tag loop stalls.
            return 1;
        }
        let name = tail[..name_len].to_ascii_lowercase();
        let mut cursor = name_len;

        let gap = tail[cursor..].len() - tail[cursor..].trim_start().len();
        if let Some(after_eq) = tail[cursor + gap..].strip_prefix('=') {
            cursor += gap + 1;
            let gap = after_eq.len() - after_eq.trim_start().len();
            cursor += gap;
            let (value, consumed) = Self::read_attribute_value(&after_eq[gap..]);
            attrs.set(&name, &unescape_entities(value));
            cursor += consumed;
        } else {
            attrs.set(&name, "");
        }
        cursor
    }

    /// Parse a quoted or unquoted attribute value; returns (value, consumed).
    fn read_attribute_value(tail: &str) -> (&str, usize) {
        match tail.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &tail[1..];
                body.find(quote).map_or((body, tail.len()), |end| {
                    (&body[..end], end + 2)
                })
            }
            _ => {
                let end = tail
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(tail.len());
                (&tail[..end], end)
            }
        }
    }
}
