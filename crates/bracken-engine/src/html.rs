//! Token forest → HTML serializer.
//!
//! Depth-first render. Content escapes entities; Open nodes render their
//! children first (the inline/block context cascades down) and then apply
//! the tag's `to_html` rule. In document mode, runs of inline siblings
//! directly under the forest root or under a block container are wrapped
//! into `<div>` line containers so freestanding inline content never
//! floats outside a block element; fragment mode renders newlines as
//! `<br />` with no wrapping.

use bracken_bbcode::{TagRegistry, TokenForest, TokenId, TokenKind};
use bracken_common::escape::entities;

/// Renders a built token forest to an HTML string.
pub(crate) struct HtmlSerializer<'a> {
    pub registry: &'a TagRegistry,
}

impl HtmlSerializer<'_> {
    pub fn render(&self, forest: &TokenForest, fragment: bool) -> String {
        if fragment {
            self.render_inline(forest, forest.roots(), true)
        } else {
            self.render_block(forest, forest.roots(), true)
        }
    }

    /// Block context: inline runs become `<div>` lines, a lone newline
    /// becomes an empty line, block tags flush the current line first.
    ///
    /// Interior containers whose content is a single inline run skip the
    /// line wrapping (`[li]a[/li]` renders `<li>a</li>`, not a nested
    /// div); the forest root always wraps so freestanding inline content
    /// ends up inside a block element.
    fn render_block(&self, forest: &TokenForest, ids: &[TokenId], root: bool) -> String {
        let multiline = ids.iter().any(|&id| {
            forest.get(id).is_some_and(|n| match n.token.kind {
                TokenKind::Newline => true,
                TokenKind::Open => self.is_block(&n.token.name),
                _ => false,
            })
        });
        if !root && !multiline {
            return self.render_inline(forest, ids, false);
        }
        let mut out = String::new();
        let mut line = String::new();
        for &id in ids {
            let Some(node) = forest.get(id) else { continue };
            match node.token.kind {
                TokenKind::Newline => {
                    if line.is_empty() {
                        out.push_str("<div><br /></div>");
                    } else {
                        out.push_str(&format!("<div>{line}</div>"));
                        line.clear();
                    }
                }
                TokenKind::Open if self.is_block(&node.token.name) => {
                    if !line.is_empty() {
                        out.push_str(&format!("<div>{line}</div>"));
                        line.clear();
                    }
                    out.push_str(&self.render_tag(forest, id));
                }
                _ => line.push_str(&self.render_node(forest, id)),
            }
        }
        // A trailing open line is closed at end of input.
        if !line.is_empty() {
            out.push_str(&format!("<div>{line}</div>"));
        }
        out
    }

    /// Inline context: newlines are `<br />`. At the fragment root a
    /// trailing newline is invisible and gets deduplicated away.
    fn render_inline(&self, forest: &TokenForest, ids: &[TokenId], root: bool) -> String {
        let mut out = String::new();
        let last = ids.len().saturating_sub(1);
        for (i, &id) in ids.iter().enumerate() {
            let Some(node) = forest.get(id) else { continue };
            if node.token.kind == TokenKind::Newline {
                if !(root && i == last) {
                    out.push_str("<br />");
                }
            } else {
                out.push_str(&self.render_node(forest, id));
            }
        }
        out
    }

    /// One node, rendered inline-safe.
    fn render_node(&self, forest: &TokenForest, id: TokenId) -> String {
        let Some(node) = forest.get(id) else {
            return String::new();
        };
        match node.token.kind {
            TokenKind::Open => self.render_tag(forest, id),
            TokenKind::Newline => "<br />".to_string(),
            TokenKind::Content | TokenKind::Close => entities(&node.token.raw),
        }
    }

    fn render_tag(&self, forest: &TokenForest, id: TokenId) -> String {
        let Some(node) = forest.get(id) else {
            return String::new();
        };
        let Some(definition) = self.registry.get(&node.token.name) else {
            // A tag removed between parse and render; fall back to source.
            return entities(&forest.raw_text(id));
        };
        let children = forest.children(id);
        let children = if definition.skip_last_trailing_break
            && children
                .last()
                .and_then(|&c| forest.get(c))
                .is_some_and(|n| n.token.kind == TokenKind::Newline)
        {
            &children[..children.len() - 1]
        } else {
            children
        };
        let content = if definition.is_inline || definition.block_container_only {
            self.render_inline(forest, children, false)
        } else {
            self.render_block(forest, children, false)
        };
        definition.to_html.apply(&node.token.attributes, &content)
    }

    fn is_block(&self, name: &str) -> bool {
        self.registry.get(name).is_some_and(|d| !d.is_inline)
    }
}
