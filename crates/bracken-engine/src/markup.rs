//! Element tree → markup serializer.
//!
//! For each element, the first registered tag definition with a satisfied
//! matcher wins; its `to_markup` rule renders the tag around the already-
//! rendered children. Elements no definition claims are dropped, keeping
//! only their content; block-level ones still terminate the emitted line,
//! so document structure survives even when markup can't express it.

use bracken_bbcode::{
    BreakHint, ConversionOptions, MarkupContext, MarkupRender, TagDefinition, TagRegistry,
};
use bracken_dom::{ElementTree, NodeId, NodeType};

/// HTML elements that are block-level for line-structure purposes even
/// when no tag definition matches them.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// One rendered child and how it participates in line structure.
struct Piece {
    text: String,
    block: bool,
    /// Force a blank line before this block (per-tag hint or engine option).
    force_before: bool,
}

/// Renders an element tree to markup text.
pub(crate) struct MarkupSerializer<'a> {
    pub registry: &'a TagRegistry,
    pub options: &'a ConversionOptions,
}

impl MarkupSerializer<'_> {
    pub fn render(&self, tree: &ElementTree, within_code: bool) -> String {
        let ctx = MarkupContext {
            tree,
            options: self.options,
        };
        self.render_children(&ctx, tree.root(), within_code)
    }

    fn render_children(&self, ctx: &MarkupContext<'_>, id: NodeId, within_code: bool) -> String {
        let mut out = String::new();
        for &child in ctx.tree.children(id) {
            let piece = self.render_node(ctx, child, within_code);
            if piece.block && !out.is_empty() {
                // Blocks start on their own line.
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                if piece.force_before && !out.ends_with("\n\n") {
                    out.push('\n');
                }
            }
            out.push_str(&piece.text);
        }
        out
    }

    fn render_node(&self, ctx: &MarkupContext<'_>, id: NodeId, within_code: bool) -> Piece {
        let Some(node) = ctx.tree.get(id) else {
            return Piece {
                text: String::new(),
                block: false,
                force_before: false,
            };
        };
        match &node.node_type {
            NodeType::Text(text) => Piece {
                text: if within_code {
                    text.clone()
                } else {
                    collapse_text(text)
                },
                block: false,
                force_before: false,
            },
            NodeType::Fragment => Piece {
                text: self.render_children(ctx, id, within_code),
                block: false,
                force_before: false,
            },
            NodeType::Element(element) => {
                if element.tag_name == "br" {
                    return Piece {
                        text: "\n".to_string(),
                        block: false,
                        force_before: false,
                    };
                }
                match self.match_definition(element) {
                    Some((name, definition)) => {
                        self.render_matched(ctx, id, name, definition, within_code)
                    }
                    None => {
                        // Unknown element: drop the wrapper, keep the content.
                        let inner_code = within_code || element.tag_name == "pre";
                        let block = BLOCK_ELEMENTS.contains(&element.tag_name.as_str());
                        let mut text = self.render_children(ctx, id, inner_code);
                        if block && !text.ends_with('\n') {
                            text.push('\n');
                        }
                        Piece {
                            text,
                            block,
                            force_before: self.options.break_before_block,
                        }
                    }
                }
            }
        }
    }

    fn render_matched(
        &self,
        ctx: &MarkupContext<'_>,
        id: NodeId,
        name: &str,
        definition: &TagDefinition,
        within_code: bool,
    ) -> Piece {
        let inner_code = within_code || name == "code";
        let mut content = self.render_children(ctx, id, inner_code);
        if definition.skip_last_trailing_break && content.ends_with('\n') {
            let _ = content.pop();
        }
        let mut text = if is_default_rule(&definition.to_markup) {
            // No explicit rule: generic emission from the element's own
            // attributes, quoted per the tag's policy, closing tag unless
            // the definition opts out.
            Self::generic_markup(ctx, id, name, definition, &content)
        } else {
            definition.to_markup.apply(ctx, id, &content)
        };
        let block = !definition.is_inline;
        if block {
            if definition.breaks.after != BreakHint::Suppress && !text.ends_with('\n') {
                text.push('\n');
            }
            if definition
                .breaks
                .after
                .resolve(self.options.break_after_block)
                && !text.ends_with("\n\n")
            {
                text.push('\n');
            }
        }
        Piece {
            text,
            block,
            force_before: definition
                .breaks
                .before
                .resolve(self.options.break_before_block),
        }
    }

    /// Generic `[name attrs]content[/name]` emission for definitions
    /// registered without an explicit markup rule.
    fn generic_markup(
        ctx: &MarkupContext<'_>,
        id: NodeId,
        name: &str,
        definition: &TagDefinition,
        content: &str,
    ) -> String {
        let attrs = ctx
            .tree
            .as_element(id)
            .map(|e| e.attrs.clone())
            .unwrap_or_default();
        let mut out = ctx.opening_tag(name, &attrs, definition.quote_policy);
        out.push_str(content);
        if !definition.is_self_closing && !definition.exclude_closing {
            out.push_str(&format!("[/{name}]"));
        }
        out
    }

    /// First registered definition whose matchers accept this element.
    fn match_definition(
        &self,
        element: &bracken_dom::ElementData,
    ) -> Option<(&str, &TagDefinition)> {
        let strict = self.options.strict_match;
        self.registry.iter().find(|(_, definition)| {
            definition
                .matches
                .iter()
                .any(|matcher| matcher.matches(element, strict))
        })
    }
}

/// Whether a markup rule is the do-nothing default (`{0}`).
fn is_default_rule(rule: &MarkupRender) -> bool {
    matches!(rule, MarkupRender::Template(t) if t == "{0}")
}

/// Collapse whitespace the way rendered HTML would: runs become a single
/// space, and formatting-only text (whitespace containing a newline)
/// disappears entirely.
fn collapse_text(text: &str) -> String {
    if text.trim().is_empty() {
        return if text.contains('\n') || text.is_empty() {
            String::new()
        } else {
            " ".to_string()
        };
    }
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}
