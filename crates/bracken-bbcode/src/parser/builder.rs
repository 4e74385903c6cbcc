//! The tree builder: consumes the flat token sequence and produces a
//! forest of properly nested token trees.
//!
//! The builder keeps an explicit stack of currently open ancestor nodes.
//! Three recovery mechanisms keep it total on arbitrary input:
//!
//! - **Implicit close**: an opening tag listed in an ancestor's
//!   `closed_by` set terminates that ancestor first (`[li]` ends the
//!   previous `[li]`).
//! - **Overlap split**: a closing tag matching a non-top ancestor pops
//!   every intervening tag and reopens a clone of each as a sibling
//!   continuation, turning `[b]one [i]two[/b] three[/i]` into properly
//!   nested siblings.
//! - **Demotion**: a closing tag matching nothing becomes literal
//!   content.
//!
//! Newlines adjacent to block tags are absorbed or kept per each tag's
//! break hints and the engine's `break_*_block` options; the force options
//! additionally insert missing newlines so both serializers see one tree.

use bracken_common::warning::warn_once;

use crate::options::ConversionOptions;
use crate::registry::{BreakHints, CloseTrigger, TagRegistry};
use crate::tokenizer::{Token, TokenKind};

use super::fixup;
use super::forest::{TokenForest, TokenId};

/// Builds a [`TokenForest`] from a token sequence.
pub struct TreeBuilder<'a> {
    registry: &'a TagRegistry,
    options: &'a ConversionOptions,
    tokens: Vec<Token>,
    pos: usize,
    forest: TokenForest,
    /// Stack of currently open ancestor nodes, outermost first.
    stack: Vec<TokenId>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder over a token sequence.
    #[must_use]
    pub const fn new(
        registry: &'a TagRegistry,
        options: &'a ConversionOptions,
        tokens: Vec<Token>,
    ) -> Self {
        TreeBuilder {
            registry,
            options,
            tokens,
            pos: 0,
            forest: TokenForest::new(),
            stack: Vec::new(),
        }
    }

    /// Consume the tokens and return the built forest, with the enabled
    /// fix-up passes applied.
    #[must_use]
    pub fn run(mut self) -> TokenForest {
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            match token.kind {
                TokenKind::Content => {
                    let _ = self.attach(token);
                }
                TokenKind::Newline => self.handle_newline(token),
                TokenKind::Open => self.handle_open(token),
                TokenKind::Close => self.handle_close(&token),
            }
            self.pos += 1;
        }
        // End of input implicitly closes whatever is still open.
        while let Some(id) = self.stack.pop() {
            self.finish_node(id);
        }

        let TreeBuilder {
            registry,
            options,
            mut forest,
            ..
        } = self;
        if options.fix_invalid_children {
            fixup::fix_children(&mut forest, registry);
        }
        if options.fix_invalid_nesting {
            fixup::fix_nesting(&mut forest, registry);
        }
        if options.remove_empty_tags {
            fixup::prune_empty(&mut forest, registry);
        }
        forest
    }

    // ------------------------------------------------------------------
    // Stack and attachment helpers
    // ------------------------------------------------------------------

    /// Allocate `token` and append it to the current container (the
    /// top-of-stack node's children, or the root forest).
    fn attach(&mut self, token: Token) -> TokenId {
        let id = self.forest.alloc(token);
        match self.stack.last().copied() {
            Some(parent) => {
                if let Some(node) = self.forest.get_mut(parent) {
                    node.children.push(id);
                }
            }
            None => self.forest.roots_mut().push(id),
        }
        id
    }

    /// The last node attached to the current container.
    fn last_attached(&self) -> Option<TokenId> {
        match self.stack.last() {
            Some(&parent) => self.forest.children(parent).last().copied(),
            None => self.forest.roots().last().copied(),
        }
    }

    fn node_name(&self, id: TokenId) -> String {
        self.forest
            .get(id)
            .map(|n| n.token.name.clone())
            .unwrap_or_default()
    }

    fn is_block(&self, name: &str) -> bool {
        self.registry.get(name).is_some_and(|d| !d.is_inline)
    }

    fn hints(&self, name: &str) -> BreakHints {
        self.registry
            .get(name)
            .map(|d| d.breaks)
            .unwrap_or_default()
    }

    /// Whether an open tag named `opened` implicitly closes a still-open
    /// tag named `holder`.
    fn closes_on_open(&self, holder: &str, opened: &str) -> bool {
        self.registry.get(holder).is_some_and(|d| {
            d.closed_by
                .iter()
                .any(|t| matches!(t, CloseTrigger::Open(n) if n == opened))
        })
    }

    /// Whether a closing tag named `closed` implicitly closes a still-open
    /// tag named `holder`.
    fn closes_on_close(&self, holder: &str, closed: &str) -> bool {
        self.registry.get(holder).is_some_and(|d| {
            d.closed_by
                .iter()
                .any(|t| matches!(t, CloseTrigger::Close(n) if n == closed))
        })
    }

    /// Whether anything later in the stream can terminate a tag named
    /// `name`: its own closing tag, or one of its `closed_by` triggers.
    fn has_terminator(&self, name: &str) -> bool {
        self.tokens[self.pos + 1..].iter().any(|t| match t.kind {
            TokenKind::Close => t.name == name || self.closes_on_close(name, &t.name),
            TokenKind::Open => self.closes_on_open(name, &t.name),
            _ => false,
        })
    }

    // ------------------------------------------------------------------
    // Token handling
    // ------------------------------------------------------------------

    fn handle_open(&mut self, token: Token) {
        // STEP 1: implicitly close any ancestor expecting this tag.
        if let Some(depth) = self
            .stack
            .iter()
            .rposition(|&id| self.closes_on_open(&self.node_name(id), &token.name))
        {
            while self.stack.len() > depth {
                if let Some(id) = self.stack.pop() {
                    self.finish_node(id);
                }
            }
        }

        let Some(definition) = self.registry.get(&token.name) else {
            // The tokenizer only emits Open tokens for registered names,
            // so this is unreachable in practice; recover anyway.
            let _ = self.attach(Token::content(&token.raw));
            return;
        };
        let self_closing = definition.is_self_closing;
        let block = !definition.is_inline;
        let force_before = definition
            .breaks
            .before
            .resolve(self.options.break_before_block);

        // STEP 2: forced line break before a block tag.
        if block
            && force_before
            && !matches!(self.last_kind(), Some(TokenKind::Newline))
        {
            let _ = self.attach(Token::newline("\n"));
        }

        // STEP 3: attach, and stay open only if something later closes it.
        let stays_open = !self_closing && self.has_terminator(&token.name);
        let id = self.attach(token);
        if stays_open {
            self.stack.push(id);
        } else {
            self.finish_node(id);
        }
    }

    fn handle_close(&mut self, token: &Token) {
        // STEP 1: pop tags that end on this closing tag ([li] before [/ul]).
        while let Some(&top) = self.stack.last() {
            let top_name = self.node_name(top);
            if top_name == token.name || !self.closes_on_close(&top_name, &token.name) {
                break;
            }
            let _ = self.stack.pop();
            self.finish_node(top);
        }

        let Some(depth) = self
            .stack
            .iter()
            .rposition(|&id| self.node_name(id) == token.name)
        else {
            // STEP 4: no ancestor matches; the closing tag is literal text.
            warn_once(
                "Builder",
                &format!(
                    "closing tag {} matched no open tag; kept as literal text",
                    token.raw
                ),
            );
            let _ = self.attach(Token::content(&token.raw));
            return;
        };

        // STEP 2: clone intervening ancestors so they can be reopened as
        // sibling continuations after the tag we are about to close.
        // Ancestors that this closing tag also terminates stay closed.
        let reopen: Vec<Token> = self.stack[depth + 1..]
            .iter()
            .filter(|&&id| !self.closes_on_close(&self.node_name(id), &token.name))
            .filter_map(|&id| self.forest.get(id).map(|n| n.token.clone()))
            .collect();
        while self.stack.len() > depth + 1 {
            if let Some(id) = self.stack.pop() {
                self.finish_node(id);
            }
        }

        // STEP 3: close the matched ancestor, keeping the closing token
        // for round-tripping, then reopen the clones in nesting order.
        if let Some(id) = self.stack.pop() {
            if let Some(node) = self.forest.get_mut(id) {
                node.closing = Some(token.clone());
            }
            self.finish_node(id);
        }
        for clone in reopen {
            let id = self.attach(clone);
            self.stack.push(id);
        }
    }

    fn handle_newline(&mut self, token: Token) {
        let next = self
            .tokens
            .get(self.pos + 1)
            .map(|t| (t.kind, t.name.clone()));

        // Start of a block: the enclosing tag just opened, no content yet.
        if let Some(&top) = self.stack.last() {
            let top_name = self.node_name(top);
            if self.is_block(&top_name) && self.forest.children(top).is_empty() {
                if self
                    .hints(&top_name)
                    .start
                    .resolve(self.options.break_start_block)
                {
                    let _ = self.attach(token);
                }
                return;
            }
        }

        // After a block: the previous sibling is a block tag (and closed,
        // or we would be inside it rather than next to it).
        if let Some(prev) = self.last_attached() {
            let prev_name = self.node_name(prev);
            let prev_kind = self.forest.get(prev).map(|n| n.token.kind);
            if prev_kind == Some(TokenKind::Open) && self.is_block(&prev_name) {
                if self
                    .hints(&prev_name)
                    .after
                    .resolve(self.options.break_after_block)
                {
                    let _ = self.attach(token);
                }
                return;
            }
        }

        if let Some((next_kind, next_name)) = next {
            // End of the enclosing block: the next token terminates it.
            if let Some(&top) = self.stack.last() {
                let top_name = self.node_name(top);
                if self.is_block(&top_name) {
                    let ends = match next_kind {
                        TokenKind::Close => {
                            next_name == top_name
                                || self.closes_on_close(&top_name, &next_name)
                        }
                        TokenKind::Open => self.closes_on_open(&top_name, &next_name),
                        _ => false,
                    };
                    if ends {
                        if self
                            .hints(&top_name)
                            .end
                            .resolve(self.options.break_end_block)
                        {
                            let _ = self.attach(token);
                        }
                        return;
                    }
                }
            }

            // Before a block open.
            if next_kind == TokenKind::Open && self.is_block(&next_name) {
                if self
                    .hints(&next_name)
                    .before
                    .resolve(self.options.break_before_block)
                {
                    let _ = self.attach(token);
                }
                return;
            }
        }

        // No block neighbor: a literal line break.
        let _ = self.attach(token);
    }

    /// Kind of the last node attached to the current container.
    fn last_kind(&self) -> Option<TokenKind> {
        self.last_attached()
            .and_then(|id| self.forest.get(id))
            .map(|n| n.token.kind)
    }

    /// Post-close bookkeeping for a node: apply the forced `start`/`end`/
    /// `after` line breaks of block tags.
    fn finish_node(&mut self, id: TokenId) {
        let name = self.node_name(id);
        if !self.is_block(&name) {
            return;
        }
        let hints = self.hints(&name);

        if hints.start.resolve(self.options.break_start_block) {
            let first = self
                .forest
                .children(id)
                .first()
                .and_then(|&c| self.forest.get(c))
                .map(|n| n.token.kind);
            if first != Some(TokenKind::Newline) {
                let newline = self.forest.alloc(Token::newline("\n"));
                if let Some(node) = self.forest.get_mut(id) {
                    node.children.insert(0, newline);
                }
            }
        }
        if hints.end.resolve(self.options.break_end_block) {
            let last = self
                .forest
                .children(id)
                .last()
                .and_then(|&c| self.forest.get(c))
                .map(|n| n.token.kind);
            if last != Some(TokenKind::Newline) {
                let newline = self.forest.alloc(Token::newline("\n"));
                if let Some(node) = self.forest.get_mut(id) {
                    node.children.push(newline);
                }
            }
        }
        if hints.after.resolve(self.options.break_after_block) {
            let next_is_newline = self
                .tokens
                .get(self.pos + 1)
                .is_some_and(|t| t.kind == TokenKind::Newline);
            if !next_is_newline {
                let _ = self.attach(Token::newline("\n"));
            }
        }
    }
}
