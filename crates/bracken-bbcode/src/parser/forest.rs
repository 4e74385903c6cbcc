//! Arena storage for built token trees.
//!
//! Nodes are referenced by [`TokenId`] indices into a backing vector
//! rather than owning pointers: the overlap-split and nesting fix-up
//! operations reparent subtrees freely, which an index arena makes a
//! matter of moving integers between `children` vectors.

use crate::tokenizer::{Token, TokenKind};

/// A type-safe index into a [`TokenForest`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(pub usize);

/// One node of a built token tree.
///
/// Only Open tokens carry children. A matched closing token is kept in
/// `closing` purely so the original closing text can round-trip; it is
/// never traversed and owns nothing.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The token this node was built from.
    pub token: Token,
    /// Child nodes in document order. Ownership is exclusive: a node
    /// appears in exactly one `children` list (or in the root list).
    pub children: Vec<TokenId>,
    /// The Close token that terminated this node, if one matched.
    pub closing: Option<Token>,
}

/// A forest of token trees backed by one arena.
#[derive(Debug, Clone, Default)]
pub struct TokenForest {
    nodes: Vec<TreeNode>,
    roots: Vec<TokenId>,
}

impl TokenForest {
    /// Create an empty forest.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Allocate a detached node for `token` and return its ID.
    pub fn alloc(&mut self, token: Token) -> TokenId {
        let id = TokenId(self.nodes.len());
        self.nodes.push(TreeNode {
            token,
            children: Vec::new(),
            closing: None,
        });
        id
    }

    /// Get a node by ID.
    #[must_use]
    pub fn get(&self, id: TokenId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: TokenId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0)
    }

    /// The top-level trees in document order.
    #[must_use]
    pub fn roots(&self) -> &[TokenId] {
        &self.roots
    }

    /// Mutable access to the root list (builder and fix-up passes).
    pub(crate) fn roots_mut(&mut self) -> &mut Vec<TokenId> {
        &mut self.roots
    }

    /// Children of a node (empty for non-Open nodes).
    #[must_use]
    pub fn children(&self, id: TokenId) -> &[TokenId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of allocated nodes (detached clones included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flatten a subtree back into the source text it was built from.
    /// Used when a disallowed child is coerced to generic content.
    #[must_use]
    pub fn raw_text(&self, id: TokenId) -> String {
        let Some(node) = self.get(id) else {
            return String::new();
        };
        let mut out = node.token.raw.clone();
        for &child in &node.children {
            out.push_str(&self.raw_text(child));
        }
        match (&node.closing, node.token.kind) {
            (Some(closing), _) => out.push_str(&closing.raw),
            (None, TokenKind::Open) if !node.children.is_empty() => {
                out.push_str(&node.token.closing_raw());
            }
            _ => {}
        }
        out
    }
}

/// Format a forest for debugging, one node per line, indented.
#[must_use]
pub fn format_forest(forest: &TokenForest) -> String {
    let mut out = String::new();
    for &root in forest.roots() {
        format_node(forest, root, 0, &mut out);
    }
    out
}

fn format_node(forest: &TokenForest, id: TokenId, indent: usize, out: &mut String) {
    let Some(node) = forest.get(id) else { return };
    out.push_str(&"  ".repeat(indent));
    out.push_str(&node.token.to_string());
    out.push('\n');
    for &child in &node.children {
        format_node(forest, child, indent + 1, out);
    }
}
