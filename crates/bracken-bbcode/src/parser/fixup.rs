//! Post-build structural fix-up passes.
//!
//! Pass order is children fix-up, then nesting fix-up, then empty-tag
//! pruning. Pruning runs last so that a block hoisted out of an inline
//! wrapper can leave an empty wrapper behind and still see it removed.

use bracken_common::warning::warn_once;

use crate::registry::TagRegistry;
use crate::tokenizer::{CONTENT_NAME, Token, TokenKind};

use super::forest::{TokenForest, TokenId};

/// Enforce each tag's `allowed_children` whitelist, top-down.
///
/// Disallowed tag children are coerced to generic content: their raw
/// source text (subtree included) replaces the node and its children are
/// dropped. Content/newline children are removed outright when `"#"` is
/// not whitelisted.
pub(crate) fn fix_children(forest: &mut TokenForest, registry: &TagRegistry) {
    let roots = forest.roots().to_vec();
    for id in roots {
        apply_children_rule(forest, registry, id);
    }
}

fn apply_children_rule(forest: &mut TokenForest, registry: &TagRegistry, id: TokenId) {
    let Some(node) = forest.get(id) else { return };
    if node.token.kind == TokenKind::Open {
        let parent_name = node.token.name.clone();
        let allowed = registry
            .get(&parent_name)
            .and_then(|d| d.allowed_children.clone());
        if let Some(allowed) = allowed {
            let children = forest.children(id).to_vec();
            let mut kept = Vec::with_capacity(children.len());
            for child in children {
                let Some(child_node) = forest.get(child) else {
                    continue;
                };
                let child_kind = child_node.token.kind;
                let child_name = child_node.token.name.clone();
                match child_kind {
                    TokenKind::Content | TokenKind::Newline => {
                        if allowed.iter().any(|a| a == CONTENT_NAME) {
                            kept.push(child);
                        }
                    }
                    TokenKind::Open => {
                        if allowed.iter().any(|a| *a == child_name) {
                            kept.push(child);
                        } else {
                            // Coerce to generic content, raw text preserved.
                            let raw = forest.raw_text(child);
                            warn_once(
                                "Builder",
                                &format!(
                                    "[{child_name}] is not a valid child of [{parent_name}]; \
                                     flattened to text"
                                ),
                            );
                            if let Some(n) = forest.get_mut(child) {
                                n.token = Token::content(&raw);
                                n.children.clear();
                                n.closing = None;
                            }
                            kept.push(child);
                        }
                    }
                    TokenKind::Close => {}
                }
            }
            if let Some(n) = forest.get_mut(id) {
                n.children = kept;
            }
        }
    }
    let children = forest.children(id).to_vec();
    for child in children {
        apply_children_rule(forest, registry, child);
    }
}

/// Hoist block tags out of inline ancestors, splitting the inline chain
/// the same way a mismatched closing tag splits it.
pub(crate) fn fix_nesting(forest: &mut TokenForest, registry: &TagRegistry) {
    // Each hoist lifts one block above all its inline ancestors, so the
    // violation count strictly decreases; the budget is a backstop.
    let mut budget = forest.len() * 2 + 16;
    while budget > 0 && hoist_one(forest, registry) {
        budget -= 1;
    }
}

fn hoist_one(forest: &mut TokenForest, registry: &TagRegistry) -> bool {
    let Some((container, chain, block)) = find_violation(forest, registry) else {
        return false;
    };

    // Split every inline ancestor between the container and the block,
    // innermost first. `carry` accumulates the cloned continuation chain.
    let mut carry: Option<TokenId> = None;
    let mut below = block;
    for &ancestor in chain.iter().rev() {
        let Some(pos) = forest.children(ancestor).iter().position(|&c| c == below) else {
            return false;
        };
        let tail: Vec<TokenId> = match forest.get_mut(ancestor) {
            Some(node) if below == block => {
                // Remove the block itself; the rest becomes the tail.
                let mut split = node.children.split_off(pos);
                let _ = split.remove(0);
                split
            }
            Some(node) => node.children.split_off(pos + 1),
            None => return false,
        };
        if carry.is_some() || !tail.is_empty() {
            let token = match forest.get(ancestor) {
                Some(n) => n.token.clone(),
                None => return false,
            };
            let clone = forest.alloc(token);
            let mut children = Vec::with_capacity(tail.len() + 1);
            if let Some(c) = carry {
                children.push(c);
            }
            children.extend(tail);
            if let Some(n) = forest.get_mut(clone) {
                n.children = children;
            }
            carry = Some(clone);
        }
        below = ancestor;
    }

    // Reinsert: the block and then the cloned chain become siblings right
    // after the outermost split ancestor.
    let outermost = chain[0];
    let insert = |list: &mut Vec<TokenId>| {
        let pos = list
            .iter()
            .position(|&c| c == outermost)
            .map_or(list.len(), |p| p + 1);
        list.insert(pos, block);
        if let Some(c) = carry {
            list.insert(pos + 1, c);
        }
    };
    match container {
        Some(id) => {
            let mut children = forest.children(id).to_vec();
            insert(&mut children);
            if let Some(n) = forest.get_mut(id) {
                n.children = children;
            }
        }
        None => insert(forest.roots_mut()),
    }
    true
}

/// Find the first block node sitting under one or more inline ancestors.
/// Returns (nearest block container or `None` for the root forest, the
/// inline ancestor chain outermost-first, the offending block node).
fn find_violation(
    forest: &TokenForest,
    registry: &TagRegistry,
) -> Option<(Option<TokenId>, Vec<TokenId>, TokenId)> {
    let roots = forest.roots().to_vec();
    walk(forest, registry, None, &roots, &mut Vec::new())
}

fn walk(
    forest: &TokenForest,
    registry: &TagRegistry,
    container: Option<TokenId>,
    ids: &[TokenId],
    chain: &mut Vec<TokenId>,
) -> Option<(Option<TokenId>, Vec<TokenId>, TokenId)> {
    for &id in ids {
        let Some(node) = forest.get(id) else { continue };
        if node.token.kind != TokenKind::Open {
            continue;
        }
        let inline = registry
            .get(&node.token.name)
            .is_none_or(|d| d.is_inline);
        if inline {
            chain.push(id);
            let children = forest.children(id).to_vec();
            let found = walk(forest, registry, container, &children, chain);
            let _ = chain.pop();
            if found.is_some() {
                return found;
            }
        } else if chain.is_empty() {
            let children = forest.children(id).to_vec();
            let found = walk(forest, registry, Some(id), &children, &mut Vec::new());
            if found.is_some() {
                return found;
            }
        } else {
            return Some((container, chain.clone(), id));
        }
    }
    None
}

/// Remove tags that disallow empty content and contain none, bottom-up,
/// splicing their (whitespace-only) children into the parent.
pub(crate) fn prune_empty(forest: &mut TokenForest, registry: &TagRegistry) {
    let roots = forest.roots().to_vec();
    let kept = prune_list(forest, registry, &roots);
    *forest.roots_mut() = kept;
}

fn prune_list(forest: &mut TokenForest, registry: &TagRegistry, ids: &[TokenId]) -> Vec<TokenId> {
    let mut out = Vec::with_capacity(ids.len());
    for &id in ids {
        let Some(node) = forest.get(id) else { continue };
        if node.token.kind != TokenKind::Open {
            out.push(id);
            continue;
        }
        let name = node.token.name.clone();
        let children = node.children.clone();
        let kept = prune_list(forest, registry, &children);
        if let Some(n) = forest.get_mut(id) {
            n.children = kept;
        }
        let removable = registry
            .get(&name)
            .is_some_and(|d| !d.allows_empty && !d.is_self_closing)
            && subtree_is_trivial(forest, id);
        if removable {
            out.extend(forest.children(id).iter().copied());
        } else {
            out.push(id);
        }
    }
    out
}

/// Whether a node's children hold no non-whitespace content and no
/// nested markup.
fn subtree_is_trivial(forest: &TokenForest, id: TokenId) -> bool {
    forest.children(id).iter().all(|&child| {
        forest.get(child).is_some_and(|n| match n.token.kind {
            TokenKind::Content => n.token.raw.trim().is_empty(),
            TokenKind::Newline => true,
            TokenKind::Open | TokenKind::Close => false,
        })
    })
}
