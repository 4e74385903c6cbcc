//! Integration tests for the tree builder and its fix-up passes.

use bracken_bbcode::{
    ConversionOptions, TagRegistry, TokenForest, TokenId, TokenKind, Tokenizer, TreeBuilder,
};

/// Helper to parse markup into a forest with default options.
fn parse(input: &str) -> TokenForest {
    parse_with(input, &ConversionOptions::default())
}

/// Helper to parse markup with specific options.
fn parse_with(input: &str, options: &ConversionOptions) -> TokenForest {
    let registry = TagRegistry::with_defaults();
    let tokens = Tokenizer::new(&registry, input).run();
    TreeBuilder::new(&registry, options, tokens).run()
}

/// Helper to get a node's tag name.
fn name(forest: &TokenForest, id: TokenId) -> String {
    forest.get(id).map(|n| n.token.name.clone()).unwrap_or_default()
}

/// Helper to get a node's kind.
fn kind(forest: &TokenForest, id: TokenId) -> TokenKind {
    forest.get(id).map_or(TokenKind::Content, |n| n.token.kind)
}

#[test]
fn test_simple_nesting() {
    let forest = parse("[b]hi[/b]");
    assert_eq!(forest.roots().len(), 1);
    let b = forest.roots()[0];
    assert_eq!(name(&forest, b), "b");
    assert_eq!(forest.children(b).len(), 1);
    // The matched closing token is kept for round-tripping.
    assert_eq!(
        forest.get(b).unwrap().closing.as_ref().map(|t| t.raw.as_str()),
        Some("[/b]")
    );
}

#[test]
fn test_implicit_close_of_list_items() {
    let forest = parse("[ul][li]a[li]b[/ul]");
    let ul = forest.roots()[0];
    assert_eq!(name(&forest, ul), "ul");
    let items = forest.children(ul);
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|&li| name(&forest, li) == "li"));
    // The first item closed when the second opened, so "a" stayed inside it.
    assert_eq!(forest.children(items[0]).len(), 1);
}

#[test]
fn test_overlap_split() {
    // [b]one [i]two[/b] three[/i]: the [i] span is split into properly
    // nested siblings; no pair crosses another in the final tree.
    let forest = parse("[b]one [i]two[/b] three[/i]");
    assert_eq!(forest.roots().len(), 2);
    let b = forest.roots()[0];
    let i_cont = forest.roots()[1];
    assert_eq!(name(&forest, b), "b");
    assert_eq!(name(&forest, i_cont), "i");

    let b_children = forest.children(b);
    assert_eq!(b_children.len(), 2);
    assert_eq!(kind(&forest, b_children[0]), TokenKind::Content);
    assert_eq!(name(&forest, b_children[1]), "i");

    // The continuation owns the content after the split point.
    let cont_children = forest.children(i_cont);
    assert_eq!(cont_children.len(), 1);
    assert_eq!(
        forest.get(cont_children[0]).unwrap().token.raw,
        " three"
    );
}

#[test]
fn test_unmatched_close_demoted_to_content() {
    let forest = parse("a[/b]c");
    assert_eq!(forest.roots().len(), 3);
    let demoted = forest.roots()[1];
    assert_eq!(kind(&forest, demoted), TokenKind::Content);
    assert_eq!(forest.get(demoted).unwrap().token.raw, "[/b]");
}

#[test]
fn test_unterminated_tag_is_self_closing() {
    // No [/b] anywhere later, so [b] never stays on the stack and "x"
    // becomes its sibling, not its child. The childless tag then falls
    // to the empty-tag prune.
    let forest = parse("[b]x");
    assert_eq!(forest.roots().len(), 1);
    assert_eq!(kind(&forest, forest.roots()[0]), TokenKind::Content);

    let options = ConversionOptions {
        remove_empty_tags: false,
        ..ConversionOptions::default()
    };
    let forest = parse_with("[b]x", &options);
    assert_eq!(forest.roots().len(), 2);
    assert!(forest.children(forest.roots()[0]).is_empty());
}

#[test]
fn test_table_children_whitelist() {
    let forest = parse("[table]stray[tr][td]a[/td][/tr][/table]");
    let table = forest.roots()[0];
    // "stray" is not a permitted table child and is dropped; the row stays.
    let children = forest.children(table);
    assert_eq!(children.len(), 1);
    assert_eq!(name(&forest, children[0]), "tr");
}

#[test]
fn test_disallowed_tag_child_coerced_to_text() {
    let forest = parse("[code][b]x[/b][/code]");
    let code = forest.roots()[0];
    let children = forest.children(code);
    assert_eq!(children.len(), 1);
    assert_eq!(kind(&forest, children[0]), TokenKind::Content);
    // The subtree is flattened back to its source text.
    assert_eq!(forest.get(children[0]).unwrap().token.raw, "[b]x[/b]");
}

#[test]
fn test_block_hoisted_out_of_inline() {
    let forest = parse("[b]text[quote]q[/quote]more[/b]");
    let names: Vec<String> = forest.roots().iter().map(|&r| name(&forest, r)).collect();
    assert_eq!(names, vec!["b", "quote", "b"]);
    // The original bold span keeps what came before the block; the clone
    // continuation owns what came after.
    assert_eq!(forest.children(forest.roots()[0]).len(), 1);
    assert_eq!(forest.children(forest.roots()[2]).len(), 1);
}

#[test]
fn test_empty_tag_pruned() {
    let forest = parse("[b][/b]");
    assert!(forest.roots().is_empty());
}

#[test]
fn test_empty_tag_kept_when_disabled() {
    let options = ConversionOptions {
        remove_empty_tags: false,
        ..ConversionOptions::default()
    };
    let forest = parse_with("[b][/b]", &options);
    assert_eq!(forest.roots().len(), 1);
}

#[test]
fn test_nested_empty_tags_pruned_bottom_up() {
    let forest = parse("[b][i][/i][/b]");
    assert!(forest.roots().is_empty());
}

#[test]
fn test_self_closing_never_pruned() {
    let forest = parse("[hr]");
    assert_eq!(forest.roots().len(), 1);
    assert_eq!(name(&forest, forest.roots()[0]), "hr");
}

#[test]
fn test_newline_absorbed_at_block_edges() {
    // The breaks adjacent to the quote's edges belong to the block and
    // are absorbed; the interior one between text lines is content.
    let forest = parse("[quote]\na\nb\n[/quote]");
    let quote = forest.roots()[0];
    let kinds: Vec<TokenKind> = forest
        .children(quote)
        .iter()
        .map(|&c| kind(&forest, c))
        .collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Content, TokenKind::Newline, TokenKind::Content]
    );
}

#[test]
fn test_newline_between_text_preserved() {
    let forest = parse("a\nb");
    let kinds: Vec<TokenKind> = forest
        .roots()
        .iter()
        .map(|&r| kind(&forest, r))
        .collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Content, TokenKind::Newline, TokenKind::Content]
    );
}

#[test]
fn test_newline_after_block_absorbed() {
    let forest = parse("[quote]a[/quote]\nb");
    let kinds: Vec<TokenKind> = forest
        .roots()
        .iter()
        .map(|&r| kind(&forest, r))
        .collect();
    assert_eq!(kinds, vec![TokenKind::Open, TokenKind::Content]);
}

#[test]
fn test_forced_break_before_block() {
    let options = ConversionOptions {
        break_before_block: true,
        ..ConversionOptions::default()
    };
    let forest = parse_with("a[quote]x[/quote]", &options);
    let kinds: Vec<TokenKind> = forest
        .roots()
        .iter()
        .map(|&r| kind(&forest, r))
        .collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Content, TokenKind::Newline, TokenKind::Open]
    );
}

#[test]
fn test_format_forest_debug_output() {
    let forest = parse("[b]hi[/b]\nx");
    let formatted = bracken_bbcode::format_forest(&forest);
    assert!(formatted.contains("[b]"));
    assert!(formatted.contains("\"hi\""));
}

#[test]
fn test_star_list_items() {
    let forest = parse("[ul][*]a[*]b[/ul]");
    let ul = forest.roots()[0];
    let items = forest.children(ul);
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|&item| name(&forest, item) == "*"));
}
