//! Integration tests for the BBCode tokenizer.

use bracken_bbcode::{DEFAULT_ATTRIBUTE, TagRegistry, Token, TokenKind, Tokenizer};

/// Helper to tokenize a string against the default registry.
fn tokenize(input: &str) -> Vec<Token> {
    let registry = TagRegistry::with_defaults();
    Tokenizer::new(&registry, input).run()
}

#[test]
fn test_plain_text() {
    let tokens = tokenize("hello world");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Content);
    assert_eq!(tokens[0].raw, "hello world");
}

#[test]
fn test_simple_tag_pair() {
    let tokens = tokenize("[b]hi[/b]");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Open, TokenKind::Content, TokenKind::Close]
    );
    assert_eq!(tokens[0].name, "b");
    assert_eq!(tokens[0].raw, "[b]");
    assert_eq!(tokens[2].name, "b");
    assert_eq!(tokens[2].raw, "[/b]");
}

#[test]
fn test_tag_names_case_insensitive() {
    let tokens = tokenize("[B]x[/B]");
    assert_eq!(tokens[0].kind, TokenKind::Open);
    assert_eq!(tokens[0].name, "b");
    // Raw text keeps the original spelling.
    assert_eq!(tokens[0].raw, "[B]");
}

#[test]
fn test_default_attribute() {
    let tokens = tokenize("[size=3]x[/size]");
    assert_eq!(tokens[0].attributes.get(DEFAULT_ATTRIBUTE), Some("3"));
}

#[test]
fn test_quoted_default_attribute() {
    let tokens = tokenize(r#"[quote="John Doe"]x[/quote]"#);
    assert_eq!(tokens[0].attributes.get(DEFAULT_ATTRIBUTE), Some("John Doe"));
}

#[test]
fn test_escaped_quote_in_value() {
    let tokens = tokenize(r#"[quote="a \" b"]x[/quote]"#);
    assert_eq!(tokens[0].attributes.get(DEFAULT_ATTRIBUTE), Some("a \" b"));
}

#[test]
fn test_key_value_attributes() {
    let tokens = tokenize("[url=http://a.com target=blank]x[/url]");
    let open = &tokens[0];
    assert_eq!(open.attributes.get(DEFAULT_ATTRIBUTE), Some("http://a.com"));
    assert_eq!(open.attributes.get("target"), Some("blank"));
}

#[test]
fn test_backslash_escaped_whitespace_in_unquoted_value() {
    let tokens = tokenize(r"[font=Comic\ Sans]x[/font]");
    assert_eq!(
        tokens[0].attributes.get(DEFAULT_ATTRIBUTE),
        Some("Comic Sans")
    );
}

#[test]
fn test_unknown_tag_demoted_to_content() {
    let tokens = tokenize("[zzzz]x[/zzzz]");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Content);
    assert_eq!(tokens[0].raw, "[zzzz]x[/zzzz]");
}

#[test]
fn test_malformed_construct_demoted() {
    // Unterminated quote makes the construct malformed; the text survives.
    let tokens = tokenize(r#"[quote="oops]x"#);
    assert!(tokens.iter().all(|t| t.kind == TokenKind::Content));
    let raw: String = tokens.iter().map(|t| t.raw.as_str()).collect();
    assert_eq!(raw, r#"[quote="oops]x"#);
}

#[test]
fn test_stray_bracket_is_content() {
    let tokens = tokenize("a [ b");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].raw, "a [ b");
}

#[test]
fn test_newline_variants() {
    let tokens = tokenize("a\r\nb\nc\rd");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Content,
            TokenKind::Newline,
            TokenKind::Content,
            TokenKind::Newline,
            TokenKind::Content,
            TokenKind::Newline,
            TokenKind::Content,
        ]
    );
    assert_eq!(tokens[1].raw, "\r\n");
    assert_eq!(tokens[3].raw, "\n");
    assert_eq!(tokens[5].raw, "\r");
}

#[test]
fn test_list_item_star() {
    let tokens = tokenize("[ul][*]a[/ul]");
    assert_eq!(tokens[1].kind, TokenKind::Open);
    assert_eq!(tokens[1].name, "*");
}

#[test]
fn test_no_input_no_tokens() {
    assert!(tokenize("").is_empty());
}
