//! The scanner. Four rules tried in fixed priority at every position:
//! content run, line break, open-tag construct, close-tag construct.
//!
//! Anything bracket-shaped that fails to parse, or parses but names a tag
//! the registry doesn't know, is demoted to content with its literal text
//! kept verbatim. Nothing is ever dropped here; recovery happens by
//! emitting worse-classified tokens, not by discarding input.

use bracken_dom::AttributeList;

use crate::registry::{DEFAULT_ATTRIBUTE, TagRegistry};

use super::token::{Token, TokenKind};

/// Splits raw markup text into a flat token sequence.
pub struct Tokenizer<'a> {
    registry: &'a TagRegistry,
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer over `input`, resolving tag names against
    /// `registry`.
    #[must_use]
    pub const fn new(registry: &'a TagRegistry, input: &'a str) -> Self {
        Tokenizer {
            registry,
            input,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Run to end of input and return the token sequence.
    #[must_use]
    pub fn run(mut self) -> Vec<Token> {
        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];
            if rest.starts_with('\r') || rest.starts_with('\n') {
                self.read_newline();
            } else if rest.starts_with('[') {
                self.read_bracket();
            } else {
                self.read_content();
            }
        }
        self.tokens
    }

    /// Plain content up to the next bracket or line break.
    fn read_content(&mut self) {
        let rest = &self.input[self.pos..];
        let end = rest
            .find(['[', '\r', '\n'])
            .unwrap_or(rest.len());
        self.push_content(&rest[..end]);
        self.pos += end;
    }

    /// CR, LF, or CRLF.
    fn read_newline(&mut self) {
        let rest = &self.input[self.pos..];
        let raw = if rest.starts_with("\r\n") {
            "\r\n"
        } else if rest.starts_with('\r') {
            "\r"
        } else {
            "\n"
        };
        self.tokens.push(Token::newline(raw));
        self.pos += raw.len();
    }

    /// A construct starting with `[`. Emits an Open or Close token when it
    /// parses and the registry knows the name; demotes otherwise.
    fn read_bracket(&mut self) {
        let rest = &self.input[self.pos..];
        let Some(body_len) = construct_length(rest) else {
            // No closing bracket on this construct: a literal `[`.
            self.push_content("[");
            self.pos += 1;
            return;
        };
        let raw = &rest[..body_len];
        let inner = &raw[1..raw.len() - 1];

        let token = if let Some(name) = inner.strip_prefix('/') {
            (is_tag_name(name) && self.registry.get(name).is_some())
                .then(|| Token::close(name, raw))
        } else {
            self.parse_open(inner, raw)
        };
        match token {
            Some(token) => self.tokens.push(token),
            None => self.push_content(raw),
        }
        self.pos += body_len;
    }

    /// Parse the inside of an open construct: `name`, then either a
    /// bracket value (`=...`) or whitespace-separated `key=value` pairs.
    fn parse_open(&self, inner: &str, raw: &str) -> Option<Token> {
        let name_len = inner
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '*'))
            .unwrap_or(inner.len());
        let name = &inner[..name_len];
        if name.is_empty() || self.registry.get(name).is_none() {
            return None;
        }
        let attributes = parse_attributes(&inner[name_len..])?;
        Some(Token::open(name, raw, attributes))
    }

    /// Append content, coalescing with a preceding content token.
    fn push_content(&mut self, text: &str) {
        if let Some(last) = self.tokens.last_mut()
            && last.kind == TokenKind::Content
        {
            last.raw.push_str(text);
        } else {
            self.tokens.push(Token::content(text));
        }
    }
}

/// Length (in bytes, brackets included) of the bracket construct at the
/// start of `rest`, or `None` if it never closes. A `]` inside a quoted
/// attribute value does not terminate the construct; an unquoted `[` makes
/// the construct malformed.
fn construct_length(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ']') => return Some(i + 1),
            (None, '[' | '\r' | '\n') => return None,
            (None, _) => {}
        }
    }
    None
}

/// Whether `name` is a plausible tag name (close-tag side).
fn is_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '*')
}

/// Parse the attribute section of an open construct (everything after the
/// tag name). Returns `None` if the section is malformed, which demotes
/// the whole construct to content.
fn parse_attributes(section: &str) -> Option<AttributeList> {
    let mut attrs = AttributeList::new();
    let mut rest = section;

    // Single unnamed value immediately after `=` becomes the bracket value.
    if let Some(value_part) = rest.strip_prefix('=') {
        let (value, consumed) = read_value(value_part)?;
        attrs.set(DEFAULT_ATTRIBUTE, &value);
        rest = &value_part[consumed..];
    }

    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            return Some(attrs);
        }
        // Every key must be separated from what precedes it by whitespace.
        if trimmed.len() == rest.len() {
            return None;
        }
        rest = trimmed;
        let key_len = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let key = &rest[..key_len];
        let value_part = rest[key_len..].strip_prefix('=')?;
        if key.is_empty() {
            return None;
        }
        let (value, consumed) = read_value(value_part)?;
        attrs.set(&key.to_ascii_lowercase(), &value);
        rest = &value_part[consumed..];
    }
}

/// Read one attribute value at the start of `input`: quoted with
/// backslash-escaped quotes, or unquoted running to the next whitespace
/// not itself preceded by an unescaped backslash. Returns the unescaped
/// value and the bytes consumed.
fn read_value(input: &str) -> Option<(String, usize)> {
    match input.chars().next() {
        Some(q @ ('"' | '\'')) => {
            let mut escaped = false;
            for (i, c) in input.char_indices().skip(1) {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    return Some((unescape(&input[1..i]), i + 1));
                }
            }
            // Unterminated quote: malformed construct.
            None
        }
        _ => {
            let mut escaped = false;
            let mut end = input.len();
            for (i, c) in input.char_indices() {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c.is_whitespace() {
                    end = i;
                    break;
                }
            }
            Some((unescape(&input[..end]), end))
        }
    }
}

/// Apply `\x` → `x` unescaping.
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            out.push(c);
        }
    }
    if escaped {
        // A trailing lone backslash is literal.
        out.push('\\');
    }
    out
}
