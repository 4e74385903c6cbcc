use core::fmt;

use strum_macros::Display;

use bracken_dom::AttributeList;

/// Name carried by generic (non-tag) content tokens.
pub const CONTENT_NAME: &str = "#";

/// The four token kinds the tokenizer emits. No tree structure yet; the
/// tree builder owns nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenKind {
    /// A run of plain text (including demoted malformed constructs).
    Content,
    /// One line break (CR, LF, or CRLF).
    Newline,
    /// A recognized opening tag construct, `[name ...]`.
    Open,
    /// A recognized closing tag construct, `[/name]`.
    Close,
}

/// One token of markup text.
///
/// `raw` always holds the exact matched substring so malformed input can
/// fall back to literal text and closing tags can round-trip verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Resolved (lowercase) tag name, or [`CONTENT_NAME`].
    pub name: String,
    /// Original matched substring.
    pub raw: String,
    /// Parsed attributes; the unnamed bracket value sits under the
    /// reserved `default` key. Empty for anything but Open tokens.
    pub attributes: AttributeList,
}

impl Token {
    /// Create a content token.
    #[must_use]
    pub fn content(raw: &str) -> Self {
        Self {
            kind: TokenKind::Content,
            name: CONTENT_NAME.to_string(),
            raw: raw.to_string(),
            attributes: AttributeList::new(),
        }
    }

    /// Create a newline token.
    #[must_use]
    pub fn newline(raw: &str) -> Self {
        Self {
            kind: TokenKind::Newline,
            name: CONTENT_NAME.to_string(),
            raw: raw.to_string(),
            attributes: AttributeList::new(),
        }
    }

    /// Create an open-tag token.
    #[must_use]
    pub fn open(name: &str, raw: &str, attributes: AttributeList) -> Self {
        Self {
            kind: TokenKind::Open,
            name: name.to_ascii_lowercase(),
            raw: raw.to_string(),
            attributes,
        }
    }

    /// Create a close-tag token.
    #[must_use]
    pub fn close(name: &str, raw: &str) -> Self {
        Self {
            kind: TokenKind::Close,
            name: name.to_ascii_lowercase(),
            raw: raw.to_string(),
            attributes: AttributeList::new(),
        }
    }

    /// Reconstructed closing-tag text for this (open) token, used when an
    /// implicitly closed subtree is flattened back to source text.
    #[must_use]
    pub fn closing_raw(&self) -> String {
        format!("[/{}]", self.name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Content => {
                let display = self.raw.replace('\n', "\\n");
                write!(f, "\"{display}\"")
            }
            TokenKind::Newline => write!(f, "Newline"),
            TokenKind::Open => write!(f, "{}", self.raw),
            TokenKind::Close => write!(f, "[/{}]", self.name),
        }
    }
}
