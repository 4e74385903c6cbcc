//! BBCode language core for the Bracken markup engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tag Registry**: declarative [`TagDefinition`] records keyed by tag
//!   name: element matchers, classification flags, break hints, and the
//!   two rendering rules. Sealed before the first conversion; reads are
//!   lock-free afterwards.
//! - **Tokenizer**: raw markup text → flat `Content`/`Newline`/`Open`/
//!   `Close` token sequence, demoting anything malformed to literal
//!   content.
//! - **Tree Builder**: token sequence → arena-backed [`TokenForest`],
//!   with implicit closing, overlap splitting, and the allowed-children /
//!   inline-block / empty-tag fix-up passes.
//!
//! The serializers for both directions live in `bracken-engine`.
//!
//! # Recovery, not errors
//!
//! Nothing in this crate fails on malformed input: every input string
//! tokenizes and builds into some forest. The only fallible surface is
//! the registry's admin API ([`RegistryError`]).

/// Engine-wide conversion options.
pub mod options;
/// Tree construction for token sequences.
pub mod parser;
/// Tag definitions and the sealed registry.
pub mod registry;
/// Markup tokenizer.
pub mod tokenizer;

pub use options::ConversionOptions;
pub use parser::{TokenForest, TokenId, TreeBuilder, TreeNode, format_forest};
pub use registry::{
    BreakHint, BreakHints, CloseTrigger, DEFAULT_ATTRIBUTE, ElementMatcher, HtmlRender,
    MarkupContext, MarkupRender, QuoteMode, RegistryError, StyleMatcher, TagDefinition,
    TagRegistry, quote_attribute,
};
pub use tokenizer::{CONTENT_NAME, Token, TokenKind, Tokenizer};
