//! Conversion pipeline for the Bracken markup engine.
//!
//! # Scope
//!
//! This crate provides:
//! - **HTML Serializer**: built token forests to HTML strings
//! - **Markup Serializer**: element trees to markup text
//! - **[`BBCodeEngine`]**: the public facade tying registry, tokenizer,
//!   tree builder, and both serializers together
//!
//! Everything is total: any input string or element tree produces some
//! output string. The only fallible surface is the registry admin API.

/// The conversion facade.
pub mod engine;
mod html;
mod markup;

pub use bracken_bbcode as bbcode;
pub use bracken_dom as dom;

pub use bracken_bbcode::{
    ConversionOptions, QuoteMode, RegistryError, TagDefinition, TagRegistry,
};
pub use bracken_dom::ElementTree;
pub use engine::BBCodeEngine;
