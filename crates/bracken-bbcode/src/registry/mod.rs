//! The tag definition registry.
//!
//! Every tag's behavior (how elements map back to it, how it classifies,
//! and how it renders in each direction) is a plain [`TagDefinition`]
//! record in a keyed, insertion-ordered table. There is no tag type
//! hierarchy; serializers and the tree builder only ever read fields off
//! these records.
//!
//! The registry is built once at startup, optionally customized through
//! [`TagRegistry::set`] / [`TagRegistry::rename`] / [`TagRegistry::remove`],
//! and then sealed by the first conversion call. Reads after sealing are
//! lock-free; mutation after sealing is a caller error reported as
//! [`RegistryError::Sealed`]. Missing-name lookups return `None`, never an
//! error: unknown tags are literal content.

mod defaults;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Deserialize;
use strum_macros::Display;
use thiserror::Error;

use bracken_dom::{AttributeList, ElementData, ElementTree, NodeId};

use crate::options::ConversionOptions;

/// Reserved attribute key for the unnamed bracket value (`[size=3]`).
pub const DEFAULT_ATTRIBUTE: &str = "default";

/// How attribute values are quoted when emitting markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteMode {
    /// Never quote; the raw value is emitted as-is.
    Never,
    /// Always wrap in double quotes, backslash-escaping quotes inside.
    Always,
    /// Quote only if the value contains whitespace or an `=`.
    #[default]
    Auto,
}

/// Newline placement next to a tag: forced, suppressed, or decided by the
/// tag's inline-ness (block tags absorb adjacent breaks, inline tags don't).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum BreakHint {
    /// Fall back to the engine-wide `break_*_block` option.
    #[default]
    Auto,
    /// Always keep (or insert) the line break.
    Force,
    /// Always drop the line break, even when the engine option forces it.
    Suppress,
}

impl BreakHint {
    /// Resolve this hint against the engine-wide force option for the
    /// same position.
    #[must_use]
    pub const fn resolve(self, option_force: bool) -> bool {
        match self {
            Self::Force => true,
            Self::Suppress => false,
            Self::Auto => option_force,
        }
    }
}

/// Per-position newline hints for one tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakHints {
    /// Line break immediately before the opening tag.
    pub before: BreakHint,
    /// Line break immediately after the opening tag.
    pub start: BreakHint,
    /// Line break immediately before the closing tag.
    pub end: BreakHint,
    /// Line break immediately after the closing tag.
    pub after: BreakHint,
}

/// A later tag occurrence that implicitly closes a still-open tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseTrigger {
    /// An opening tag of this name closes the tag (`[li]` closes `[li]`).
    Open(String),
    /// A closing tag of this name closes the tag (`[/ul]` closes `[li]`).
    Close(String),
}

impl CloseTrigger {
    /// Trigger on an opening tag of `name`.
    #[must_use]
    pub fn open(name: &str) -> Self {
        Self::Open(name.to_string())
    }

    /// Trigger on a closing tag of `name`.
    #[must_use]
    pub fn close(name: &str) -> Self {
        Self::Close(name.to_string())
    }
}

/// A required inline-style property, optionally limited to specific values.
#[derive(Debug, Clone)]
pub struct StyleMatcher {
    /// Style property name (`font-weight`).
    pub property: String,
    /// Accepted values, or `None` for "any value".
    pub values: Option<Vec<String>>,
}

/// One rule for recognizing an element as this tag when converting from an
/// element tree. A tag may carry several unrelated matchers (both `<b>` and
/// `<strong>` map to `b`, as does any element styled bold).
#[derive(Debug, Clone, Default)]
pub struct ElementMatcher {
    /// Element tag name this rule applies to; `None` matches any element.
    pub element: Option<String>,
    /// Attributes that must be present.
    pub attributes: Vec<String>,
    /// Inline-style properties that must be present (and match).
    pub styles: Vec<StyleMatcher>,
}

impl ElementMatcher {
    /// Test this rule against an element. In strict mode every predicate
    /// must hold; in loose mode any one of them is enough (a rule without
    /// predicates matches on the element name alone).
    #[must_use]
    pub fn matches(&self, element: &ElementData, strict: bool) -> bool {
        if let Some(name) = &self.element
            && !name.eq_ignore_ascii_case(&element.tag_name)
        {
            return false;
        }
        if self.attributes.is_empty() && self.styles.is_empty() {
            // Name-only rule; requires a concrete element name to be useful.
            return self.element.is_some();
        }
        let attr_hits = self.attributes.iter().map(|a| element.attr(a).is_some());
        let style_hits = self.styles.iter().map(|s| {
            element.style(&s.property).is_some_and(|value| {
                s.values.as_ref().is_none_or(|allowed| {
                    allowed.iter().any(|v| v.eq_ignore_ascii_case(value.trim()))
                })
            })
        });
        let mut hits = attr_hits.chain(style_hits);
        if strict {
            hits.all(|h| h)
        } else {
            hits.any(|h| h)
        }
    }
}

/// Signature of a computed tag → HTML renderer:
/// (open-tag attributes, rendered children) → HTML.
pub type HtmlRenderFn = fn(&AttributeList, &str) -> String;

/// Signature of a computed element → markup renderer:
/// (serialization context, element, rendered children) → markup.
pub type MarkupRenderFn = fn(&MarkupContext<'_>, NodeId, &str) -> String;

/// A tag's HTML rendering: a fixed template or a function.
///
/// Templates substitute `{0}` with the rendered children and `{name}` with
/// the entity-escaped value of attribute `name` (empty if absent).
#[derive(Debug, Clone)]
pub enum HtmlRender {
    /// Fixed template, e.g. `<strong>{0}</strong>`.
    Template(String),
    /// Computed renderer for tags that inspect their attributes.
    Func(HtmlRenderFn),
}

impl HtmlRender {
    /// Render with this rule.
    #[must_use]
    pub fn apply(&self, attrs: &AttributeList, content: &str) -> String {
        match self {
            Self::Template(template) => apply_template(template, attrs, content),
            Self::Func(f) => f(attrs, content),
        }
    }
}

/// A tag's markup rendering: a fixed template (only `{0}` is substituted)
/// or a function building the tag text from the source element.
#[derive(Debug, Clone)]
pub enum MarkupRender {
    /// Fixed template, e.g. `[b]{0}[/b]`.
    Template(String),
    /// Computed renderer for tags that extract attributes from the element.
    Func(MarkupRenderFn),
}

impl MarkupRender {
    /// Render with this rule.
    #[must_use]
    pub fn apply(&self, ctx: &MarkupContext<'_>, id: NodeId, content: &str) -> String {
        match self {
            Self::Template(template) => template.replace("{0}", content),
            Self::Func(f) => f(ctx, id, content),
        }
    }
}

/// Substitute `{0}` and `{attr}` placeholders in an HTML template.
fn apply_template(template: &str, attrs: &AttributeList, content: &str) -> String {
    let mut out = String::with_capacity(template.len() + content.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let body = &rest[open + 1..];
        match body.find('}') {
            Some(close) => {
                let key = &body[..close];
                if key == "0" {
                    out.push_str(content);
                } else if let Some(value) = attrs.get(key) {
                    out.push_str(&bracken_common::escape::entities(value));
                }
                rest = &body[close + 1..];
            }
            None => {
                out.push('{');
                rest = body;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Context handed to [`MarkupRenderFn`]s: the tree being serialized plus
/// the engine options, with the attribute formatting helpers.
pub struct MarkupContext<'a> {
    /// The element tree being serialized.
    pub tree: &'a ElementTree,
    /// Engine conversion options (default quote mode, strictness).
    pub options: &'a ConversionOptions,
}

impl MarkupContext<'_> {
    /// Format an opening tag, `[name=default key=value ...]`, quoting each
    /// value per `policy` (or the engine default). The reserved
    /// [`DEFAULT_ATTRIBUTE`] is emitted first, as the bracket value.
    #[must_use]
    pub fn opening_tag(
        &self,
        name: &str,
        attrs: &AttributeList,
        policy: Option<QuoteMode>,
    ) -> String {
        let mode = policy.unwrap_or(self.options.quote_type);
        let mut out = format!("[{name}");
        if let Some(value) = attrs.get(DEFAULT_ATTRIBUTE) {
            out.push('=');
            out.push_str(&quote_attribute(value, mode));
        }
        for attr in attrs {
            if attr.name != DEFAULT_ATTRIBUTE {
                out.push(' ');
                out.push_str(&attr.name);
                out.push('=');
                out.push_str(&quote_attribute(&attr.value, mode));
            }
        }
        out.push(']');
        out
    }
}

/// Quote one attribute value for markup output.
#[must_use]
pub fn quote_attribute(value: &str, mode: QuoteMode) -> String {
    let quoted = match mode {
        QuoteMode::Never => false,
        QuoteMode::Always => true,
        QuoteMode::Auto => value.contains(char::is_whitespace) || value.contains('='),
    };
    if quoted {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// The declarative record describing one tag.
#[derive(Debug, Clone)]
pub struct TagDefinition {
    /// Rules recognizing elements as this tag (element tree → markup).
    pub matches: Vec<ElementMatcher>,
    /// Inline tags live inside a line; block tags own their container.
    pub is_inline: bool,
    /// The tag takes no content and no closing tag (`[hr]`).
    pub is_self_closing: bool,
    /// Keep this tag even when its subtree holds no content.
    pub allows_empty: bool,
    /// Drop one trailing line break at the end of this tag's content.
    pub skip_last_trailing_break: bool,
    /// Block tag whose HTML interior stays inline (line breaks become
    /// `<br />` rather than line containers).
    pub block_container_only: bool,
    /// Emit no closing tag in markup output (`[*]` list items).
    pub exclude_closing: bool,
    /// Later tags that implicitly close this one while it is open.
    pub closed_by: Vec<CloseTrigger>,
    /// Child whitelist: tag names plus `"#"` for plain content. `None`
    /// allows everything.
    pub allowed_children: Option<Vec<String>>,
    /// Per-tag override of the engine's attribute quoting policy.
    pub quote_policy: Option<QuoteMode>,
    /// Newline placement hints around this tag.
    pub breaks: BreakHints,
    /// Tag → HTML rendering.
    pub to_html: HtmlRender,
    /// Element → markup rendering.
    pub to_markup: MarkupRender,
}

impl Default for TagDefinition {
    fn default() -> Self {
        Self {
            matches: Vec::new(),
            is_inline: true,
            is_self_closing: false,
            allows_empty: false,
            skip_last_trailing_break: false,
            block_container_only: false,
            exclude_closing: false,
            closed_by: Vec::new(),
            allowed_children: None,
            quote_policy: None,
            breaks: BreakHints::default(),
            to_html: HtmlRender::Template("{0}".to_string()),
            to_markup: MarkupRender::Template("{0}".to_string()),
        }
    }
}

/// The only caller-facing failure mode of the engine: misusing the
/// registry's admin surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Mutation was attempted after the first conversion call.
    #[error("tag registry is sealed; register tags before the first conversion")]
    Sealed,
    /// `rename`/`remove` named a tag that was never registered.
    #[error("unknown tag `{0}`")]
    UnknownTag(String),
}

/// Keyed, insertion-ordered table of tag definitions.
///
/// Insertion order is significant: element → tag matching walks the table
/// in registration order and the first matching definition wins.
#[derive(Debug)]
pub struct TagRegistry {
    tags: HashMap<String, TagDefinition>,
    order: Vec<String>,
    sealed: AtomicBool,
}

impl TagRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tags: HashMap::new(),
            order: Vec::new(),
            sealed: AtomicBool::new(false),
        }
    }

    /// Create a registry pre-loaded with the built-in tag set.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        defaults::install(&mut registry);
        registry
    }

    /// Look up a tag definition by (case-insensitive) name. Unknown names
    /// return `None`; callers treat those tags as literal content.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TagDefinition> {
        self.tags.get(&name.to_ascii_lowercase())
    }

    /// Register or replace a tag definition.
    ///
    /// # Errors
    /// [`RegistryError::Sealed`] once a conversion has run.
    pub fn set(&mut self, name: &str, definition: TagDefinition) -> Result<(), RegistryError> {
        self.ensure_unsealed()?;
        self.install(name, definition);
        Ok(())
    }

    /// Remove a tag, returning its definition.
    ///
    /// # Errors
    /// [`RegistryError::Sealed`] once a conversion has run;
    /// [`RegistryError::UnknownTag`] if the tag was never registered.
    pub fn remove(&mut self, name: &str) -> Result<TagDefinition, RegistryError> {
        self.ensure_unsealed()?;
        let key = name.to_ascii_lowercase();
        let definition = self
            .tags
            .remove(&key)
            .ok_or_else(|| RegistryError::UnknownTag(key.clone()))?;
        self.order.retain(|n| *n != key);
        Ok(definition)
    }

    /// Rename a tag, keeping its position in the matching order.
    ///
    /// # Errors
    /// [`RegistryError::Sealed`] once a conversion has run;
    /// [`RegistryError::UnknownTag`] if `old` was never registered.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), RegistryError> {
        self.ensure_unsealed()?;
        let old_key = old.to_ascii_lowercase();
        let new_key = new.to_ascii_lowercase();
        let definition = self
            .tags
            .remove(&old_key)
            .ok_or_else(|| RegistryError::UnknownTag(old_key.clone()))?;
        if self.tags.remove(&new_key).is_some() {
            self.order.retain(|n| *n != new_key);
        }
        let _ = self.tags.insert(new_key.clone(), definition);
        if let Some(slot) = self.order.iter_mut().find(|n| **n == old_key) {
            *slot = new_key;
        }
        Ok(())
    }

    /// Iterate over `(name, definition)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagDefinition)> {
        self.order
            .iter()
            .filter_map(|name| self.tags.get(name).map(|def| (name.as_str(), def)))
    }

    /// Seal the registry. Conversion entry points call this; afterwards
    /// every mutation fails and concurrent reads need no locking.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    /// Whether the registry has been sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    fn ensure_unsealed(&self) -> Result<(), RegistryError> {
        if self.is_sealed() {
            Err(RegistryError::Sealed)
        } else {
            Ok(())
        }
    }

    /// Insert without the seal check; the construction path for defaults.
    fn install(&mut self, name: &str, definition: TagDefinition) {
        let key = name.to_ascii_lowercase();
        if self.tags.insert(key.clone(), definition).is_none() {
            self.order.push(key);
        }
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
