//! The conversion facade.

use bracken_bbcode::{
    ConversionOptions, RegistryError, TagDefinition, TagRegistry, TokenForest, Tokenizer,
    TreeBuilder,
};
use bracken_dom::ElementTree;

use crate::html::HtmlSerializer;
use crate::markup::MarkupSerializer;

/// The dual-direction markup engine.
///
/// Owns a [`TagRegistry`] and a set of [`ConversionOptions`]. The
/// registry can be customized through the admin methods until the first
/// conversion call seals it; afterwards any number of conversions may run
/// concurrently on separate threads (each call owns its token forest
/// exclusively, and sealed registry reads are lock-free).
///
/// # Examples
///
/// ```
/// use bracken_engine::BBCodeEngine;
///
/// let engine = BBCodeEngine::new();
/// assert_eq!(
///     engine.to_html("[b]hi[/b]"),
///     "<div><strong>hi</strong></div>"
/// );
/// ```
pub struct BBCodeEngine {
    registry: TagRegistry,
    options: ConversionOptions,
}

impl BBCodeEngine {
    /// Engine with the default tag set and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ConversionOptions::default())
    }

    /// Engine with the default tag set and the given options.
    #[must_use]
    pub fn with_options(options: ConversionOptions) -> Self {
        Self {
            registry: TagRegistry::with_defaults(),
            options,
        }
    }

    /// Engine over a caller-built registry.
    #[must_use]
    pub const fn from_parts(registry: TagRegistry, options: ConversionOptions) -> Self {
        Self { registry, options }
    }

    /// The engine's conversion options.
    #[must_use]
    pub const fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// The engine's tag registry.
    #[must_use]
    pub const fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Tokenize and build `markup` into a token forest. Seals the
    /// registry; never fails.
    #[must_use]
    pub fn parse(&self, markup: &str) -> TokenForest {
        self.registry.seal();
        let tokens = Tokenizer::new(&self.registry, markup).run();
        TreeBuilder::new(&self.registry, &self.options, tokens).run()
    }

    /// Full-document conversion: markup text → HTML, with freestanding
    /// inline content wrapped into line containers.
    #[must_use]
    pub fn to_html(&self, markup: &str) -> String {
        let forest = self.parse(markup);
        let html = HtmlSerializer {
            registry: &self.registry,
        }
        .render(&forest, false);
        self.trimmed(html)
    }

    /// Same parse as [`Self::to_html`], without the container wrapping;
    /// newlines render as `<br />`.
    #[must_use]
    pub fn to_html_fragment(&self, markup: &str) -> String {
        let forest = self.parse(markup);
        let html = HtmlSerializer {
            registry: &self.registry,
        }
        .render(&forest, true);
        self.trimmed(html)
    }

    /// Full-document reverse conversion: element tree → markup text. The
    /// trailing line break of the last block is dropped.
    #[must_use]
    pub fn to_markup(&self, fragment: &ElementTree) -> String {
        self.registry.seal();
        let mut out = MarkupSerializer {
            registry: &self.registry,
            options: &self.options,
        }
        .render(fragment, false);
        if out.ends_with('\n') {
            let _ = out.pop();
            if out.ends_with('\r') {
                let _ = out.pop();
            }
        }
        self.trimmed(out)
    }

    /// Fragment reverse conversion. `within_code` marks the fragment as
    /// living inside a `<code>` element, which preserves its whitespace
    /// verbatim.
    #[must_use]
    pub fn to_markup_fragment(&self, fragment: &ElementTree, within_code: bool) -> String {
        self.registry.seal();
        let out = MarkupSerializer {
            registry: &self.registry,
            options: &self.options,
        }
        .render(fragment, within_code);
        self.trimmed(out)
    }

    /// Look up a tag definition.
    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&TagDefinition> {
        self.registry.get(name)
    }

    /// Register or replace a tag (hosting applications add custom tags,
    /// e.g. embeds, during initialization).
    ///
    /// # Errors
    /// [`RegistryError::Sealed`] once any conversion has run.
    pub fn set_tag(&mut self, name: &str, definition: TagDefinition) -> Result<(), RegistryError> {
        self.registry.set(name, definition)
    }

    /// Remove a tag.
    ///
    /// # Errors
    /// [`RegistryError::Sealed`] once any conversion has run;
    /// [`RegistryError::UnknownTag`] if it was never registered.
    pub fn remove_tag(&mut self, name: &str) -> Result<TagDefinition, RegistryError> {
        self.registry.remove(name)
    }

    /// Rename a tag, keeping its matching priority.
    ///
    /// # Errors
    /// [`RegistryError::Sealed`] once any conversion has run;
    /// [`RegistryError::UnknownTag`] if `old` was never registered.
    pub fn rename_tag(&mut self, old: &str, new: &str) -> Result<(), RegistryError> {
        self.registry.rename(old, new)
    }

    fn trimmed(&self, out: String) -> String {
        if self.options.bbcode_trim {
            out.trim().to_string()
        } else {
            out
        }
    }
}

impl Default for BBCodeEngine {
    fn default() -> Self {
        Self::new()
    }
}
