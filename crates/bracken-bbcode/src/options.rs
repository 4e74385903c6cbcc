//! Engine-wide conversion options.

use serde::Deserialize;

use crate::registry::QuoteMode;

/// Options recognized on the engine instance.
///
/// The four `break_*_block` switches force a line break at the given
/// position around block-level tags; per-tag [`BreakHint`]s override them.
/// The `fix_*` switches and `remove_empty_tags` enable the structural
/// fix-up passes of the tree builder.
///
/// Deserializes from camelCase JSON so hosting applications can ship an
/// options file (see the CLI's `--options`).
///
/// [`BreakHint`]: crate::registry::BreakHint
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Force a line break before every block-level tag.
    pub break_before_block: bool,
    /// Force a line break right after a block-level opening tag.
    pub break_start_block: bool,
    /// Force a line break right before a block-level closing tag.
    pub break_end_block: bool,
    /// Force a line break after every block-level tag.
    pub break_after_block: bool,
    /// Remove tags whose subtree holds no content (see `allows_empty`).
    pub remove_empty_tags: bool,
    /// Hoist block tags out of inline ancestors by splitting them.
    pub fix_invalid_nesting: bool,
    /// Enforce each tag's `allowed_children` whitelist.
    pub fix_invalid_children: bool,
    /// Default attribute quoting policy for emitted markup.
    pub quote_type: QuoteMode,
    /// Element → tag matching: require all of a matcher's predicates
    /// instead of any.
    pub strict_match: bool,
    /// Trim leading/trailing whitespace from the overall result.
    pub bbcode_trim: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            break_before_block: false,
            break_start_block: false,
            break_end_block: false,
            break_after_block: false,
            remove_empty_tags: true,
            fix_invalid_nesting: true,
            fix_invalid_children: true,
            quote_type: QuoteMode::Auto,
            strict_match: false,
            bbcode_trim: false,
        }
    }
}
