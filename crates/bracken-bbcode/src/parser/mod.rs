//! Tree construction: flat token sequences → nested token forests.

/// The stack-based tree builder.
pub mod builder;
/// Structural fix-up passes run after the main build.
mod fixup;
/// Arena storage for built token trees.
pub mod forest;

pub use builder::TreeBuilder;
pub use forest::{TokenForest, TokenId, TreeNode, format_forest};
