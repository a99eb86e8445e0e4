//! Python front end: tree-sitter parsing, tokenization and lowering into the
//! arena tree the marker consumes.

mod lower;
mod parser;
mod pool;
mod tokenize;

pub use lower::{lower, node_kind};
pub use parser::{ErrorNode, ParsedSource, PythonParser};
pub use pool::with_parser;
pub use tokenize::tokenize;

use crate::errors::MarkError;
use crate::marked::{CodeText, MarkedTree};
use crate::tokens::RawToken;
use crate::tree::Tree;
use log::debug;
use serde::Deserialize;

/// Whether lowered leaves carry byte-range hints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintMode {
    /// Every leaf carries its byte range; resolution is a lookup.
    #[default]
    Leaves,
    /// Leaves carry text only and are found by scanning the token stream.
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkOptions {
    pub hints: HintMode,
}

/// Tokenize and lower `source` without marking.
pub fn parse_source(
    source: &str,
    options: &MarkOptions,
) -> Result<(Vec<RawToken>, Tree), MarkError> {
    with_parser(|parser| {
        let parsed = parser.parse_with_source(source)?;
        let raw = tokenize(&parsed)?;
        let tree = lower(&parsed, options);
        debug!(
            "parsed {} bytes into {} tokens and {} nodes",
            source.len(),
            raw.len(),
            tree.len()
        );
        Ok((raw, tree))
    })?
}

/// Parse, tokenize, lower and mark Python source in one call.
///
/// # Example
///
/// ```
/// use tree_tokens::python::{mark_source, MarkOptions};
/// use tree_tokens::SyntaxTree;
///
/// let marked = mark_source("x = f(a)\n", &MarkOptions::default()).unwrap();
/// let stmt = marked.tree().children(marked.root()).next().unwrap();
/// assert_eq!(marked.get_text(stmt), Some("x = f(a)"));
/// ```
pub fn mark_source(source: &str, options: &MarkOptions) -> Result<MarkedTree<Tree>, MarkError> {
    let (raw, tree) = parse_source(source, options)?;
    CodeText::new(source, raw)?.mark(tree)
}
