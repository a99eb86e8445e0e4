//! Tree Tokens: map every node of a syntax tree to the tokens and exact
//! source text that produced it.
//!
//! A parser hands over two things: a tree (anything implementing
//! [`SyntaxTree`]) and a flat list of [`RawToken`]s. The marker walks the tree
//! bottom-up and gives each node an inclusive token range, widening past its
//! children to pick up keywords, brackets and separators the tree does not
//! represent. Ranges live in a side table; the tree is never touched.
//!
//! # Architecture
//!
//! - [`LineNumbers`]: offset and (line, column) conversion
//! - [`TokenStream`]: validated, indexed tokens with trivia navigation
//! - [`mark`]: the range-assignment pass and its boundary-rule table
//! - [`MarkedTree`]: text, token and walk queries plus non-destructive replace
//! - [`python`]: a tree-sitter front end producing both inputs for Python
//!
//! # Example
//!
//! ```
//! use tree_tokens::python::{mark_source, MarkOptions};
//! use tree_tokens::{NodeKind, ReplaceTarget};
//!
//! let source = "Robot('blue').walk(steps=10*n)\n";
//! let marked = mark_source(source, &MarkOptions::default()).unwrap();
//!
//! let attr = marked
//!     .walk(marked.root())
//!     .find(|&node| marked.kind(node) == NodeKind::Attribute)
//!     .unwrap();
//! assert_eq!(marked.get_text(attr), Some("Robot('blue').walk"));
//!
//! let out = marked.replace(ReplaceTarget::Node(attr), "RUN").unwrap();
//! assert_eq!(out, "RUN(steps=10*n)\n");
//! ```

pub mod check;
pub mod config;
pub mod edit;
pub mod errors;
pub mod line_numbers;
pub mod mark;
pub mod marked;
pub mod python;
pub mod tokens;
pub mod tree;

// Re-exports
pub use check::{Finding, MarkChecker};
pub use edit::{apply_edits, write_atomic, EditError, EditVerification, TextEdit};
pub use errors::{MarkError, Violation};
pub use line_numbers::{LineCol, LineNumbers};
pub use mark::{NodeRanges, TokenRange};
pub use marked::{CodeText, MarkedTree, ReplaceTarget};
pub use tokens::{RawToken, Token, TokenKind, TokenStream};
pub use tree::{NodeId, NodeKind, SyntaxTree, TextRange, Tree, TreeBuilder, Walk};
