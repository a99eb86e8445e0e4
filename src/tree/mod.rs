//! The tree side of marking: the [`SyntaxTree`] contract a parser adapter
//! satisfies, a closed set of node kinds, and an arena tree implementation.

pub mod arena;
pub mod kind;
pub mod walk;

pub use arena::{NodeData, NodeId, Tree, TreeBuilder};
pub use kind::{NodeKind, UnknownNodeKind};
pub use walk::Walk;

use std::fmt::Debug;
use std::hash::Hash;

/// Half-open byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// A tree produced by an external parser.
///
/// The marker never mutates the tree; ranges go into a side table keyed by
/// `Node`, so `Node` must identify a node uniquely (an arena index, a pointer
/// wrapper, a tree-sitter node id).
///
/// Children must be listed in source order. Leaves resolve either through
/// [`position`](SyntaxTree::position) or, when that is `None`, by scanning
/// forward through the token stream for [`text`](SyntaxTree::text).
pub trait SyntaxTree {
    type Node: Copy + Eq + Hash + Debug;

    fn root(&self) -> Self::Node;

    fn children(&self, node: Self::Node) -> impl Iterator<Item = Self::Node> + '_;

    fn kind(&self, node: Self::Node) -> NodeKind;

    /// Byte range the parser reported for the node.
    ///
    /// On a leaf this is the marking hint. Internal nodes are marked from
    /// their children and only use it for unmarked text.
    fn position(&self, _node: Self::Node) -> Option<TextRange> {
        None
    }

    /// Source text of a leaf, used when no position hint is available.
    fn text(&self, _node: Self::Node) -> Option<&str> {
        None
    }
}
