//! Assigns every tree node the range of tokens that produced it.
//!
//! The pass is post-order: leaves resolve first, through their position hint
//! or the forward-only cursor, then each internal node takes the span of its
//! children, closes any brackets left open between them, and widens by its
//! [`rules::rule`]. Ranges land in a [`NodeRanges`] side table; the tree
//! itself is never touched.

mod cursor;
mod marker;
pub mod rules;

pub use rules::{BoundaryRule, LeafToken, Step, Tok};

use crate::errors::MarkError;
use crate::tokens::TokenStream;
use crate::tree::SyntaxTree;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Inclusive range of token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TokenRange {
    pub first: usize,
    pub last: usize,
}

impl TokenRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn contains(&self, other: &TokenRange) -> bool {
        self.first <= other.first && other.last <= self.last
    }
}

/// Token ranges keyed by node identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRanges<N: Eq + Hash> {
    map: HashMap<N, TokenRange>,
}

impl<N: Copy + Eq + Hash> NodeRanges<N> {
    pub(crate) fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, node: N, range: TokenRange) {
        self.map.insert(node, range);
    }

    pub fn get(&self, node: N) -> Option<TokenRange> {
        self.map.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (N, TokenRange)> + '_ {
        self.map.iter().map(|(node, range)| (*node, *range))
    }
}

/// Mark every node reachable from `tree.root()`.
///
/// On error nothing is returned; there is no partially marked table.
pub fn mark<T: SyntaxTree>(tree: &T, tokens: &TokenStream) -> Result<NodeRanges<T::Node>, MarkError> {
    marker::Marker::new(tree, tokens).run()
}
