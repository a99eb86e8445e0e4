use crate::tree::NodeKind;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkError {
    #[error("failed to initialize tree-sitter parser")]
    ParserInit,

    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("tokenization failed at {line}:{column}: {message}")]
    Tokenization {
        offset: usize,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("cannot resolve {kind} node to tokens: {reason}")]
    UnmatchedNode {
        kind: NodeKind,
        reason: String,
        offset: Option<usize>,
    },

    #[error("range invariant violated for {kind} node: {violation}")]
    RangeInvariant { kind: NodeKind, violation: Violation },
}

impl MarkError {
    pub(crate) fn unmatched(kind: NodeKind, reason: impl Into<String>) -> Self {
        MarkError::UnmatchedNode {
            kind,
            reason: reason.into(),
            offset: None,
        }
    }

    pub(crate) fn unmatched_at(kind: NodeKind, offset: usize, reason: impl Into<String>) -> Self {
        MarkError::UnmatchedNode {
            kind,
            reason: reason.into(),
            offset: Some(offset),
        }
    }
}

/// A broken range invariant, reported by the marker and by [`crate::MarkChecker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// first_token > last_token
    Inverted { first: usize, last: usize },
    /// An earlier sibling ends at or after the start of a later one.
    SiblingOverlap { earlier_last: usize, later_first: usize },
    /// A child range escapes its parent.
    NotContained {
        child: (usize, usize),
        parent: (usize, usize),
    },
    /// A range refers past the end of the token stream.
    OutOfBounds { index: usize, len: usize },
    /// A range covers the end-of-stream sentinel.
    IncludesEndMarker,
    /// The same node was reached twice (shared or cyclic tree).
    Revisited,
    /// A node has no range in the table.
    Unmarked,
    /// The root does not span the non-trivial token stream.
    RootCoverage { first: usize, last: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Inverted { first, last } => {
                write!(f, "inverted range: first token {first} after last token {last}")
            }
            Violation::SiblingOverlap {
                earlier_last,
                later_first,
            } => write!(
                f,
                "siblings overlap: earlier ends at token {earlier_last}, later starts at {later_first}"
            ),
            Violation::NotContained { child, parent } => write!(
                f,
                "child range {}..={} not contained in parent range {}..={}",
                child.0, child.1, parent.0, parent.1
            ),
            Violation::OutOfBounds { index, len } => {
                write!(f, "token index {index} out of bounds for stream of {len}")
            }
            Violation::IncludesEndMarker => write!(f, "range includes the end marker"),
            Violation::Revisited => write!(f, "node visited more than once"),
            Violation::Unmarked => write!(f, "node has no range"),
            Violation::RootCoverage { first, last } => write!(
                f,
                "root range {first}..={last} does not span the token stream"
            ),
        }
    }
}
