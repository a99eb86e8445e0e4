//! Independent verification of a marked tree.
//!
//! The marker already refuses to produce a broken table; the checker
//! re-derives every range invariant from the finished table so that trees
//! marked elsewhere, or tables rebuilt with [`MarkedTree::remark`], can be
//! audited the same way.

use crate::errors::{MarkError, Violation};
use crate::marked::{MarkedTree, ReplaceTarget};
use crate::tokens::TokenKind;
use crate::tree::{NodeKind, SyntaxTree};
use log::debug;

/// A single broken invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finding<N> {
    pub node: N,
    pub kind: NodeKind,
    pub violation: Violation,
}

impl<N> Finding<N> {
    pub fn into_error(self) -> MarkError {
        MarkError::RangeInvariant {
            kind: self.kind,
            violation: self.violation,
        }
    }
}

pub struct MarkChecker<'m, T: SyntaxTree> {
    marked: &'m MarkedTree<T>,
}

impl<'m, T: SyntaxTree> MarkChecker<'m, T> {
    pub fn new(marked: &'m MarkedTree<T>) -> Self {
        Self { marked }
    }

    /// Every violation in the tree, in pre-order.
    pub fn findings(&self) -> Vec<Finding<T::Node>> {
        let marked = self.marked;
        let tokens = marked.tokens();
        let len = tokens.len();
        let mut findings = Vec::new();

        let mut report = |node: T::Node, violation: Violation| {
            findings.push(Finding {
                node,
                kind: marked.kind(node),
                violation,
            })
        };

        for node in marked.walk(marked.root()) {
            let Some(range) = marked.range(node) else {
                report(node, Violation::Unmarked);
                continue;
            };
            if range.first > range.last {
                report(
                    node,
                    Violation::Inverted {
                        first: range.first,
                        last: range.last,
                    },
                );
            }
            if range.last >= len {
                report(
                    node,
                    Violation::OutOfBounds {
                        index: range.last,
                        len,
                    },
                );
                continue;
            }
            if len > 1 && tokens[range.last].kind == TokenKind::EndMarker {
                report(node, Violation::IncludesEndMarker);
            }

            let children: Vec<_> = marked
                .tree()
                .children(node)
                .filter_map(|child| marked.range(child))
                .collect();
            for child in &children {
                if !range.contains(child) {
                    report(
                        node,
                        Violation::NotContained {
                            child: (child.first, child.last),
                            parent: (range.first, range.last),
                        },
                    );
                }
            }
            for pair in children.windows(2) {
                if pair[0].last >= pair[1].first {
                    report(
                        node,
                        Violation::SiblingOverlap {
                            earlier_last: pair[0].last,
                            later_first: pair[1].first,
                        },
                    );
                }
            }
        }

        // Everything but the end marker belongs to the root.
        if let Some(root) = marked.range(marked.root()) {
            if root.first != 0 || root.last < tokens.last_content_index() {
                report(
                    marked.root(),
                    Violation::RootCoverage {
                        first: root.first,
                        last: root.last,
                    },
                );
            }
        }

        debug!("checked tree, {} findings", findings.len());
        findings
    }

    /// `Ok(nodes checked)` or the first violation as an error.
    pub fn verify(&self) -> Result<usize, MarkError> {
        match self.findings().into_iter().next() {
            Some(finding) => Err(finding.into_error()),
            None => Ok(self.marked.walk(self.marked.root()).count()),
        }
    }

    /// Re-marking yields the same table.
    pub fn is_idempotent(&self) -> bool {
        self.marked
            .remark()
            .is_ok_and(|again| &again == self.marked.ranges())
    }

    /// Replacing each node with its own text reproduces the source.
    pub fn round_trips(&self) -> bool {
        let marked = self.marked;
        marked.walk(marked.root()).all(|node| {
            let Some(text) = marked.get_text(node) else {
                return false;
            };
            marked
                .replace(ReplaceTarget::Node(node), text)
                .is_ok_and(|out| out == marked.text())
        })
    }

    /// `Kind:text` for one node.
    pub fn view(&self, node: T::Node) -> String {
        format!(
            "{}:{}",
            self.marked.kind(node),
            self.marked.get_text(node).unwrap_or_default()
        )
    }

    /// `Kind:text` for the whole tree in pre-order.
    pub fn views(&self) -> Vec<String> {
        self.marked
            .walk(self.marked.root())
            .map(|node| self.view(node))
            .collect()
    }
}
