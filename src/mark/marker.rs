use crate::errors::{MarkError, Violation};
use crate::mark::cursor::Cursor;
use crate::mark::rules::{leaf_token, rule, Step, Tok};
use crate::mark::{NodeRanges, TokenRange};
use crate::tokens::{TokenKind, TokenStream};
use crate::tree::{NodeKind, SyntaxTree};
use log::{debug, trace};
use std::collections::HashSet;

struct Frame<N> {
    node: N,
    kind: NodeKind,
    children: Vec<N>,
    next: usize,
}

pub(crate) struct Marker<'a, T: SyntaxTree> {
    tree: &'a T,
    tokens: &'a TokenStream,
    cursor: Cursor<'a>,
    ranges: NodeRanges<T::Node>,
}

impl<'a, T: SyntaxTree> Marker<'a, T> {
    pub fn new(tree: &'a T, tokens: &'a TokenStream) -> Self {
        Self {
            tree,
            tokens,
            cursor: Cursor::new(tokens),
            ranges: NodeRanges::new(),
        }
    }

    fn frame(&self, node: T::Node) -> Frame<T::Node> {
        Frame {
            node,
            kind: self.tree.kind(node),
            children: self.tree.children(node).collect(),
            next: 0,
        }
    }

    pub fn run(mut self) -> Result<NodeRanges<T::Node>, MarkError> {
        let root = self.tree.root();
        let mut seen = HashSet::new();
        seen.insert(root);
        let mut stack = vec![self.frame(root)];

        while let Some(top) = stack.last_mut() {
            if let Some(&child) = top.children.get(top.next) {
                top.next += 1;
                if !seen.insert(child) {
                    return Err(MarkError::RangeInvariant {
                        kind: self.tree.kind(child),
                        violation: Violation::Revisited,
                    });
                }
                let frame = self.frame(child);
                stack.push(frame);
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let range = self.resolve(&frame)?;
            trace!(
                "{} -> tokens {}..={} (cursor at {})",
                frame.kind,
                range.first,
                range.last,
                self.cursor.position()
            );
            self.cursor.advance_past(range.last);
            self.ranges.insert(frame.node, range);
        }

        debug!(
            "marked {} nodes over {} tokens",
            self.ranges.len(),
            self.tokens.len()
        );
        Ok(self.ranges)
    }

    fn resolve(&mut self, frame: &Frame<T::Node>) -> Result<TokenRange, MarkError> {
        let range = if frame.children.is_empty() && frame.kind != NodeKind::Module {
            self.resolve_leaf(frame.node, frame.kind)?
        } else {
            self.resolve_internal(frame)?
        };
        self.check_bounds(frame.kind, range)?;
        Ok(range)
    }

    fn resolve_leaf(&mut self, node: T::Node, kind: NodeKind) -> Result<TokenRange, MarkError> {
        if let Some(hint) = self.tree.position(node) {
            if hint.is_empty() {
                return Err(MarkError::unmatched_at(kind, hint.start, "empty position hint"));
            }
            let first = self.tokens.covering(hint.start).ok_or_else(|| {
                MarkError::unmatched_at(kind, hint.start, "position hint does not start inside a token")
            })?;
            let last = self.tokens.covering(hint.end - 1).ok_or_else(|| {
                MarkError::unmatched_at(kind, hint.end, "position hint does not end inside a token")
            })?;
            return Ok(TokenRange::new(first, last));
        }

        match self.tree.text(node) {
            Some(text) => self.cursor.match_text(kind, text),
            None => self.cursor.match_leaf(kind, leaf_token(kind)),
        }
    }

    fn resolve_internal(&self, frame: &Frame<T::Node>) -> Result<TokenRange, MarkError> {
        let kind = frame.kind;
        let mut children = Vec::with_capacity(frame.children.len());
        for &child in &frame.children {
            let range = self.ranges.get(child).ok_or(MarkError::RangeInvariant {
                kind: self.tree.kind(child),
                violation: Violation::Unmarked,
            })?;
            children.push(range);
        }

        for pair in children.windows(2) {
            if pair[0].last >= pair[1].first {
                return Err(MarkError::RangeInvariant {
                    kind,
                    violation: Violation::SiblingOverlap {
                        earlier_last: pair[0].last,
                        later_first: pair[1].first,
                    },
                });
            }
        }

        let raw = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                TokenRange::new(first.first, self.close_brackets(kind, &children, last.last)?)
            }
            // A module with no statements.
            _ => TokenRange::new(0, 0),
        };
        let range = self.widen(kind, raw)?;

        for child in &children {
            if !range.contains(child) {
                return Err(MarkError::RangeInvariant {
                    kind,
                    violation: Violation::NotContained {
                        child: (child.first, child.last),
                        parent: (range.first, range.last),
                    },
                });
            }
        }
        Ok(range)
    }

    /// Brackets opened in the gaps between children and not closed there are
    /// closed after the last child, possibly past trailing commas. Returns
    /// the new last index.
    fn close_brackets(
        &self,
        kind: NodeKind,
        children: &[TokenRange],
        mut last: usize,
    ) -> Result<usize, MarkError> {
        let mut open: Vec<&'static str> = Vec::new();
        for pair in children.windows(2) {
            for tok in self.tokens.token_range(pair[0].last + 1, pair[1].first - 1, false) {
                if tok.kind != TokenKind::Op {
                    continue;
                }
                match tok.text.as_str() {
                    "(" => open.push(")"),
                    "[" => open.push("]"),
                    "{" => open.push("}"),
                    closer @ (")" | "]" | "}") => {
                        if open.last() == Some(&closer) {
                            open.pop();
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut at = last;
        while let Some(&closer) = open.last() {
            let next = self
                .tokens
                .next_index(at, false)
                .ok_or_else(|| MarkError::unmatched(kind, format!("missing `{closer}`")))?;
            let tok = &self.tokens[next];
            if tok.is_op(closer) {
                open.pop();
                last = next;
            } else if !tok.is_op(",") {
                return Err(MarkError::unmatched_at(
                    kind,
                    tok.start,
                    format!("expected `{closer}`, found {tok}"),
                ));
            }
            at = next;
        }
        Ok(last)
    }

    fn widen(&self, kind: NodeKind, raw: TokenRange) -> Result<TokenRange, MarkError> {
        let boundary = rule(kind);
        let mut first = raw.first;
        for step in boundary.lead {
            first = self.step_back(kind, first, step)?;
        }
        let mut last = raw.last;
        for step in boundary.trail {
            last = self.step_forward(kind, last, step)?;
        }
        Ok(TokenRange::new(first, last))
    }

    fn step_back(&self, kind: NodeKind, index: usize, step: &Step) -> Result<usize, MarkError> {
        let prev = |tok: &Tok| {
            self.tokens
                .prev_index(index, false)
                .filter(|&p| tok.matches(&self.tokens[p]))
        };
        Ok(match step {
            Step::Require(tok) => prev(tok).ok_or_else(|| {
                MarkError::unmatched_at(
                    kind,
                    self.tokens[index].start,
                    format!("expected `{tok}` before {}", self.tokens[index]),
                )
            })?,
            Step::Accept(tok) => prev(tok).unwrap_or(index),
            Step::AcceptAll(tok) => {
                let mut at = index;
                while let Some(p) = self.tokens.prev_index(at, false) {
                    if !tok.matches(&self.tokens[p]) {
                        break;
                    }
                    at = p;
                }
                at
            }
            Step::EmptyPair(open, close) => self
                .tokens
                .prev_index(index, false)
                .filter(|&c| self.tokens[c].is_op(close))
                .and_then(|c| self.tokens.prev_index(c, false))
                .filter(|&o| self.tokens[o].is_op(open))
                .unwrap_or(index),
            Step::LineEnd => self.line_start(index),
            Step::StreamEdge => 0,
        })
    }

    fn step_forward(&self, kind: NodeKind, index: usize, step: &Step) -> Result<usize, MarkError> {
        let next = |tok: &Tok| {
            self.tokens
                .next_index(index, false)
                .filter(|&n| tok.matches(&self.tokens[n]))
        };
        Ok(match step {
            Step::Require(tok) => next(tok).ok_or_else(|| {
                MarkError::unmatched_at(
                    kind,
                    self.tokens[index].end,
                    format!("expected `{tok}` after {}", self.tokens[index]),
                )
            })?,
            Step::Accept(tok) => next(tok).unwrap_or(index),
            Step::AcceptAll(tok) => {
                let mut at = index;
                while let Some(n) = self.tokens.next_index(at, false) {
                    if !tok.matches(&self.tokens[n]) {
                        break;
                    }
                    at = n;
                }
                at
            }
            Step::EmptyPair(open, close) => self
                .tokens
                .next_index(index, false)
                .filter(|&o| self.tokens[o].is_op(open))
                .and_then(|o| self.tokens.next_index(o, false))
                .filter(|&c| self.tokens[c].is_op(close))
                .unwrap_or(index),
            Step::LineEnd => self.line_end(index),
            Step::StreamEdge => self.tokens.last_content_index().max(index),
        })
    }

    /// Last non-trivia token before the `Newline`, `;` or end marker that
    /// ends the logical line containing `index`.
    fn line_end(&self, index: usize) -> usize {
        let stop = (index + 1..self.tokens.len())
            .find(|&i| {
                let tok = &self.tokens[i];
                matches!(tok.kind, TokenKind::Newline | TokenKind::EndMarker) || tok.is_op(";")
            })
            .unwrap_or(self.tokens.len() - 1);
        self.tokens
            .prev_index(stop, false)
            .map_or(index, |prev| prev.max(index))
    }

    /// First non-trivia token of the logical line containing `index`.
    fn line_start(&self, index: usize) -> usize {
        let after_break = (0..index)
            .rev()
            .find(|&i| {
                let tok = &self.tokens[i];
                tok.kind == TokenKind::Newline || tok.is_op(";")
            })
            .map_or(0, |i| i + 1);
        (after_break..=index)
            .find(|&i| !self.tokens[i].is_trivia())
            .unwrap_or(index)
    }

    fn check_bounds(&self, kind: NodeKind, range: TokenRange) -> Result<(), MarkError> {
        let len = self.tokens.len();
        let violation = if range.first > range.last {
            Some(Violation::Inverted {
                first: range.first,
                last: range.last,
            })
        } else if range.last >= len {
            Some(Violation::OutOfBounds {
                index: range.last,
                len,
            })
        } else if len > 1 && self.tokens[range.last].kind == TokenKind::EndMarker {
            Some(Violation::IncludesEndMarker)
        } else {
            None
        };
        match violation {
            Some(violation) => Err(MarkError::RangeInvariant { kind, violation }),
            None => Ok(()),
        }
    }
}
