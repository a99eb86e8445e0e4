use crate::errors::MarkError;
use crate::mark::rules::{is_hard_keyword, LeafToken};
use crate::mark::TokenRange;
use crate::tokens::{TokenKind, TokenStream};
use crate::tree::NodeKind;
use log::trace;

/// Forward-only position in the token stream for leaves without hints.
///
/// Leaves must be resolved in token order. Tokens the cursor skips while
/// searching are never reconsidered, so a leaf processed out of order fails
/// instead of binding to a later token with the same text.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'s> {
    tokens: &'s TokenStream,
    pos: usize,
}

impl<'s> Cursor<'s> {
    pub fn new(tokens: &'s TokenStream) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move past `index` if the cursor has not got there yet.
    pub fn advance_past(&mut self, index: usize) {
        self.pos = self.pos.max(index + 1);
    }

    /// Next non-trivia index at or after `from`, stopping at the end marker.
    fn significant(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len())
            .map(|i| &self.tokens[i])
            .take_while(|tok| tok.kind != TokenKind::EndMarker)
            .find(|tok| !tok.is_trivia())
            .map(|tok| tok.index)
    }

    fn exhausted(&self, kind: NodeKind, what: &str) -> MarkError {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.tokens.end_marker().start, |tok| tok.start);
        MarkError::unmatched_at(kind, offset, format!("no token matches {what} after the cursor"))
    }

    /// Resolve a leaf by its source text, ignoring whitespace. The text may
    /// span several tokens.
    pub fn match_text(&mut self, kind: NodeKind, text: &str) -> Result<TokenRange, MarkError> {
        if text.chars().all(char::is_whitespace) {
            return Err(MarkError::unmatched(kind, "leaf has empty text"));
        }
        let mut from = self.pos;
        while let Some(start) = self.significant(from) {
            if let Some(last) = self.match_from(start, text) {
                trace!("cursor: {kind} {text:?} -> tokens {start}..={last}");
                self.pos = last + 1;
                return Ok(TokenRange::new(start, last));
            }
            from = start + 1;
        }
        Err(self.exhausted(kind, &format!("{text:?}")))
    }

    fn match_from(&self, start: usize, text: &str) -> Option<usize> {
        let mut rest = text.trim_start();
        let mut index = start;
        loop {
            let tok = self.tokens.get(index)?;
            if tok.kind == TokenKind::EndMarker {
                return None;
            }
            if !tok.is_trivia() {
                rest = strip_compact(rest, &tok.text)?;
                if rest.chars().all(char::is_whitespace) {
                    return Some(index);
                }
            }
            index += 1;
        }
    }

    /// Resolve a leaf that carries nothing but its kind.
    pub fn match_leaf(&mut self, kind: NodeKind, leaf: LeafToken) -> Result<TokenRange, MarkError> {
        let mut from = self.pos;
        while let Some(start) = self.significant(from) {
            if let Some(last) = self.match_shape(start, leaf) {
                trace!("cursor: {kind} {leaf:?} -> tokens {start}..={last}");
                self.pos = last + 1;
                return Ok(TokenRange::new(start, last));
            }
            from = start + 1;
        }
        Err(self.exhausted(kind, &format!("{leaf:?}")))
    }

    fn match_shape(&self, start: usize, leaf: LeafToken) -> Option<usize> {
        let tok = &self.tokens[start];
        match leaf {
            LeafToken::Kind(TokenKind::Name) => {
                (tok.kind == TokenKind::Name && !is_hard_keyword(&tok.text)).then_some(start)
            }
            LeafToken::Kind(kind) => (tok.kind == kind).then_some(start),
            LeafToken::Keyword(kw) => tok.matches(TokenKind::Name, Some(kw)).then_some(start),
            LeafToken::Op(op) => tok.is_op(op).then_some(start),
            LeafToken::Pair(open, close) => {
                if !tok.is_op(open) {
                    return None;
                }
                let next = self.significant(start + 1)?;
                self.tokens[next].is_op(close).then_some(next)
            }
            LeafToken::Run(op) => {
                if !tok.is_op(op) {
                    return None;
                }
                let mut last = start;
                while let Some(next) = self.significant(last + 1) {
                    if !self.tokens[next].is_op(op) {
                        break;
                    }
                    last = next;
                }
                Some(last)
            }
            LeafToken::Any => Some(start),
        }
    }
}

/// Strip `token_text`, minus its whitespace, from the front of `rest`, also
/// skipping whitespace in `rest`.
fn strip_compact<'a>(rest: &'a str, token_text: &str) -> Option<&'a str> {
    let mut chars = rest.chars();
    for expected in token_text.chars().filter(|c| !c.is_whitespace()) {
        let actual = chars.by_ref().find(|c| !c.is_whitespace())?;
        if actual != expected {
            return None;
        }
    }
    Some(chars.as_str())
}
