//! Token stream for Python source, read off the tree-sitter leaves.
//!
//! Tree-sitter keeps every lexeme as a leaf (named or anonymous), so walking
//! the leaves in order yields the tokens. What tree-sitter hides, the line
//! structure, is rebuilt from the gaps: each `\n` outside a token becomes a
//! `Newline` when it ends a logical line with code on it and bracket depth
//! is zero, and an `Nl` otherwise. A backslash continuation produces nothing.

use crate::errors::MarkError;
use crate::python::ParsedSource;
use crate::tokens::{RawToken, TokenKind};
use tree_sitter::Node;

/// Tokenize a parsed source. Fails on any syntax error.
pub fn tokenize(parsed: &ParsedSource<'_>) -> Result<Vec<RawToken>, MarkError> {
    parsed.check()?;
    let source = parsed.source;
    let pieces = lexemes(parsed.root_node(), source);

    let mut lines = LineState::default();
    let mut out = Vec::with_capacity(pieces.len() * 2);
    let mut pos = 0;
    for piece in pieces {
        if piece.start < pos {
            continue;
        }
        lines.gap(source, pos, piece.start, &mut out);
        lines.token(source, &piece);
        out.push(piece);
        pos = piece.end;
    }
    lines.gap(source, pos, source.len(), &mut out);
    out.push(RawToken::new(TokenKind::EndMarker, source.len(), source.len()));
    Ok(out)
}

/// Leaves in document order, with strings kept whole and continuations dropped.
fn lexemes(root: Node<'_>, source: &str) -> Vec<RawToken> {
    let mut pieces = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let (start, end) = (node.start_byte(), node.end_byte());
        match node.kind() {
            "string" if node.is_named() => {
                pieces.push(RawToken::new(TokenKind::String, start, end));
                continue;
            }
            "comment" if node.is_named() => {
                pieces.push(RawToken::new(TokenKind::Comment, start, end));
                continue;
            }
            "line_continuation" => continue,
            _ => {}
        }

        if node.child_count() == 0 {
            let text = &source[start..end];
            if text.trim().is_empty() {
                continue;
            }
            // `except*` is one grammar token but two Python tokens.
            if let Some(keyword) = text.strip_suffix('*').filter(|kw| *kw == "except") {
                let split = start + keyword.len();
                pieces.push(RawToken::new(TokenKind::Name, start, split));
                pieces.push(RawToken::new(TokenKind::Op, split, end));
                continue;
            }
            // Aliased operators such as `is not` may surface as one leaf.
            if text.contains(char::is_whitespace) {
                for (at, word) in words(text) {
                    pieces.push(RawToken::new(classify(word), start + at, start + at + word.len()));
                }
                continue;
            }
            pieces.push(RawToken::new(classify(text), start, end));
            continue;
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    pieces.sort_by_key(|piece| piece.start);
    pieces
}

/// Whitespace-separated words with their byte offsets.
fn words(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split(char::is_whitespace)
        .filter(|word| !word.is_empty())
        .map(move |word| (word.as_ptr() as usize - text.as_ptr() as usize, word))
}

fn classify(text: &str) -> TokenKind {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => TokenKind::Name,
        Some(c) if c.is_ascii_digit() => TokenKind::Number,
        Some('.') if chars.next().is_some_and(|c| c.is_ascii_digit()) => TokenKind::Number,
        _ => TokenKind::Op,
    }
}

#[derive(Debug, Default)]
struct LineState {
    depth: usize,
    /// The current logical line has a non-comment token
    has_code: bool,
}

impl LineState {
    fn token(&mut self, source: &str, piece: &RawToken) {
        if piece.kind == TokenKind::Comment {
            return;
        }
        self.has_code = true;
        if piece.kind == TokenKind::Op {
            match &source[piece.start..piece.end] {
                "(" | "[" | "{" => self.depth += 1,
                ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                _ => {}
            }
        }
    }

    fn gap(&mut self, source: &str, start: usize, end: usize, out: &mut Vec<RawToken>) {
        let bytes = source.as_bytes();
        for idx in start..end {
            if bytes[idx] != b'\n' {
                continue;
            }
            let cr = idx > start && bytes[idx - 1] == b'\r';
            let before = if cr { idx - 1 } else { idx };
            if before > start && bytes[before - 1] == b'\\' {
                continue;
            }
            let kind = if self.depth == 0 && self.has_code {
                self.has_code = false;
                TokenKind::Newline
            } else {
                TokenKind::Nl
            };
            out.push(RawToken::new(kind, before, idx + 1));
        }
    }
}
