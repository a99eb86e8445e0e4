use crate::errors::MarkError;
use crate::line_numbers::LineNumbers;
use crate::tokens::token::{RawToken, Token, TokenKind};
use std::ops::Index;

/// Validated, indexed token sequence over one source text.
///
/// Tokens are strictly ordered by start offset, do not overlap, and the last
/// one is a zero-width [`TokenKind::EndMarker`] at the end of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
    /// `tokens[i].start`, kept separately for binary search
    starts: Vec<usize>,
}

impl TokenStream {
    /// Build the stream, checking the tokenizer contract along the way.
    pub fn new(
        text: &str,
        line_numbers: &LineNumbers,
        raw: impl IntoIterator<Item = RawToken>,
    ) -> Result<Self, MarkError> {
        let fail = |offset: usize, message: String| {
            let pos = line_numbers.offset_to_line_col(offset);
            MarkError::Tokenization {
                offset,
                line: pos.line,
                column: pos.col,
                message,
            }
        };

        let mut tokens: Vec<Token> = Vec::new();
        for raw in raw {
            if raw.start > raw.end || raw.end > text.len() {
                return Err(fail(
                    raw.start.min(text.len()),
                    format!("token span {}..{} is outside the text", raw.start, raw.end),
                ));
            }
            if !text.is_char_boundary(raw.start) || !text.is_char_boundary(raw.end) {
                return Err(fail(
                    raw.start,
                    format!("token span {}..{} splits a character", raw.start, raw.end),
                ));
            }
            if let Some(prev) = tokens.last() {
                if prev.kind == TokenKind::EndMarker {
                    return Err(fail(raw.start, "token after the end marker".to_string()));
                }
                if raw.start <= prev.start || raw.start < prev.end {
                    return Err(fail(
                        raw.start,
                        format!(
                            "token at {}..{} overlaps or precedes {} at {}..{}",
                            raw.start, raw.end, prev, prev.start, prev.end
                        ),
                    ));
                }
            }

            let index = tokens.len();
            tokens.push(Token {
                kind: raw.kind,
                text: text[raw.start..raw.end].to_string(),
                start: raw.start,
                end: raw.end,
                start_pos: line_numbers.offset_to_line_col(raw.start),
                end_pos: line_numbers.offset_to_line_col(raw.end),
                index,
            });
        }

        match tokens.last() {
            Some(last)
                if last.kind == TokenKind::EndMarker
                    && last.start == text.len()
                    && last.end == text.len() => {}
            _ => {
                return Err(fail(
                    text.len(),
                    "stream does not end with a zero-width end marker".to_string(),
                ))
            }
        }

        let starts = tokens.iter().map(|tok| tok.start).collect();
        Ok(Self { tokens, starts })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false for a validated stream; it holds at least the end marker.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn end_marker(&self) -> &Token {
        &self.tokens[self.tokens.len() - 1]
    }

    /// Index of the last token before the end marker, or of the end marker itself
    /// for an empty text.
    pub fn last_content_index(&self) -> usize {
        self.tokens.len().saturating_sub(2)
    }

    /// Token containing `offset`, or the preceding token when `offset` falls
    /// between tokens. Offsets before the first token yield the first token.
    pub fn token_at_offset(&self, offset: usize) -> &Token {
        let idx = self.starts.partition_point(|&start| start <= offset);
        &self.tokens[idx.saturating_sub(1)]
    }

    /// Index of the token strictly containing `offset`, if any.
    pub fn covering(&self, offset: usize) -> Option<usize> {
        let idx = self.starts.partition_point(|&start| start <= offset);
        let idx = idx.checked_sub(1)?;
        (self.tokens[idx].end > offset).then_some(idx)
    }

    pub fn next_index(&self, index: usize, include_trivia: bool) -> Option<usize> {
        (index + 1..self.tokens.len()).find(|&i| include_trivia || !self.tokens[i].is_trivia())
    }

    pub fn prev_index(&self, index: usize, include_trivia: bool) -> Option<usize> {
        (0..index.min(self.tokens.len()))
            .rev()
            .find(|&i| include_trivia || !self.tokens[i].is_trivia())
    }

    /// Token after `tok`, skipping comments and line breaks unless `include_trivia`.
    pub fn next_token(&self, tok: &Token, include_trivia: bool) -> Option<&Token> {
        self.next_index(tok.index, include_trivia)
            .map(|i| &self.tokens[i])
    }

    /// Token before `tok`, skipping comments and line breaks unless `include_trivia`.
    pub fn prev_token(&self, tok: &Token, include_trivia: bool) -> Option<&Token> {
        self.prev_index(tok.index, include_trivia)
            .map(|i| &self.tokens[i])
    }

    /// First token at or after `start` (at or before, if `reverse`) with the
    /// given kind and optional text. Trivia tokens are considered.
    pub fn find_token(
        &self,
        start: usize,
        kind: TokenKind,
        text: Option<&str>,
        reverse: bool,
    ) -> Option<&Token> {
        if reverse {
            self.tokens[..=start.min(self.tokens.len() - 1)]
                .iter()
                .rev()
                .find(|tok| tok.matches(kind, text))
        } else {
            self.tokens
                .get(start..)?
                .iter()
                .find(|tok| tok.matches(kind, text))
        }
    }

    /// Tokens `first..=last` in order. The iterator is `Clone`, so it can be
    /// restarted without touching the stream.
    pub fn token_range(
        &self,
        first: usize,
        last: usize,
        include_trivia: bool,
    ) -> impl Iterator<Item = &Token> + Clone + '_ {
        let end = (last + 1).min(self.tokens.len());
        self.tokens[first.min(end)..end]
            .iter()
            .filter(move |tok| include_trivia || !tok.is_trivia())
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::token::TokenKind::{Comment, EndMarker, Name, Newline, Op};

    // "foo(x)  # c\n"
    fn sample() -> (String, TokenStream) {
        let text = "foo(x)  # c\n".to_string();
        let ln = LineNumbers::new(&text);
        let raw = vec![
            RawToken::new(Name, 0, 3),
            RawToken::new(Op, 3, 4),
            RawToken::new(Name, 4, 5),
            RawToken::new(Op, 5, 6),
            RawToken::new(Comment, 8, 11),
            RawToken::new(Newline, 11, 12),
            RawToken::new(EndMarker, 12, 12),
        ];
        let stream = TokenStream::new(&text, &ln, raw).unwrap();
        (text, stream)
    }

    #[test]
    fn builds_text_and_positions() {
        let (_, stream) = sample();
        assert_eq!(stream.len(), 7);
        assert_eq!(stream[0].text, "foo");
        assert_eq!(stream[4].text, "# c");
        assert_eq!(stream[4].start_pos.col, 8);
        assert_eq!(stream.end_marker().kind, EndMarker);
        assert_eq!(stream.last_content_index(), 5);
    }

    #[test]
    fn offset_lookup() {
        let (_, stream) = sample();
        assert_eq!(stream.token_at_offset(0).text, "foo");
        assert_eq!(stream.token_at_offset(2).text, "foo");
        assert_eq!(stream.token_at_offset(4).text, "x");
        // Whitespace between `)` and the comment falls back to `)`.
        assert_eq!(stream.token_at_offset(7).text, ")");
        assert_eq!(stream.covering(7), None);
        assert_eq!(stream.covering(9), Some(4));
    }

    #[test]
    fn navigation_skips_trivia() {
        let (_, stream) = sample();
        let close = &stream[3];
        assert_eq!(stream.next_token(close, false).map(|t| t.kind), Some(EndMarker));
        assert_eq!(stream.next_token(close, true).map(|t| t.kind), Some(Comment));
        let end = stream.end_marker();
        assert_eq!(stream.prev_token(end, false).map(|t| t.text.as_str()), Some(")"));
        assert!(stream.prev_token(&stream[0], true).is_none());
    }

    #[test]
    fn find_token_both_directions() {
        let (_, stream) = sample();
        assert_eq!(stream.find_token(0, Op, Some(")"), false).map(|t| t.index), Some(3));
        assert_eq!(stream.find_token(5, Op, Some("("), true).map(|t| t.index), Some(1));
        assert_eq!(stream.find_token(0, Newline, None, false).map(|t| t.index), Some(5));
        assert!(stream.find_token(4, Op, Some("("), false).is_none());
    }

    #[test]
    fn token_range_is_restartable() {
        let (_, stream) = sample();
        let range = stream.token_range(1, 5, false);
        let first: Vec<_> = range.clone().map(|t| t.text.as_str()).collect();
        let second: Vec<_> = range.map(|t| t.text.as_str()).collect();
        assert_eq!(first, vec!["(", "x", ")"]);
        assert_eq!(first, second);
        assert_eq!(stream.token_range(1, 5, true).count(), 5);
    }

    #[test]
    fn rejects_overlapping_tokens() {
        let text = "ab";
        let ln = LineNumbers::new(text);
        let raw = vec![
            RawToken::new(Name, 0, 2),
            RawToken::new(Name, 1, 2),
            RawToken::new(EndMarker, 2, 2),
        ];
        let err = TokenStream::new(text, &ln, raw).unwrap_err();
        assert!(matches!(err, MarkError::Tokenization { offset: 1, .. }));
    }

    #[test]
    fn rejects_missing_end_marker() {
        let text = "ab";
        let ln = LineNumbers::new(text);
        let err = TokenStream::new(text, &ln, vec![RawToken::new(Name, 0, 2)]).unwrap_err();
        assert!(matches!(err, MarkError::Tokenization { offset: 2, .. }));
    }

    #[test]
    fn rejects_split_characters() {
        let text = "ф";
        let ln = LineNumbers::new(text);
        let raw = vec![RawToken::new(Name, 0, 1), RawToken::new(EndMarker, 2, 2)];
        assert!(TokenStream::new(text, &ln, raw).is_err());
    }

    #[test]
    fn empty_text_has_only_end_marker() {
        let ln = LineNumbers::new("");
        let stream = TokenStream::new("", &ln, vec![RawToken::new(EndMarker, 0, 0)]).unwrap();
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.last_content_index(), 0);
    }
}
