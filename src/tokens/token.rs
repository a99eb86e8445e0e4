use crate::line_numbers::LineCol;
use serde::Serialize;
use std::fmt;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// Identifiers and keywords
    Name,
    Number,
    /// A complete string literal, including prefix and quotes
    String,
    /// Operators and punctuation
    Op,
    Comment,
    /// End of a logical line
    Newline,
    /// Line break that does not end a logical line (blank lines, inside brackets,
    /// after a comment-only line)
    Nl,
    /// Zero-width sentinel at the end of the text
    #[serde(rename = "ENDMARKER")]
    EndMarker,
}

impl TokenKind {
    /// Comments and line breaks. Boundary rules and `next_token`/`prev_token`
    /// skip these unless asked not to.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Newline | TokenKind::Nl)
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Name => "NAME",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Op => "OP",
            TokenKind::Comment => "COMMENT",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Nl => "NL",
            TokenKind::EndMarker => "ENDMARKER",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a tokenizer adapter hands to [`crate::CodeText::new`]: a kind and a
/// byte span. Text and positions are derived from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawToken {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl RawToken {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the first character (inclusive)
    pub start: usize,
    /// Byte offset past the last character (exclusive)
    pub end: usize,
    pub start_pos: LineCol,
    pub end_pos: LineCol,
    /// Position in the token stream
    pub index: usize,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// Whether this token has the given kind and, if given, the given text.
    pub fn matches(&self, kind: TokenKind, text: Option<&str>) -> bool {
        self.kind == kind && text.map_or(true, |t| self.text == t)
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.kind, self.text)
    }
}
