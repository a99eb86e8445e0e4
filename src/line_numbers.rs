//! Offset ↔ (line, column) conversion over an immutable source text.
//!
//! Lines are 1-based, columns are 0-based, and both offsets and columns are
//! counted in UTF-8 bytes. This is the unit tree-sitter reports in
//! `Point::column` and the unit `str` slicing expects, so tokens, hints and
//! ranges never need translating. Parsers that report code-point columns can
//! convert with [`LineNumbers::char_col_to_byte_col`].

use serde::Serialize;

/// A 1-based line and 0-based byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

impl LineCol {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumbers {
    /// Byte offset of the first character of each line. A text ending in `\n`
    /// has a final, empty line starting at `text.len()`.
    line_starts: Vec<usize>,
    text_len: usize,
}

impl LineNumbers {
    pub fn new(text: &str) -> Self {
        let mut line_starts = Vec::with_capacity(text.len() / 32 + 1);
        line_starts.push(0);
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(idx, _)| idx + 1),
        );
        Self {
            line_starts,
            text_len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Byte offset where `line` starts, or `None` past the last line.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|idx| self.line_starts.get(idx).copied())
    }

    /// Converts an offset to its (line, column). Offsets past the end clamp to the end.
    pub fn offset_to_line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.text_len);
        // line_starts[0] == 0, so partition_point is at least 1.
        let idx = self.line_starts.partition_point(|&start| start <= offset) - 1;
        LineCol {
            line: idx + 1,
            col: offset - self.line_starts[idx],
        }
    }

    /// Converts (line, column) to an offset.
    ///
    /// Line 0 clamps to the start of the text, lines past the last clamp to its
    /// end, and columns past the text end clamp to `text_len`.
    pub fn line_col_to_offset(&self, line: usize, col: usize) -> usize {
        if line == 0 {
            return 0;
        }
        match self.line_starts.get(line - 1) {
            Some(&start) => start.saturating_add(col).min(self.text_len),
            None => self.text_len,
        }
    }

    /// Text of `line` without its terminator.
    pub fn line_text<'t>(&self, text: &'t str, line: usize) -> &'t str {
        let Some(start) = self.line_start(line) else {
            return "";
        };
        let end = self
            .line_start(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text_len);
        let line_text = &text[start..end.max(start)];
        line_text.strip_suffix('\r').unwrap_or(line_text)
    }

    /// Translates a code-point column on `line` to a byte column.
    pub fn char_col_to_byte_col(&self, text: &str, line: usize, char_col: usize) -> usize {
        let line_text = self.line_text(text, line);
        line_text
            .char_indices()
            .nth(char_col)
            .map(|(byte, _)| byte)
            .unwrap_or(line_text.len())
    }

    /// Translates a byte column on `line` to a code-point column. A byte column
    /// inside a multi-byte character counts only the characters before it.
    pub fn byte_col_to_char_col(&self, text: &str, line: usize, byte_col: usize) -> usize {
        self.line_text(text, line)
            .char_indices()
            .take_while(|&(byte, ch)| byte + ch.len_utf8() <= byte_col)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Hello\nworld\nThis\n\nis\n\na test.\n";

    #[test]
    fn line_col_to_offset_basic() {
        let ln = LineNumbers::new(TEXT);
        assert_eq!(ln.line_col_to_offset(1, 0), 0);
        assert_eq!(ln.line_col_to_offset(1, 5), 5);
        assert_eq!(ln.line_col_to_offset(2, 0), 6);
        assert_eq!(ln.line_col_to_offset(2, 5), 11);
        assert_eq!(ln.line_col_to_offset(3, 0), 12);
        assert_eq!(ln.line_col_to_offset(4, 0), 17);
        assert_eq!(ln.line_col_to_offset(5, 0), 18);
        assert_eq!(ln.line_col_to_offset(6, 0), 21);
        assert_eq!(ln.line_col_to_offset(7, 0), 22);
        assert_eq!(ln.line_col_to_offset(7, 7), 29);
    }

    #[test]
    fn offset_to_line_col_basic() {
        let ln = LineNumbers::new(TEXT);
        assert_eq!(ln.offset_to_line_col(0), LineCol::new(1, 0));
        assert_eq!(ln.offset_to_line_col(5), LineCol::new(1, 5));
        assert_eq!(ln.offset_to_line_col(6), LineCol::new(2, 0));
        assert_eq!(ln.offset_to_line_col(11), LineCol::new(2, 5));
        assert_eq!(ln.offset_to_line_col(17), LineCol::new(4, 0));
        assert_eq!(ln.offset_to_line_col(22), LineCol::new(7, 0));
        assert_eq!(ln.offset_to_line_col(29), LineCol::new(7, 7));
    }

    #[test]
    fn out_of_range_inputs_clamp() {
        let ln = LineNumbers::new(TEXT);
        assert_eq!(ln.line_col_to_offset(6, 19), 30);
        assert_eq!(ln.line_col_to_offset(100, 99), 30);
        assert_eq!(ln.line_col_to_offset(0, 99), 0);
        assert_eq!(ln.offset_to_line_col(30), LineCol::new(8, 0));
        assert_eq!(ln.offset_to_line_col(100), LineCol::new(8, 0));
    }

    #[test]
    fn last_line_without_terminator() {
        let ln = LineNumbers::new("ab\ncd");
        assert_eq!(ln.line_count(), 2);
        assert_eq!(ln.offset_to_line_col(5), LineCol::new(2, 2));
        assert_eq!(ln.line_col_to_offset(2, 2), 5);
        assert_eq!(ln.line_col_to_offset(2, 50), 5);
        assert_eq!(ln.line_text("ab\ncd", 2), "cd");
    }

    #[test]
    fn empty_text() {
        let ln = LineNumbers::new("");
        assert_eq!(ln.line_count(), 1);
        assert_eq!(ln.offset_to_line_col(0), LineCol::new(1, 0));
        assert_eq!(ln.line_col_to_offset(1, 0), 0);
    }

    #[test]
    fn columns_are_bytes() {
        let text = "фыва\nячсм";
        let ln = LineNumbers::new(text);
        assert_eq!(ln.line_col_to_offset(1, 8), 8);
        assert_eq!(ln.line_col_to_offset(2, 0), 9);
        assert_eq!(ln.offset_to_line_col(9), LineCol::new(2, 0));
        assert_eq!(ln.offset_to_line_col(13), LineCol::new(2, 4));
        assert_eq!(&text[ln.line_col_to_offset(2, 2)..ln.line_col_to_offset(2, 4)], "ч");
    }

    #[test]
    fn byte_and_char_columns_convert() {
        let text = "фыва\nф.в.";
        let ln = LineNumbers::new(text);
        assert_eq!(ln.byte_col_to_char_col(text, 1, 0), 0);
        assert_eq!(ln.byte_col_to_char_col(text, 1, 2), 1);
        assert_eq!(ln.byte_col_to_char_col(text, 1, 3), 1);
        assert_eq!(ln.byte_col_to_char_col(text, 1, 6), 3);
        assert_eq!(ln.byte_col_to_char_col(text, 1, 8), 4);
        assert_eq!(ln.byte_col_to_char_col(text, 2, 2), 1);
        assert_eq!(ln.byte_col_to_char_col(text, 2, 3), 2);
        assert_eq!(ln.byte_col_to_char_col(text, 2, 4), 2);
        assert_eq!(ln.byte_col_to_char_col(text, 2, 5), 3);
        assert_eq!(ln.byte_col_to_char_col(text, 2, 6), 4);

        assert_eq!(ln.char_col_to_byte_col(text, 1, 1), 2);
        assert_eq!(ln.char_col_to_byte_col(text, 2, 2), 3);
        assert_eq!(ln.char_col_to_byte_col(text, 2, 9), 6);
    }

    #[test]
    fn crlf_counts_as_one_terminator() {
        let text = "a\r\nb";
        let ln = LineNumbers::new(text);
        assert_eq!(ln.offset_to_line_col(3), LineCol::new(2, 0));
        assert_eq!(ln.line_text(text, 1), "a");
    }
}
