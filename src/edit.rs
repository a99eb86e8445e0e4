use std::io::Write;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Byte-span replacement in a source string.
///
/// Every text change the crate makes, from a single node replacement to a
/// batch of them, goes through [`apply_edits`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextEdit does nothing until applied"]
pub struct TextEdit {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
    pub new_text: String,
    /// What the span must contain before the edit, if checked
    pub expected_before: Option<EditVerification>,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("invalid byte range [{start}, {end}) in text of length {len}")]
    InvalidByteRange { start: usize, end: usize, len: usize },

    #[error("byte offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("edits overlap: {first:?} and {second:?}")]
    Overlap {
        first: Range<usize>,
        second: Range<usize>,
    },

    #[error("before-text verification failed at [{start}, {end}): found {found:?}")]
    BeforeTextMismatch {
        start: usize,
        end: usize,
        expected: String,
        found: String,
    },

    #[error("node is not part of the marked tree")]
    UnknownNode,

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TextEdit {
    pub fn new(range: Range<usize>, new_text: impl Into<String>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            new_text: new_text.into(),
            expected_before: None,
        }
    }

    /// An edit that fails unless the span currently reads `expected_before`.
    pub fn verified(
        range: Range<usize>,
        new_text: impl Into<String>,
        expected_before: &str,
    ) -> Self {
        Self {
            expected_before: Some(EditVerification::from_text(expected_before)),
            ..Self::new(range, new_text)
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    fn validate(&self, text: &str) -> Result<(), EditError> {
        if self.start > self.end || self.end > text.len() {
            return Err(EditError::InvalidByteRange {
                start: self.start,
                end: self.end,
                len: text.len(),
            });
        }
        for offset in [self.start, self.end] {
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }

        let current = &text[self.start..self.end];
        match &self.expected_before {
            Some(expected) if !expected.matches(current) => Err(EditError::BeforeTextMismatch {
                start: self.start,
                end: self.end,
                expected: format!("{expected:?}"),
                found: current.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        apply_edits(text, std::slice::from_ref(self))
    }
}

/// Apply `edits` to `text` and return the result; `text` is left untouched.
///
/// Every edit is checked against the original text before anything is
/// spliced. Edits are applied bottom-to-top so earlier offsets stay valid;
/// insertions at the same offset keep their given order.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    for edit in edits {
        edit.validate(text)?;
    }

    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by(|&a, &b| {
        (edits[b].start, edits[b].end, b).cmp(&(edits[a].start, edits[a].end, a))
    });

    // Sorted descending: for non-overlapping spans the earlier edit ends at
    // or before the later one starts.
    for window in order.windows(2) {
        let (later, earlier) = (&edits[window[0]], &edits[window[1]]);
        if earlier.end > later.start {
            return Err(EditError::Overlap {
                first: earlier.range(),
                second: later.range(),
            });
        }
    }

    let mut result = text.to_string();
    for idx in order {
        let edit = &edits[idx];
        result.replace_range(edit.range(), &edit.new_text);
    }
    Ok(result)
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), EditError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
