use crate::edit::{apply_edits, EditError, TextEdit};
use crate::errors::MarkError;
use crate::line_numbers::LineNumbers;
use crate::mark::{self, NodeRanges, TokenRange};
use crate::tokens::{RawToken, Token, TokenKind, TokenStream};
use crate::tree::{NodeKind, SyntaxTree, Walk};
use std::ops::Range;

/// Source text together with its line index and token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeText {
    text: String,
    line_numbers: LineNumbers,
    tokens: TokenStream,
}

impl CodeText {
    /// Build the line index and validate the tokenizer's output.
    pub fn new(
        text: impl Into<String>,
        raw: impl IntoIterator<Item = RawToken>,
    ) -> Result<Self, MarkError> {
        let text = text.into();
        let line_numbers = LineNumbers::new(&text);
        let tokens = TokenStream::new(&text, &line_numbers, raw)?;
        Ok(Self {
            text,
            line_numbers,
            tokens,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_numbers(&self) -> &LineNumbers {
        &self.line_numbers
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn offset(&self, line: usize, col: usize) -> usize {
        self.line_numbers.line_col_to_offset(line, col)
    }

    /// Token at (line, byte column), or the preceding one when the position
    /// falls in whitespace.
    pub fn token_at(&self, line: usize, col: usize) -> &Token {
        self.tokens.token_at_offset(self.offset(line, col))
    }

    /// Byte offsets `(start, end)` of a node's text taken from the positions
    /// its parser reported, without marking.
    ///
    /// Agrees with [`MarkedTree::get_text_range`] on the nodes it can answer
    /// for: a decorated definition starts at its first decorator, and a
    /// statement that holds a block ends with its last statement, so
    /// trailing comments inside the block are left out. The module covers
    /// the whole text. Nodes without a position give `None`.
    pub fn get_text_range_unmarked<T: SyntaxTree>(
        &self,
        tree: &T,
        node: T::Node,
    ) -> Option<(usize, usize)> {
        if tree.kind(node) == NodeKind::Module {
            return Some((0, self.text.len()));
        }

        let start_node = match tree.children(node).next() {
            Some(first)
                if tree.kind(node) == NodeKind::Decorated
                    && tree.kind(first) == NodeKind::Decorator =>
            {
                first
            }
            _ => node,
        };
        let start = tree.position(start_node)?.start;
        let end = tree.position(last_statement(tree, node))?.end;
        (start <= end && end <= self.text.len()).then_some((start, end))
    }

    pub fn get_text_unmarked<T: SyntaxTree>(&self, tree: &T, node: T::Node) -> Option<&str> {
        let (start, end) = self.get_text_range_unmarked(tree, node)?;
        self.text.get(start..end)
    }

    /// Mark `tree` against this text.
    pub fn mark<T: SyntaxTree>(self, tree: T) -> Result<MarkedTree<T>, MarkError> {
        let ranges = mark::mark(&tree, &self.tokens)?;
        Ok(MarkedTree {
            tree,
            code: self,
            ranges,
        })
    }
}

/// The innermost last statement of `node`, following blocks and clauses down.
fn last_statement<T: SyntaxTree>(tree: &T, node: T::Node) -> T::Node {
    let mut current = node;
    while let Some(last) = tree.children(current).last() {
        if !holds_statements(tree.kind(last)) {
            break;
        }
        current = last;
    }
    current
}

fn holds_statements(kind: NodeKind) -> bool {
    kind.is_statement()
        || matches!(
            kind,
            NodeKind::Block
                | NodeKind::Elif
                | NodeKind::Else
                | NodeKind::Except
                | NodeKind::ExceptGroup
                | NodeKind::Finally
                | NodeKind::Case
        )
}

/// What [`MarkedTree::replace`] overwrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceTarget<N> {
    /// The node's text, as returned by `get_text`
    Node(N),
    /// A raw byte range of the source
    Range(Range<usize>),
}

/// A tree whose every node is mapped to its tokens and source text.
///
/// Immutable once built. Queries on nodes that are not part of the tree
/// return `None`.
#[derive(Debug, Clone)]
pub struct MarkedTree<T: SyntaxTree> {
    tree: T,
    code: CodeText,
    ranges: NodeRanges<T::Node>,
}

impl<T: SyntaxTree> MarkedTree<T> {
    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn code(&self) -> &CodeText {
        &self.code
    }

    pub fn text(&self) -> &str {
        &self.code.text
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.code.tokens
    }

    pub fn ranges(&self) -> &NodeRanges<T::Node> {
        &self.ranges
    }

    pub fn root(&self) -> T::Node {
        self.tree.root()
    }

    pub fn kind(&self, node: T::Node) -> NodeKind {
        self.tree.kind(node)
    }

    pub fn range(&self, node: T::Node) -> Option<TokenRange> {
        self.ranges.get(node)
    }

    pub fn first_token(&self, node: T::Node) -> Option<&Token> {
        self.range(node).map(|r| &self.code.tokens[r.first])
    }

    pub fn last_token(&self, node: T::Node) -> Option<&Token> {
        self.range(node).map(|r| &self.code.tokens[r.last])
    }

    /// Byte offsets `(start, end)` of the node's text.
    pub fn get_text_range(&self, node: T::Node) -> Option<(usize, usize)> {
        let range = self.range(node)?;
        let tokens = &self.code.tokens;
        Some((tokens[range.first].start, tokens[range.last].end))
    }

    pub fn get_text(&self, node: T::Node) -> Option<&str> {
        let (start, end) = self.get_text_range(node)?;
        Some(&self.code.text[start..end])
    }

    /// Like [`get_text_range`](Self::get_text_range), but a node that spans a
    /// logical line break starts at the beginning of its first line, so its
    /// indentation stays consistent.
    pub fn get_text_range_padded(&self, node: T::Node) -> Option<(usize, usize)> {
        let (start, end) = self.get_text_range(node)?;
        let multiline = self
            .tokens_for(node)?
            .iter()
            .any(|tok| tok.kind == TokenKind::Newline);
        if !multiline {
            return Some((start, end));
        }
        let line = self.code.line_numbers.offset_to_line_col(start).line;
        let line_start = self.code.line_numbers.line_start(line).unwrap_or(start);
        Some((line_start, end))
    }

    pub fn get_text_padded(&self, node: T::Node) -> Option<&str> {
        let (start, end) = self.get_text_range_padded(node)?;
        Some(&self.code.text[start..end])
    }

    /// The node's tokens in source order, comments and line breaks included.
    pub fn tokens_for(&self, node: T::Node) -> Option<&[Token]> {
        let range = self.range(node)?;
        Some(&self.code.tokens.tokens()[range.first..=range.last])
    }

    /// The node's tokens without comments and line breaks.
    pub fn code_tokens_for(&self, node: T::Node) -> impl Iterator<Item = &Token> + Clone + '_ {
        let (first, last) = self
            .range(node)
            .map_or((1, 0), |range| (range.first, range.last));
        self.code.tokens.token_range(first, last, false)
    }

    /// Pre-order walk from `node` in the tree's child order.
    pub fn walk(&self, node: T::Node) -> Walk<'_, T> {
        Walk::new(&self.tree, node)
    }

    /// Nodes whose range contains the token at (line, byte column),
    /// outermost first.
    pub fn nodes_at(&self, line: usize, col: usize) -> Vec<T::Node> {
        let index = self.code.token_at(line, col).index;
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            let Some(range) = self.range(node) else {
                continue;
            };
            if range.first <= index && index <= range.last {
                found.push(node);
                let mark = stack.len();
                stack.extend(self.tree.children(node));
                stack[mark..].reverse();
            }
        }
        found
    }

    /// Innermost node at (line, byte column), optionally of a given kind.
    pub fn node_at(&self, line: usize, col: usize, kind: Option<NodeKind>) -> Option<T::Node> {
        self.nodes_at(line, col)
            .into_iter()
            .rev()
            .find(|&node| kind.map_or(true, |k| self.tree.kind(node) == k))
    }

    fn edit_for(&self, target: &ReplaceTarget<T::Node>, new_text: String) -> Result<TextEdit, EditError> {
        match target {
            ReplaceTarget::Node(node) => {
                let (start, end) = self.get_text_range(*node).ok_or(EditError::UnknownNode)?;
                Ok(TextEdit::new(start..end, new_text))
            }
            ReplaceTarget::Range(range) => Ok(TextEdit::new(range.clone(), new_text)),
        }
    }

    /// The full source with `target` replaced by `new_text`. Neither the
    /// stored text nor the tree changes.
    pub fn replace(
        &self,
        target: ReplaceTarget<T::Node>,
        new_text: impl Into<String>,
    ) -> Result<String, EditError> {
        let edit = self.edit_for(&target, new_text.into())?;
        edit.apply(&self.code.text)
    }

    /// Apply several non-overlapping replacements at once.
    pub fn replace_all<S: Into<String>>(
        &self,
        replacements: impl IntoIterator<Item = (ReplaceTarget<T::Node>, S)>,
    ) -> Result<String, EditError> {
        let edits = replacements
            .into_iter()
            .map(|(target, text)| self.edit_for(&target, text.into()))
            .collect::<Result<Vec<_>, _>>()?;
        apply_edits(&self.code.text, &edits)
    }

    /// Run the marking pass again over the same tree and tokens.
    pub fn remark(&self) -> Result<NodeRanges<T::Node>, MarkError> {
        mark::mark(&self.tree, &self.code.tokens)
    }
}
