use crate::errors::MarkError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Node, Parser, Point, Tree};

/// Tree-sitter parser wrapper for Python source code.
pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self, MarkError> {
        let mut parser = Parser::new();
        // The grammar comes from ast-grep-language, which pins the matching
        // tree-sitter version.
        let ts_lang = SupportLang::Python.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| MarkError::LanguageSet)?;

        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Result<Tree, MarkError> {
        self.parser
            .parse(source, None)
            .ok_or(MarkError::ParseFailed)
    }

    pub fn parse_with_source<'a>(&mut self, source: &'a str) -> Result<ParsedSource<'a>, MarkError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Whether the tree contains ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// All ERROR and MISSING nodes, in document order.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        let mut stack = vec![self.tree.root_node()];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                errors.push(ErrorNode {
                    byte_start: node.start_byte(),
                    byte_end: node.end_byte(),
                    start_point: node.start_position(),
                    missing: node.is_missing().then(|| node.kind().to_string()),
                });
                continue;
            }
            if !node.has_error() {
                continue;
            }
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        errors
    }

    /// The first syntax error as a tokenization failure, if any.
    pub fn check(&self) -> Result<(), MarkError> {
        if !self.has_errors() {
            return Ok(());
        }
        let message_for = |err: &ErrorNode| match &err.missing {
            Some(kind) => format!("missing `{kind}`"),
            None => format!(
                "syntax error near {:?}",
                self.source
                    .get(err.byte_start..err.byte_end)
                    .unwrap_or_default()
                    .chars()
                    .take(20)
                    .collect::<String>()
            ),
        };
        let errors = self.error_nodes();
        let Some(first) = errors.first() else {
            return Err(MarkError::Tokenization {
                offset: 0,
                line: 1,
                column: 0,
                message: "syntax error".to_string(),
            });
        };
        Err(MarkError::Tokenization {
            offset: first.byte_start,
            line: first.start_point.row + 1,
            column: first.start_point.column,
            message: message_for(first),
        })
    }

    pub fn node_text(&self, node: Node<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }
}

/// Information about an ERROR or MISSING node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: Point,
    /// Kind of the token the parser inserted, for MISSING nodes
    pub missing: Option<String>,
}
