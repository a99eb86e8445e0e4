//! Lowering from the tree-sitter concrete tree to the arena [`Tree`].
//!
//! Only named, non-empty nodes survive; keywords and punctuation live in the
//! token stream and are picked back up by the boundary rules. Comments and
//! line continuations are dropped. A `string` is always a leaf.

use crate::python::{HintMode, MarkOptions, ParsedSource};
use crate::tree::{NodeId, NodeKind, TextRange, Tree, TreeBuilder};
use tree_sitter::Node;

const DROPPED: &[&str] = &["comment", "line_continuation"];

/// Map a tree-sitter Python node kind onto [`NodeKind`].
pub fn node_kind(ts_kind: &str) -> NodeKind {
    match ts_kind {
        "module" => NodeKind::Module,
        "block" => NodeKind::Block,

        "expression_statement" => NodeKind::ExpressionStatement,
        "return_statement" => NodeKind::Return,
        "delete_statement" => NodeKind::Delete,
        "raise_statement" => NodeKind::Raise,
        "pass_statement" => NodeKind::Pass,
        "break_statement" => NodeKind::Break,
        "continue_statement" => NodeKind::Continue,
        "global_statement" => NodeKind::Global,
        "nonlocal_statement" => NodeKind::Nonlocal,
        "assert_statement" => NodeKind::Assert,
        "import_statement" => NodeKind::Import,
        "import_from_statement" => NodeKind::ImportFrom,
        "future_import_statement" => NodeKind::FutureImport,
        "type_alias_statement" => NodeKind::TypeAlias,

        "if_statement" => NodeKind::If,
        "elif_clause" => NodeKind::Elif,
        "else_clause" => NodeKind::Else,
        "for_statement" => NodeKind::For,
        "while_statement" => NodeKind::While,
        "try_statement" => NodeKind::Try,
        "except_clause" => NodeKind::Except,
        "except_group_clause" => NodeKind::ExceptGroup,
        "finally_clause" => NodeKind::Finally,
        "with_statement" => NodeKind::With,
        "with_clause" => NodeKind::WithClause,
        "with_item" => NodeKind::WithItem,
        "function_definition" => NodeKind::FunctionDef,
        "class_definition" => NodeKind::ClassDef,
        "decorated_definition" => NodeKind::Decorated,
        "decorator" => NodeKind::Decorator,
        "match_statement" => NodeKind::Match,
        "case_clause" => NodeKind::Case,

        "assignment" => NodeKind::Assignment,
        "augmented_assignment" => NodeKind::AugmentedAssignment,

        "identifier" | "keyword_identifier" => NodeKind::Identifier,
        "integer" => NodeKind::Integer,
        "float" => NodeKind::Float,
        "string" => NodeKind::String,
        "concatenated_string" => NodeKind::ConcatenatedString,
        "true" => NodeKind::True,
        "false" => NodeKind::False,
        "none" => NodeKind::NoneLiteral,
        "ellipsis" => NodeKind::Ellipsis,

        "call" => NodeKind::Call,
        "argument_list" => NodeKind::ArgumentList,
        "attribute" => NodeKind::Attribute,
        "subscript" => NodeKind::Subscript,
        "slice" => NodeKind::Slice,
        "binary_operator" => NodeKind::BinaryOp,
        "unary_operator" => NodeKind::UnaryOp,
        "boolean_operator" => NodeKind::BooleanOp,
        "not_operator" => NodeKind::NotOp,
        "comparison_operator" => NodeKind::Comparison,
        "conditional_expression" => NodeKind::Conditional,
        "named_expression" => NodeKind::NamedExpr,
        "lambda" => NodeKind::Lambda,
        "lambda_parameters" => NodeKind::LambdaParameters,
        "keyword_argument" => NodeKind::KeywordArgument,
        "list_splat" => NodeKind::ListSplat,
        "dictionary_splat" => NodeKind::DictSplat,
        "parenthesized_expression" | "parenthesized_list_splat" => NodeKind::Parenthesized,

        "tuple" => NodeKind::Tuple,
        "list" => NodeKind::List,
        "set" => NodeKind::Set,
        "dictionary" => NodeKind::Dict,
        "pair" => NodeKind::Pair,
        "expression_list" => NodeKind::ExpressionList,
        "list_comprehension" => NodeKind::ListComp,
        "set_comprehension" => NodeKind::SetComp,
        "dictionary_comprehension" => NodeKind::DictComp,
        "generator_expression" => NodeKind::Generator,
        "for_in_clause" => NodeKind::ForIn,
        "if_clause" => NodeKind::IfClause,

        "pattern_list" => NodeKind::PatternList,
        "tuple_pattern" => NodeKind::TuplePattern,
        "list_pattern" => NodeKind::ListPattern,
        "dict_pattern" => NodeKind::DictPattern,
        "as_pattern" => NodeKind::AsPattern,
        "splat_pattern" => NodeKind::SplatPattern,
        "class_pattern" => NodeKind::ClassPattern,
        "case_pattern" | "complex_pattern" => NodeKind::CasePattern,

        "await" => NodeKind::Await,
        "yield" => NodeKind::Yield,

        "parameters" => NodeKind::Parameters,
        "default_parameter" => NodeKind::DefaultParameter,
        "typed_parameter" => NodeKind::TypedParameter,
        "typed_default_parameter" => NodeKind::TypedDefaultParameter,
        "list_splat_pattern" => NodeKind::ListSplatPattern,
        "dictionary_splat_pattern" => NodeKind::DictSplatPattern,
        "keyword_separator" => NodeKind::KeywordSeparator,
        "positional_separator" => NodeKind::PositionalSeparator,
        "type" => NodeKind::TypeAnnotation,
        "type_parameter" => NodeKind::TypeParameter,
        "splat_type" => NodeKind::SplatType,

        "dotted_name" => NodeKind::DottedName,
        "aliased_import" => NodeKind::AliasedImport,
        "import_prefix" => NodeKind::ImportPrefix,
        "relative_import" => NodeKind::RelativeImport,
        "wildcard_import" => NodeKind::WildcardImport,

        _ => NodeKind::Other,
    }
}

/// Kind of a tree-sitter node; `except*` clauses share `except_clause`
/// with plain ones and are told apart by their leading tokens.
fn kind_of(node: Node<'_>) -> NodeKind {
    let kind = node_kind(node.kind());
    if kind != NodeKind::Except {
        return kind;
    }
    let mut cursor = node.walk();
    let starred = node
        .children(&mut cursor)
        .take(2)
        .any(|child| matches!(child.kind(), "except*" | "*"));
    if starred {
        NodeKind::ExceptGroup
    } else {
        kind
    }
}

struct Frame<'t> {
    node: Node<'t>,
    /// Children still to lower, last child first
    pending: Vec<Node<'t>>,
    built: Vec<NodeId>,
}

/// Lower a parsed source into an arena tree.
///
/// Internal nodes carry their byte range. Leaves carry their visible text,
/// and with [`HintMode::Leaves`] also their byte range.
pub fn lower(parsed: &ParsedSource<'_>, options: &MarkOptions) -> Tree {
    let mut builder = TreeBuilder::new();
    let mut root = frame(parsed.root_node());
    let mut stack: Vec<Frame<'_>> = Vec::new();

    loop {
        let top = match stack.last_mut() {
            Some(top) => top,
            None => &mut root,
        };
        if let Some(child) = top.pending.pop() {
            stack.push(frame(child));
            continue;
        }

        let Some(done) = stack.pop() else { break };
        let id = build(&mut builder, parsed, done, options);
        match stack.last_mut() {
            Some(parent) => parent.built.push(id),
            None => root.built.push(id),
        }
    }

    let id = build(&mut builder, parsed, root, options);
    builder.finish(id)
}

fn frame(node: Node<'_>) -> Frame<'_> {
    let mut pending = kept_children(node);
    pending.reverse();
    Frame {
        node,
        pending,
        built: Vec::new(),
    }
}

fn build(
    builder: &mut TreeBuilder,
    parsed: &ParsedSource<'_>,
    done: Frame<'_>,
    options: &MarkOptions,
) -> NodeId {
    let node = done.node;
    let kind = kind_of(node);
    let span = TextRange::new(node.start_byte(), node.end_byte());
    if kind == NodeKind::Module {
        return builder.node(kind, done.built);
    }
    if !done.built.is_empty() {
        return builder.node_at(kind, done.built, span);
    }

    let text = visible_text(parsed, node);
    match options.hints {
        HintMode::Leaves => builder.leaf_at(kind, text, span),
        HintMode::None => builder.leaf(kind, text),
    }
}

fn kept_children(node: Node<'_>) -> Vec<Node<'_>> {
    if node.kind() == "string" {
        return Vec::new();
    }
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !DROPPED.contains(&child.kind()))
        .filter(|child| child.end_byte() > child.start_byte())
        .collect()
}

/// Source text of a leaf as its tokens would spell it.
///
/// Usually the plain slice; when a comment or line continuation sits inside
/// the leaf, its remaining lexemes are joined with spaces instead.
fn visible_text(parsed: &ParsedSource<'_>, node: Node<'_>) -> String {
    if node.kind() == "string" {
        return parsed.node_text(node).to_string();
    }

    let mut lexemes = Vec::new();
    let mut dropped = false;
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if DROPPED.contains(&current.kind()) {
            dropped = true;
            continue;
        }
        if current.child_count() == 0 || current.kind() == "string" {
            lexemes.push(parsed.node_text(current));
            continue;
        }
        let mut cursor = current.walk();
        let children: Vec<_> = current.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    if dropped {
        lexemes
            .into_iter()
            .filter(|lexeme| !lexeme.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        parsed.node_text(node).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::python::with_parser;
    use crate::tree::SyntaxTree;

    fn lowered(source: &str, hints: HintMode) -> Tree {
        with_parser(|parser| {
            let parsed = parser.parse_with_source(source).unwrap();
            lower(&parsed, &MarkOptions { hints })
        })
        .unwrap()
    }

    fn shape(tree: &Tree, node: NodeId) -> String {
        let children: Vec<_> = tree.children(node).collect();
        if children.is_empty() {
            return format!("{}:{}", tree.kind(node), tree.text(node).unwrap_or(""));
        }
        let inner: Vec<_> = children.into_iter().map(|c| shape(tree, c)).collect();
        format!("{}({})", tree.kind(node), inner.join(" "))
    }

    #[test]
    fn keeps_named_nodes_only() {
        let tree = lowered("x = f(a)  # note\n", HintMode::Leaves);
        assert_eq!(
            shape(&tree, tree.root()),
            "Module(ExpressionStatement(Assignment(Identifier:x \
             Call(Identifier:f ArgumentList(Identifier:a)))))"
        );
    }

    #[test]
    fn leaves_carry_hints_on_request() {
        let tree = lowered("pass\n", HintMode::Leaves);
        let pass = tree.children(tree.root()).next().unwrap();
        assert_eq!(tree.kind(pass), NodeKind::Pass);
        assert_eq!(tree.position(pass), Some(TextRange::new(0, 4)));

        let tree = lowered("pass\n", HintMode::None);
        let pass = tree.children(tree.root()).next().unwrap();
        assert_eq!(tree.position(pass), None);
        assert_eq!(tree.text(pass), Some("pass"));
    }

    #[test]
    fn internal_nodes_carry_spans_in_every_mode() {
        for hints in [HintMode::Leaves, HintMode::None] {
            let tree = lowered("x = f(a)\n", hints);
            assert_eq!(tree.position(tree.root()), None);
            let stmt = tree.children(tree.root()).next().unwrap();
            let assign = tree.children(stmt).next().unwrap();
            let call = tree.children(assign).nth(1).unwrap();
            assert_eq!(tree.kind(call), NodeKind::Call);
            assert_eq!(tree.position(call), Some(TextRange::new(4, 8)));
        }
    }

    #[test]
    fn starred_except_is_a_group_clause() {
        let tree = lowered(
            "try:\n    pass\nexcept* E:\n    pass\nexcept E:\n    pass\n",
            HintMode::None,
        );
        let kinds: Vec<_> = tree.ids().map(|id| tree.kind(id)).collect();
        assert!(kinds.contains(&NodeKind::ExceptGroup));
        assert!(kinds.contains(&NodeKind::Except));
    }

    #[test]
    fn strings_are_leaves() {
        let tree = lowered("f'{a}'\n", HintMode::None);
        let stmt = tree.children(tree.root()).next().unwrap();
        let string = tree.children(stmt).next().unwrap();
        assert_eq!(tree.kind(string), NodeKind::String);
        assert!(tree.is_leaf(string));
        assert_eq!(tree.text(string), Some("f'{a}'"));
    }

    #[test]
    fn empty_module_is_not_a_leaf_kind() {
        let tree = lowered("# only a comment\n", HintMode::Leaves);
        assert_eq!(tree.kind(tree.root()), NodeKind::Module);
        assert_eq!(tree.text(tree.root()), None);
    }

    #[test]
    fn comment_inside_leaf_is_dropped_from_text() {
        let tree = lowered("f(  # nothing\n)\n", HintMode::None);
        let stmt = tree.children(tree.root()).next().unwrap();
        let call = tree.children(stmt).next().unwrap();
        let args = tree.children(call).nth(1).unwrap();
        assert_eq!(tree.kind(args), NodeKind::ArgumentList);
        assert_eq!(tree.text(args), Some("( )"));
    }

    #[test]
    fn kind_mapping() {
        assert_eq!(node_kind("function_definition"), NodeKind::FunctionDef);
        assert_eq!(node_kind("none"), NodeKind::NoneLiteral);
        assert_eq!(node_kind("complex_pattern"), NodeKind::CasePattern);
        assert_eq!(node_kind("print_statement"), NodeKind::Other);
    }
}
