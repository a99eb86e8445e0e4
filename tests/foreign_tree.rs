//! Marking trees built by hand, as a parser other than the Python front end
//! would hand them over.

use tree_tokens::{
    CodeText, MarkChecker, MarkError, NodeId, NodeKind, RawToken, ReplaceTarget, TextRange,
    TokenKind::{Comment, EndMarker, Name, Newline, Nl, Op},
    TokenRange, TreeBuilder, Violation,
};

/// `print(a, b)  # out\n`
fn code() -> CodeText {
    let text = "print(a, b)  # out\n";
    let raw = vec![
        RawToken::new(Name, 0, 5),
        RawToken::new(Op, 5, 6),
        RawToken::new(Name, 6, 7),
        RawToken::new(Op, 7, 8),
        RawToken::new(Name, 9, 10),
        RawToken::new(Op, 10, 11),
        RawToken::new(Comment, 13, 18),
        RawToken::new(Newline, 18, 19),
        RawToken::new(EndMarker, 19, 19),
    ];
    CodeText::new(text, raw).unwrap()
}

struct Built {
    module: NodeId,
    stmt: NodeId,
    call: NodeId,
    args: NodeId,
}

fn call_tree(b: &mut TreeBuilder, a: NodeId, c: NodeId) -> Built {
    let func = b.leaf(NodeKind::Identifier, "print");
    let args = b.node(NodeKind::ArgumentList, [a, c]);
    let call = b.node(NodeKind::Call, [func, args]);
    let stmt = b.node(NodeKind::ExpressionStatement, [call]);
    let module = b.node(NodeKind::Module, [stmt]);
    Built {
        module,
        stmt,
        call,
        args,
    }
}

#[test]
fn test_text_leaves() {
    let mut b = TreeBuilder::new();
    let a = b.leaf(NodeKind::Identifier, "a");
    let c = b.leaf(NodeKind::Identifier, "b");
    let built = call_tree(&mut b, a, c);
    let m = code().mark(b.finish(built.module)).unwrap();

    assert_eq!(m.get_text(built.args), Some("(a, b)"));
    assert_eq!(m.get_text(built.call), Some("print(a, b)"));
    assert_eq!(m.get_text(built.stmt), Some("print(a, b)"));
    assert_eq!(m.get_text(built.module), Some("print(a, b)  # out\n"));
    assert_eq!(m.range(built.args), Some(TokenRange::new(1, 5)));
    assert!(MarkChecker::new(&m).verify().is_ok());
}

#[test]
fn test_hinted_leaves_match_text_leaves() {
    let mut b = TreeBuilder::new();
    let a = b.leaf(NodeKind::Identifier, "a");
    let c = b.leaf(NodeKind::Identifier, "b");
    let built = call_tree(&mut b, a, c);
    let plain = code().mark(b.finish(built.module)).unwrap();

    let mut b = TreeBuilder::new();
    let a = b.leaf_at(NodeKind::Identifier, "a", TextRange::new(6, 7));
    let c = b.leaf_at(NodeKind::Identifier, "b", TextRange::new(9, 10));
    let built = call_tree(&mut b, a, c);
    let hinted = code().mark(b.finish(built.module)).unwrap();

    assert_eq!(plain.ranges(), hinted.ranges());
}

#[test]
fn test_bare_leaves_resolve_by_kind() {
    let mut b = TreeBuilder::new();
    let a = b.bare(NodeKind::Identifier);
    let c = b.bare(NodeKind::Identifier);
    let func = b.bare(NodeKind::Identifier);
    let args = b.node(NodeKind::ArgumentList, [a, c]);
    let call = b.node(NodeKind::Call, [func, args]);
    let m = code().mark(b.finish(call)).unwrap();

    assert_eq!(m.get_text(func), Some("print"));
    assert_eq!(m.get_text(a), Some("a"));
    assert_eq!(m.get_text(c), Some("b"));
    assert_eq!(m.get_text(call), Some("print(a, b)"));
}

#[test]
fn test_replace_leaves_tree_untouched() {
    let mut b = TreeBuilder::new();
    let a = b.leaf(NodeKind::Identifier, "a");
    let c = b.leaf(NodeKind::Identifier, "b");
    let built = call_tree(&mut b, a, c);
    let m = code().mark(b.finish(built.module)).unwrap();

    let out = m.replace(ReplaceTarget::Node(built.args), "()").unwrap();
    assert_eq!(out, "print()  # out\n");
    assert_eq!(m.get_text(built.args), Some("(a, b)"));
    assert_eq!(m.remark().unwrap(), *m.ranges());
}

#[test]
fn test_unknown_leaf_text_is_unmatched() {
    let mut b = TreeBuilder::new();
    let a = b.leaf(NodeKind::Identifier, "a");
    let c = b.leaf(NodeKind::Identifier, "zzz");
    let built = call_tree(&mut b, a, c);
    let err = code().mark(b.finish(built.module)).unwrap_err();
    assert!(
        matches!(err, MarkError::UnmatchedNode { kind: NodeKind::Identifier, .. }),
        "{err}"
    );
}

#[test]
fn test_children_out_of_order_are_unmatched() {
    let mut b = TreeBuilder::new();
    let c = b.leaf(NodeKind::Identifier, "b");
    let a = b.leaf(NodeKind::Identifier, "a");
    let built = call_tree(&mut b, c, a);
    let err = code().mark(b.finish(built.module)).unwrap_err();
    assert!(matches!(err, MarkError::UnmatchedNode { .. }), "{err}");
}

#[test]
fn test_overlapping_hints_violate_sibling_order() {
    let mut b = TreeBuilder::new();
    let a = b.leaf_at(NodeKind::Identifier, "a", TextRange::new(6, 7));
    let c = b.leaf_at(NodeKind::Identifier, "a", TextRange::new(6, 7));
    let built = call_tree(&mut b, a, c);
    let err = code().mark(b.finish(built.module)).unwrap_err();
    assert!(matches!(
        err,
        MarkError::RangeInvariant {
            kind: NodeKind::ArgumentList,
            violation: Violation::SiblingOverlap { .. }
        }
    ));
}

#[test]
fn test_hint_in_whitespace_is_unmatched() {
    let mut b = TreeBuilder::new();
    let a = b.leaf_at(NodeKind::Identifier, "a", TextRange::new(11, 13));
    let err = code().mark(b.finish(a)).unwrap_err();
    assert!(matches!(err, MarkError::UnmatchedNode { offset: Some(11), .. }));

    let mut b = TreeBuilder::new();
    let a = b.leaf_at(NodeKind::Identifier, "a", TextRange::new(6, 6));
    let err = code().mark(b.finish(a)).unwrap_err();
    assert!(matches!(err, MarkError::UnmatchedNode { .. }));
}

#[test]
fn test_shared_node_is_revisited() {
    let mut b = TreeBuilder::new();
    let a = b.leaf(NodeKind::Identifier, "a");
    let args = b.node(NodeKind::ArgumentList, [a, a]);
    let err = code().mark(b.finish(args)).unwrap_err();
    assert!(matches!(
        err,
        MarkError::RangeInvariant {
            violation: Violation::Revisited,
            ..
        }
    ));
}

#[test]
fn test_missing_closing_bracket_is_unmatched() {
    // `f(x` has no closing parenthesis for the argument list.
    let text = "f(x\n";
    let raw = vec![
        RawToken::new(Name, 0, 1),
        RawToken::new(Op, 1, 2),
        RawToken::new(Name, 2, 3),
        RawToken::new(Nl, 3, 4),
        RawToken::new(EndMarker, 4, 4),
    ];
    let mut b = TreeBuilder::new();
    let x = b.leaf(NodeKind::Identifier, "x");
    let args = b.node(NodeKind::ArgumentList, [x]);
    let err = CodeText::new(text, raw).unwrap().mark(b.finish(args)).unwrap_err();
    assert!(matches!(
        err,
        MarkError::UnmatchedNode {
            kind: NodeKind::ArgumentList,
            ..
        }
    ));
}

#[test]
fn test_malformed_token_streams() {
    let text = "ab\n";
    let cases = [
        // no end marker
        vec![RawToken::new(Name, 0, 2), RawToken::new(Newline, 2, 3)],
        // overlapping tokens
        vec![
            RawToken::new(Name, 0, 2),
            RawToken::new(Name, 1, 2),
            RawToken::new(EndMarker, 3, 3),
        ],
        // span past the text
        vec![RawToken::new(Name, 0, 9), RawToken::new(EndMarker, 3, 3)],
        // token after the end marker
        vec![RawToken::new(EndMarker, 3, 3), RawToken::new(Name, 3, 3)],
    ];
    for raw in cases {
        let err = CodeText::new(text, raw.clone()).unwrap_err();
        assert!(matches!(err, MarkError::Tokenization { .. }), "{raw:?}");
    }
}

#[test]
fn test_empty_stream_marks_empty_module() {
    let code = CodeText::new("", [RawToken::new(EndMarker, 0, 0)]).unwrap();
    let mut b = TreeBuilder::new();
    let module = b.node(NodeKind::Module, []);
    let m = code.mark(b.finish(module)).unwrap();
    assert_eq!(m.range(module), Some(TokenRange::new(0, 0)));
    assert_eq!(m.get_text(module), Some(""));
    assert!(m.tokens_for(module).is_some());
}

#[test]
fn test_foreign_node_ids_are_not_found() {
    let mut b = TreeBuilder::new();
    let a = b.leaf(NodeKind::Identifier, "a");
    let c = b.leaf(NodeKind::Identifier, "b");
    let built = call_tree(&mut b, a, c);
    let m = code().mark(b.finish(built.module)).unwrap();

    let mut other = TreeBuilder::new();
    for _ in 0..20 {
        other.bare(NodeKind::Pass);
    }
    let stranger = other.bare(NodeKind::Pass);
    assert_eq!(m.get_text(stranger), None);
    assert_eq!(m.tokens_for(stranger), None);
    assert!(m.replace(ReplaceTarget::Node(stranger), "x").is_err());
}
