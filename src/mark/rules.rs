//! Boundary rules: how far a node's range widens past its children.
//!
//! Everything a node owns that is not a child (a leading `def`, enclosing
//! brackets, a trailing comma) is described here as a list of steps, walked
//! backward from the first child for `lead` and forward from the last child
//! for `trail`. Steps skip trivia.

use crate::tokens::{Token, TokenKind};
use crate::tree::NodeKind;
use std::fmt;

/// A single token pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok {
    /// A `Name` token with this exact text
    Keyword(&'static str),
    /// An `Op` token with this exact text
    Op(&'static str),
    /// An `Op` token with any of these texts
    OpAny(&'static [&'static str]),
}

impl Tok {
    pub fn matches(&self, token: &Token) -> bool {
        match *self {
            Tok::Keyword(kw) => token.matches(TokenKind::Name, Some(kw)),
            Tok::Op(op) => token.is_op(op),
            Tok::OpAny(ops) => ops.iter().any(|op| token.is_op(op)),
        }
    }
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Tok::Keyword(text) | Tok::Op(text) => f.write_str(text),
            Tok::OpAny(ops) => f.write_str(&ops.join("|")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The adjacent token must match; otherwise the node is unmatched.
    Require(Tok),
    /// Take the adjacent token if it matches.
    Accept(Tok),
    /// Take adjacent tokens for as long as they match.
    AcceptAll(Tok),
    /// Take an adjacent opening and closing bracket with nothing between
    /// them but trivia, as in `Point()`.
    EmptyPair(&'static str, &'static str),
    /// Extend to the last non-trivia token of the logical line (trailing) or
    /// the first one (leading). A comment after the statement on the same line
    /// stays outside the range.
    LineEnd,
    /// Extend to the first token of the stream (leading) or to the last one
    /// before the end marker (trailing).
    StreamEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryRule {
    pub lead: &'static [Step],
    pub trail: &'static [Step],
}

impl BoundaryRule {
    pub const EMPTY: BoundaryRule = BoundaryRule {
        lead: &[],
        trail: &[],
    };

    pub const fn new(lead: &'static [Step], trail: &'static [Step]) -> Self {
        Self { lead, trail }
    }

    const fn lead(lead: &'static [Step]) -> Self {
        Self { lead, trail: &[] }
    }

    const fn trail(trail: &'static [Step]) -> Self {
        Self { lead: &[], trail }
    }

    pub fn is_empty(&self) -> bool {
        self.lead.is_empty() && self.trail.is_empty()
    }
}

use Step::{Accept, AcceptAll, EmptyPair, LineEnd, Require, StreamEdge};
use Tok::{Keyword, Op, OpAny};

/// The boundary rule for `kind`. Only applied to nodes with children.
pub const fn rule(kind: NodeKind) -> BoundaryRule {
    match kind {
        NodeKind::Module => BoundaryRule::new(&[StreamEdge], &[StreamEdge]),

        NodeKind::ExpressionStatement
        | NodeKind::Pass
        | NodeKind::Break
        | NodeKind::Continue => BoundaryRule::trail(&[LineEnd]),
        NodeKind::Return => BoundaryRule::new(&[Require(Keyword("return"))], &[LineEnd]),
        NodeKind::Delete => BoundaryRule::new(&[Require(Keyword("del"))], &[LineEnd]),
        NodeKind::Raise => BoundaryRule::new(&[Require(Keyword("raise"))], &[LineEnd]),
        NodeKind::Global => BoundaryRule::new(&[Require(Keyword("global"))], &[LineEnd]),
        NodeKind::Nonlocal => BoundaryRule::new(&[Require(Keyword("nonlocal"))], &[LineEnd]),
        NodeKind::Assert => BoundaryRule::new(&[Require(Keyword("assert"))], &[LineEnd]),
        NodeKind::Import => BoundaryRule::new(&[Require(Keyword("import"))], &[LineEnd]),
        NodeKind::ImportFrom => BoundaryRule::new(&[Require(Keyword("from"))], &[LineEnd]),
        NodeKind::FutureImport => BoundaryRule::new(
            &[
                Accept(Op("(")),
                Require(Keyword("import")),
                Require(Keyword("__future__")),
                Require(Keyword("from")),
            ],
            &[LineEnd],
        ),
        NodeKind::TypeAlias => BoundaryRule::new(&[Require(Keyword("type"))], &[LineEnd]),

        NodeKind::If => BoundaryRule::lead(&[Require(Keyword("if"))]),
        NodeKind::Elif => BoundaryRule::lead(&[Require(Keyword("elif"))]),
        NodeKind::Else => BoundaryRule::lead(&[Accept(Op(":")), Require(Keyword("else"))]),
        NodeKind::For | NodeKind::ForIn => {
            BoundaryRule::lead(&[Require(Keyword("for")), Accept(Keyword("async"))])
        }
        NodeKind::While => BoundaryRule::lead(&[Require(Keyword("while"))]),
        NodeKind::Try => BoundaryRule::lead(&[Accept(Op(":")), Require(Keyword("try"))]),
        NodeKind::Except => BoundaryRule::lead(&[
            Accept(Op(":")),
            Accept(Op("*")),
            Require(Keyword("except")),
        ]),
        NodeKind::ExceptGroup => BoundaryRule::lead(&[
            Accept(Op(":")),
            Require(Op("*")),
            Require(Keyword("except")),
        ]),
        NodeKind::Finally => BoundaryRule::lead(&[Accept(Op(":")), Require(Keyword("finally"))]),
        NodeKind::With => BoundaryRule::lead(&[
            Accept(Op("(")),
            Require(Keyword("with")),
            Accept(Keyword("async")),
        ]),
        NodeKind::WithClause | NodeKind::ExpressionList | NodeKind::PatternList => {
            BoundaryRule::trail(&[Accept(Op(","))])
        }
        NodeKind::FunctionDef => {
            BoundaryRule::lead(&[Require(Keyword("def")), Accept(Keyword("async"))])
        }
        NodeKind::ClassDef => BoundaryRule::lead(&[Require(Keyword("class"))]),
        NodeKind::Decorator => BoundaryRule::lead(&[Require(Op("@"))]),
        NodeKind::Match => BoundaryRule::lead(&[Require(Keyword("match"))]),
        NodeKind::Case => BoundaryRule::lead(&[Require(Keyword("case"))]),

        NodeKind::UnaryOp => BoundaryRule::lead(&[Require(OpAny(&["-", "+", "~"]))]),
        NodeKind::NotOp => BoundaryRule::lead(&[Require(Keyword("not"))]),
        NodeKind::Lambda => BoundaryRule::lead(&[Accept(Op(":")), Require(Keyword("lambda"))]),
        NodeKind::Await => BoundaryRule::lead(&[Require(Keyword("await"))]),
        NodeKind::Yield => BoundaryRule::lead(&[Accept(Keyword("from")), Require(Keyword("yield"))]),
        NodeKind::IfClause => BoundaryRule::lead(&[Require(Keyword("if"))]),
        NodeKind::ListSplat | NodeKind::ListSplatPattern => BoundaryRule::lead(&[Require(Op("*"))]),
        NodeKind::DictSplat | NodeKind::DictSplatPattern => {
            BoundaryRule::lead(&[Require(Op("**"))])
        }
        NodeKind::SplatPattern | NodeKind::SplatType => {
            BoundaryRule::lead(&[Require(OpAny(&["*", "**"]))])
        }
        // Arguments close their own `(`; a bare `Point()` has none to close.
        NodeKind::ClassPattern => BoundaryRule::trail(&[EmptyPair("(", ")")]),
        NodeKind::LambdaParameters => BoundaryRule::trail(&[Accept(Op(","))]),
        NodeKind::Slice => BoundaryRule::new(&[AcceptAll(Op(":"))], &[AcceptAll(Op(":"))]),

        NodeKind::Parenthesized | NodeKind::Generator => {
            BoundaryRule::new(&[Require(Op("("))], &[Require(Op(")"))])
        }
        NodeKind::Tuple
        | NodeKind::TuplePattern
        | NodeKind::Parameters
        | NodeKind::ArgumentList => {
            BoundaryRule::new(&[Require(Op("("))], &[Accept(Op(",")), Require(Op(")"))])
        }
        NodeKind::List | NodeKind::ListPattern | NodeKind::TypeParameter => {
            BoundaryRule::new(&[Require(Op("["))], &[Accept(Op(",")), Require(Op("]"))])
        }
        NodeKind::ListComp => BoundaryRule::new(&[Require(Op("["))], &[Require(Op("]"))]),
        NodeKind::Dict | NodeKind::Set => {
            BoundaryRule::new(&[Require(Op("{"))], &[Accept(Op(",")), Require(Op("}"))])
        }
        // A pattern may open on a negative literal whose `-` is not a child.
        NodeKind::DictPattern => BoundaryRule::new(
            &[Accept(Op("-")), Require(Op("{"))],
            &[Accept(Op(",")), Require(Op("}"))],
        ),
        NodeKind::CasePattern => BoundaryRule::lead(&[Accept(Op("-"))]),
        NodeKind::SetComp | NodeKind::DictComp => {
            BoundaryRule::new(&[Require(Op("{"))], &[Require(Op("}"))])
        }

        // Subscript brackets sit between children and are closed by the
        // generic balancing pass.
        NodeKind::Block
        | NodeKind::Assignment
        | NodeKind::AugmentedAssignment
        | NodeKind::WithItem
        | NodeKind::Decorated
        | NodeKind::Identifier
        | NodeKind::Integer
        | NodeKind::Float
        | NodeKind::String
        | NodeKind::ConcatenatedString
        | NodeKind::True
        | NodeKind::False
        | NodeKind::NoneLiteral
        | NodeKind::Ellipsis
        | NodeKind::Call
        | NodeKind::Attribute
        | NodeKind::Subscript
        | NodeKind::BinaryOp
        | NodeKind::BooleanOp
        | NodeKind::Comparison
        | NodeKind::Conditional
        | NodeKind::NamedExpr
        | NodeKind::KeywordArgument
        | NodeKind::Pair
        | NodeKind::AsPattern
        | NodeKind::DefaultParameter
        | NodeKind::TypedParameter
        | NodeKind::TypedDefaultParameter
        | NodeKind::KeywordSeparator
        | NodeKind::PositionalSeparator
        | NodeKind::TypeAnnotation
        | NodeKind::DottedName
        | NodeKind::AliasedImport
        | NodeKind::ImportPrefix
        | NodeKind::RelativeImport
        | NodeKind::WildcardImport
        | NodeKind::Other => BoundaryRule::EMPTY,
    }
}

/// How a leaf with neither a position hint nor text is found by the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafToken {
    /// A token of this kind; for `Name`, not a hard keyword
    Kind(TokenKind),
    Keyword(&'static str),
    Op(&'static str),
    /// An opening and closing bracket with nothing but trivia between them
    Pair(&'static str, &'static str),
    /// One or more consecutive `Op` tokens with this text
    Run(&'static str),
    /// The next non-trivia token
    Any,
}

pub const fn leaf_token(kind: NodeKind) -> LeafToken {
    match kind {
        NodeKind::Identifier | NodeKind::DottedName => LeafToken::Kind(TokenKind::Name),
        NodeKind::Integer | NodeKind::Float => LeafToken::Kind(TokenKind::Number),
        NodeKind::String => LeafToken::Kind(TokenKind::String),
        NodeKind::True => LeafToken::Keyword("True"),
        NodeKind::False => LeafToken::Keyword("False"),
        NodeKind::NoneLiteral => LeafToken::Keyword("None"),
        NodeKind::Pass => LeafToken::Keyword("pass"),
        NodeKind::Break => LeafToken::Keyword("break"),
        NodeKind::Continue => LeafToken::Keyword("continue"),
        NodeKind::Return => LeafToken::Keyword("return"),
        NodeKind::Raise => LeafToken::Keyword("raise"),
        NodeKind::Yield => LeafToken::Keyword("yield"),
        NodeKind::Ellipsis => LeafToken::Op("..."),
        NodeKind::KeywordSeparator | NodeKind::WildcardImport => LeafToken::Op("*"),
        NodeKind::PositionalSeparator => LeafToken::Op("/"),
        NodeKind::ImportPrefix => LeafToken::Run("."),
        NodeKind::Slice => LeafToken::Run(":"),
        NodeKind::Tuple
        | NodeKind::TuplePattern
        | NodeKind::Parameters
        | NodeKind::ArgumentList
        | NodeKind::Parenthesized => LeafToken::Pair("(", ")"),
        NodeKind::List | NodeKind::ListPattern | NodeKind::TypeParameter => {
            LeafToken::Pair("[", "]")
        }
        NodeKind::Dict | NodeKind::Set | NodeKind::DictPattern => LeafToken::Pair("{", "}"),
        _ => LeafToken::Any,
    }
}

const HARD_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

pub fn is_hard_keyword(text: &str) -> bool {
    HARD_KEYWORDS.contains(&text)
}
