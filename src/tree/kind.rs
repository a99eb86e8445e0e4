use std::fmt;
use std::str::FromStr;

macro_rules! node_kinds {
    ($($(#[$meta:meta])* $variant:ident),* $(,)?) => {
        /// Closed set of node kinds understood by the boundary-rule table.
        ///
        /// Names follow Python's grammar; trees from other parsers map their own
        /// kinds onto this set and use [`NodeKind::Other`] for the rest.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum NodeKind {
            $($(#[$meta])* $variant),*
        }

        impl NodeKind {
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

node_kinds! {
    Module,
    Block,

    // Simple statements
    ExpressionStatement,
    Return,
    Delete,
    Raise,
    Pass,
    Break,
    Continue,
    Global,
    Nonlocal,
    Assert,
    Import,
    ImportFrom,
    FutureImport,
    TypeAlias,

    // Compound statements and their clauses
    If,
    Elif,
    Else,
    For,
    While,
    Try,
    Except,
    ExceptGroup,
    Finally,
    With,
    WithClause,
    WithItem,
    FunctionDef,
    ClassDef,
    Decorated,
    Decorator,
    Match,
    Case,

    Assignment,
    AugmentedAssignment,

    // Atoms
    Identifier,
    Integer,
    Float,
    String,
    ConcatenatedString,
    True,
    False,
    NoneLiteral,
    Ellipsis,

    // Expressions
    Call,
    ArgumentList,
    Attribute,
    Subscript,
    Slice,
    BinaryOp,
    UnaryOp,
    BooleanOp,
    NotOp,
    Comparison,
    Conditional,
    NamedExpr,
    Lambda,
    LambdaParameters,
    KeywordArgument,
    ListSplat,
    DictSplat,
    /// An expression wrapped in parentheses that are not part of a tuple
    Parenthesized,
    Tuple,
    List,
    Set,
    Dict,
    Pair,
    /// Unparenthesized comma-separated expressions (`return a, b`)
    ExpressionList,
    PatternList,
    TuplePattern,
    ListPattern,
    DictPattern,
    AsPattern,
    /// `*rest` or `**rest` inside a sequence or mapping pattern
    SplatPattern,
    /// `Point(x=0)`; also `Point()`
    ClassPattern,
    /// One alternative of a `case`, possibly a negative literal
    CasePattern,
    ListComp,
    SetComp,
    DictComp,
    Generator,
    /// `for x in y` inside a comprehension
    ForIn,
    /// `if cond` inside a comprehension
    IfClause,
    Await,
    Yield,

    // Definitions
    Parameters,
    DefaultParameter,
    TypedParameter,
    TypedDefaultParameter,
    ListSplatPattern,
    DictSplatPattern,
    /// Bare `*` in a parameter list
    KeywordSeparator,
    /// Bare `/` in a parameter list
    PositionalSeparator,
    TypeAnnotation,
    /// Bracketed type arguments or parameters: `[int]` in `list[int]`, `[T]` in `def f[T]()`
    TypeParameter,
    /// `*Ts` or `**P` in a type parameter list
    SplatType,

    // Imports
    DottedName,
    AliasedImport,
    ImportPrefix,
    RelativeImport,
    WildcardImport,

    /// Any construct without a dedicated boundary rule
    Other,
}

impl NodeKind {
    /// Statements that end at their logical line end.
    pub fn is_simple_statement(self) -> bool {
        matches!(
            self,
            NodeKind::ExpressionStatement
                | NodeKind::Return
                | NodeKind::Delete
                | NodeKind::Raise
                | NodeKind::Pass
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Global
                | NodeKind::Nonlocal
                | NodeKind::Assert
                | NodeKind::Import
                | NodeKind::ImportFrom
                | NodeKind::FutureImport
                | NodeKind::TypeAlias
        )
    }

    pub fn is_compound_statement(self) -> bool {
        matches!(
            self,
            NodeKind::If
                | NodeKind::For
                | NodeKind::While
                | NodeKind::Try
                | NodeKind::With
                | NodeKind::FunctionDef
                | NodeKind::ClassDef
                | NodeKind::Decorated
                | NodeKind::Match
        )
    }

    pub fn is_statement(self) -> bool {
        self.is_simple_statement() || self.is_compound_statement()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNodeKind(pub String);

impl fmt::Display for UnknownNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown node kind: {}", self.0)
    }
}

impl std::error::Error for UnknownNodeKind {}

impl FromStr for NodeKind {
    type Err = UnknownNodeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownNodeKind(s.to_string()))
    }
}
