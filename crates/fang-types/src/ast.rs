//! AST node types for Fang scripts.
//!
//! The tree is immutable once parsed. Statements and expressions share one
//! closed [`NodeKind`] sum, and every node carries a [`Span`]. Function
//! declarations sit behind an [`Rc`] so a runtime callable can keep its
//! body alive after the tree that declared it is dropped.

use crate::Span;
use std::fmt;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Nodes
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The `;` statement, also used for omitted `for` header parts.
    pub fn empty(span: Span) -> Self {
        Self::new(NodeKind::Empty, span)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, NodeKind::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `{ stmt* }`; the parser also wraps a whole script in one.
    Block(Vec<Node>),

    /// `var name [type] = init;` or `const name [type] = init;`
    VariableDecl {
        name: Ident,
        is_const: bool,
        type_name: Option<Ident>,
        initializer: Box<Node>,
    },

    /// Prefix `+` or `-`.
    UnaryOp {
        op: Operator,
        operand: Box<Node>,
    },

    BinaryOp {
        op: Operator,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// `object.member`
    MemberAccessor {
        object: Box<Node>,
        member: Ident,
    },

    Constant(Literal),

    Identifier(String),

    /// `callee(args)`
    FunctionCall {
        callee: Box<Node>,
        args: Vec<Node>,
    },

    /// `if (c) s else if (c) s ... else s`
    If {
        branches: Vec<IfBranch>,
        else_body: Option<Box<Node>>,
    },

    /// `for (init; cond; step) body`
    For {
        init: Box<Node>,
        condition: Box<Node>,
        step: Box<Node>,
        body: Box<Node>,
    },

    While {
        condition: Box<Node>,
        body: Box<Node>,
    },

    FunctionDeclaration(Rc<FunctionDecl>),

    Return(Option<Box<Node>>),

    Break,

    Continue,

    Empty,
}

/// One `condition → body` arm of an `if` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub condition: Node,
    pub body: Node,
}

// ══════════════════════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════════════════════

/// `function [name](params) [return_type] { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// `None` for a function expression.
    pub name: Option<Ident>,
    pub params: Vec<Param>,
    pub return_type: Option<Ident>,
    pub body: Node,
    pub span: Span,
}

/// `[const] name [type]`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub is_const: bool,
    pub type_name: Option<Ident>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Literals & Operators
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// Operators shared by unary and binary nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    And,
    Or,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::Less => "<",
            Operator::LessEq => "<=",
            Operator::Greater => ">",
            Operator::GreaterEq => ">=",
            Operator::Assign => "=",
            Operator::AddAssign => "+=",
            Operator::SubAssign => "-=",
            Operator::MulAssign => "*=",
            Operator::DivAssign => "/=",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }

    /// `=` and the compound `op=` forms.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Operator::Assign
                | Operator::AddAssign
                | Operator::SubAssign
                | Operator::MulAssign
                | Operator::DivAssign
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::NotEq
                | Operator::Less
                | Operator::LessEq
                | Operator::Greater
                | Operator::GreaterEq
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
