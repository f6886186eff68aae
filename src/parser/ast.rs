// AST (Abstract Syntax Tree) definitions for the snippet executor

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Declaration keyword of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclKind::Let => "let",
            DeclKind::Const => "const",
            DeclKind::Var => "var",
        };
        write!(f, "{}", s)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Equality
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    // Relational
    Lt,
    Le,
    Gt,
    Ge,
    // Logical (short-circuit)
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Plus,   // +x
    Not,    // !x
    Typeof, // typeof x
}

/// Object literal property key
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Name(String),
    Number(f64), // Normalized to its string form at evaluation
}

/// AST nodes representing statements and expressions
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    // Statements
    VarDecl {
        kind: DeclKind,
        name: String,
        init: Option<Box<AstNode>>,
        location: SourceLocation,
    },
    ExpressionStatement {
        expr: Box<AstNode>,
        location: SourceLocation,
    },
    Empty {
        location: SourceLocation,
    },

    // Expressions
    NumberLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    BoolLiteral(bool, SourceLocation),
    Null {
        location: SourceLocation,
    },
    Undefined {
        location: SourceLocation,
    },
    Variable(String, SourceLocation),
    ArrayLiteral {
        elements: Vec<AstNode>,
        location: SourceLocation,
    },
    ObjectLiteral {
        properties: Vec<(PropertyKey, AstNode)>,
        location: SourceLocation,
    },
    MemberAccess {
        object: Box<AstNode>,
        member: String,
        location: SourceLocation,
    },
    IndexAccess {
        object: Box<AstNode>,
        index: Box<AstNode>,
        location: SourceLocation,
    },
    Call {
        callee: Box<AstNode>,
        args: Vec<AstNode>,
        location: SourceLocation,
    },
    UnaryOp {
        op: UnOp,
        operand: Box<AstNode>,
        location: SourceLocation,
    },
    BinaryOp {
        op: BinOp,
        left: Box<AstNode>,
        right: Box<AstNode>,
        location: SourceLocation,
    },
    Assignment {
        lhs: Box<AstNode>,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
    CompoundAssignment {
        lhs: Box<AstNode>,
        op: BinOp,
        rhs: Box<AstNode>,
        location: SourceLocation,
    },
}

impl AstNode {
    /// Get the source location of this node
    pub fn location(&self) -> &SourceLocation {
        match self {
            AstNode::VarDecl { location, .. } => location,
            AstNode::ExpressionStatement { location, .. } => location,
            AstNode::Empty { location } => location,
            AstNode::NumberLiteral(_, loc) => loc,
            AstNode::StringLiteral(_, loc) => loc,
            AstNode::BoolLiteral(_, loc) => loc,
            AstNode::Null { location } => location,
            AstNode::Undefined { location } => location,
            AstNode::Variable(_, loc) => loc,
            AstNode::ArrayLiteral { location, .. } => location,
            AstNode::ObjectLiteral { location, .. } => location,
            AstNode::MemberAccess { location, .. } => location,
            AstNode::IndexAccess { location, .. } => location,
            AstNode::Call { location, .. } => location,
            AstNode::UnaryOp { location, .. } => location,
            AstNode::BinaryOp { location, .. } => location,
            AstNode::Assignment { location, .. } => location,
            AstNode::CompoundAssignment { location, .. } => location,
        }
    }

    /// Check if this node can appear on the left of `=`
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            AstNode::Variable(..) | AstNode::MemberAccess { .. } | AstNode::IndexAccess { .. }
        )
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<AstNode>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
