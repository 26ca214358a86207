use std::ops::Range;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation: -x
    Negation,
    /// Numeric conversion: +x
    Plus,
    /// Logical not: !x
    LogicalNot,
    /// typeof x
    TypeOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    LogicalAnd,
    LogicalOr,
    StrictEquality,
    StrictInequality,
    LooseEquality,
    LooseInequality,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Const,
    Let,
    Var,
}

/// An arrow function literal. `source` is the exact text it was parsed
/// from, which is also how the function prints.
#[derive(Debug, Clone)]
pub struct ArrowFunction {
    pub params: Vec<String>,
    pub body: Expr,
    pub source: String,
}

/// An expression AST node.
#[derive(Debug, Clone)]
pub enum Expr {
    // Literals
    NumberLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    UndefinedLiteral,
    ArrayLiteral(Vec<Expr>),
    ObjectLiteral(Vec<(String, Expr)>),

    // References
    Variable(String, Range<usize>),
    Member {
        object: Box<Expr>,
        property: String,
        span: Range<usize>,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        span: Range<usize>,
    },

    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        span: Range<usize>,
    },
    Arrow(Rc<ArrowFunction>),

    // Operations
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    BinaryOperation {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        true_branch: Box<Expr>,
        false_branch: Box<Expr>,
    },
}

/// A complete input: the sandbox runs exactly one of these per evaluation.
#[derive(Debug, Clone)]
pub enum Statement {
    Expression(Expr),
    /// `const x = e` and friends. Evaluates to `undefined`.
    Declaration {
        kind: DeclarationKind,
        name: String,
        value: Expr,
    },
    /// `x = e`. Evaluates to the assigned value.
    Assignment { name: String, value: Expr },
    /// `global.x = e`. Binds in the outermost scope.
    GlobalAssignment { name: String, value: Expr },
}
