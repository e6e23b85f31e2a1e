use compact_str::CompactString;
use std::fmt::Display;

use super::statement::Block;

/// Binding strength ladder for the Pratt loop, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    /// `==` and `!=`
    Equals,
    /// `<`, `>`, `<=` and `>=`
    LessGreater,
    /// `+` and `-`
    Sum,
    /// `%`
    Module,
    /// `*` and `/`
    Product,
    /// `^`
    Power,
    /// unary `!` and `-`
    Prefix,
    /// `(` in infix position
    Call,
    /// `[` in infix position
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixOperator::Bang => write!(f, "!"),
            PrefixOperator::Minus => write!(f, "-"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    EqualEqual,
    BangEqual,
}

impl InfixOperator {
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::EqualEqual | Self::BangEqual => Precedence::Equals,
            Self::LessThan | Self::LessThanEqual | Self::GreaterThan | Self::GreaterThanEqual => {
                Precedence::LessGreater
            }
            Self::Add | Self::Subtract => Precedence::Sum,
            Self::Modulo => Precedence::Module,
            Self::Multiply | Self::Divide => Precedence::Product,
            Self::Power => Precedence::Power,
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfixOperator::Add => write!(f, "+"),
            InfixOperator::Subtract => write!(f, "-"),
            InfixOperator::Multiply => write!(f, "*"),
            InfixOperator::Divide => write!(f, "/"),
            InfixOperator::Modulo => write!(f, "%"),
            InfixOperator::Power => write!(f, "^"),
            InfixOperator::LessThan => write!(f, "<"),
            InfixOperator::LessThanEqual => write!(f, "<="),
            InfixOperator::GreaterThan => write!(f, ">"),
            InfixOperator::GreaterThanEqual => write!(f, ">="),
            InfixOperator::EqualEqual => write!(f, "=="),
            InfixOperator::BangEqual => write!(f, "!="),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: CompactString,
}

impl Identifier {
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self { name: name.into() }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<Identifier>,
    pub body: Block,
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn(")?;
        for (index, parameter) in self.parameters.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}")?;
        }
        write!(f, ") {}", self.body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Integer(i64),
    Boolean(bool),
    String(CompactString),
    Array(Vec<Expression>),
    /// Pairs in source order; duplicate keys are permitted and the last
    /// write wins at evaluation time.
    Hash(Vec<(Expression, Expression)>),
    Prefix {
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    Infix {
        operator: InfixOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Function(FunctionLiteral),
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    Index {
        container: Box<Expression>,
        index: Box<Expression>,
    },
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Identifier(identifier) => write!(f, "{identifier}"),
            Expression::Integer(value) => write!(f, "{value}"),
            Expression::Boolean(value) => write!(f, "{value}"),
            Expression::String(text) => write!(f, "\"{text}\""),
            Expression::Array(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Expression::Hash(pairs) => {
                write!(f, "{{")?;
                for (index, (key, value)) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Expression::Prefix { operator, right } => write!(f, "({operator}{right})"),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if ({condition}) {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, " else {alternative}")?;
                }
                Ok(())
            }
            Expression::Function(function) => write!(f, "{function}"),
            Expression::Call {
                function,
                arguments,
            } => {
                write!(f, "{function}(")?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
            Expression::Index { container, index } => write!(f, "({container}[{index}])"),
        }
    }
}
