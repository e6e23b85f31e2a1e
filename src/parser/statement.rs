use std::fmt::Display;

use super::expression::{Expression, Identifier};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let <name> = <value>;` where the value is optional: `let x;` is legal.
    Let {
        name: Identifier,
        value: Option<Expression>,
    },
    /// `return <value>;` where the value is optional: `return;` is legal.
    Return(Option<Expression>),
    Expression(Expression),
    Block(Block),
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Let {
                name,
                value: Some(value),
            } => write!(f, "let {name} = {value};"),
            Statement::Let { name, value: None } => write!(f, "let {name};"),
            Statement::Return(Some(value)) => write!(f, "return {value};"),
            Statement::Return(None) => write!(f, "return;"),
            Statement::Expression(expression) => write!(f, "{expression}"),
            Statement::Block(block) => write!(f, "{block}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        write!(f, "}}")
    }
}

/// The parse result: a sequence of statements. Its display form is the
/// concatenation of the statements' displays in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}
