mod error;
pub mod expression;
pub mod statement;

pub use error::ParserError;

use crate::lexer::{Lexer, Token, TokenKind};
use expression::{
    Expression, FunctionLiteral, Identifier, InfixOperator, Precedence, PrefixOperator,
};
use statement::{Block, Program, Statement};

/// Parses a source string into a program plus whatever errors were found
/// along the way. Callers should skip evaluation when the error list is
/// non-empty; the program is the best-effort result.
pub fn parse(source: &str) -> (Program, Vec<ParserError>) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    (program, parser.into_errors())
}

/// Hand-written Pratt parser with two-token lookahead.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current_token: Token,
    peek_token: Token,
    errors: Vec<ParserError>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current_token = lexer.next_token();
        let peek_token = lexer.next_token();
        Self {
            lexer,
            current_token,
            peek_token,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while self.current_token.kind != TokenKind::Eof {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        Program { statements }
    }
}

// Token plumbing
impl<'src> Parser<'src> {
    fn next_token(&mut self) {
        self.current_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn current_token_is(&self, kind: TokenKind) -> bool {
        self.current_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    /// Advances onto the peek token when it has the expected kind; records a
    /// diagnostic and stays put otherwise.
    fn expect_peek(&mut self, expected: TokenKind) -> bool {
        if self.peek_token_is(expected) {
            self.next_token();
            true
        } else {
            self.errors.push(ParserError::UnexpectedToken {
                expected,
                actual: self.peek_token.kind,
                literal: self.peek_token.literal.clone(),
            });
            false
        }
    }

    fn peek_infix_operator(&self) -> Option<InfixOperator> {
        match self.peek_token.kind {
            TokenKind::Plus => Some(InfixOperator::Add),
            TokenKind::Minus => Some(InfixOperator::Subtract),
            TokenKind::Star => Some(InfixOperator::Multiply),
            TokenKind::Slash => Some(InfixOperator::Divide),
            TokenKind::Percent => Some(InfixOperator::Modulo),
            TokenKind::Caret => Some(InfixOperator::Power),
            TokenKind::LessThan => Some(InfixOperator::LessThan),
            TokenKind::LessThanEqual => Some(InfixOperator::LessThanEqual),
            TokenKind::GreaterThan => Some(InfixOperator::GreaterThan),
            TokenKind::GreaterThanEqual => Some(InfixOperator::GreaterThanEqual),
            TokenKind::EqualEqual => Some(InfixOperator::EqualEqual),
            TokenKind::BangEqual => Some(InfixOperator::BangEqual),
            _ => None,
        }
    }
}

// Statements
impl<'src> Parser<'src> {
    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current_token.kind {
            TokenKind::KeywordLet => self.parse_let_statement(),
            TokenKind::KeywordReturn => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        let name = Identifier::new(self.current_token.literal.clone());

        // Bare declaration: `let x;`
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
            return Some(Statement::Let { name, value: None });
        }

        if !self.expect_peek(TokenKind::Equal) {
            return None;
        }
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Let {
            name,
            value: Some(value),
        })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
            return Some(Statement::Return(None));
        }
        // A closing brace or the end of input also ends a bare `return`.
        if self.peek_token_is(TokenKind::RightBrace) || self.peek_token_is(TokenKind::Eof) {
            return Some(Statement::Return(None));
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Return(Some(value)))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
        Some(Statement::Expression(expression))
    }

    /// The caller has already consumed `{`; on return the parser sits on the
    /// matching `}` (or on `Eof` for unterminated input).
    fn parse_block(&mut self) -> Block {
        let mut statements = Vec::new();
        self.next_token();
        while !self.current_token_is(TokenKind::RightBrace)
            && !self.current_token_is(TokenKind::Eof)
        {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.next_token();
        }
        Block { statements }
    }
}

// The Pratt core
impl<'src> Parser<'src> {
    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenKind::Semicolon) {
            if let Some(operator) = self.peek_infix_operator() {
                if precedence < operator.precedence() {
                    self.next_token();
                    left = self.parse_infix_expression(operator, left)?;
                    continue;
                }
            } else if self.peek_token_is(TokenKind::LeftParenthesis)
                && precedence < Precedence::Call
            {
                self.next_token();
                left = self.parse_call_expression(left)?;
                continue;
            } else if self.peek_token_is(TokenKind::LeftBracket) && precedence < Precedence::Index {
                self.next_token();
                left = self.parse_index_expression(left)?;
                continue;
            }
            break;
        }
        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current_token.kind {
            TokenKind::Ident => Some(Expression::Identifier(Identifier::new(
                self.current_token.literal.clone(),
            ))),
            TokenKind::IntegerLiteral => self.parse_integer_literal(),
            TokenKind::KeywordTrue => Some(Expression::Boolean(true)),
            TokenKind::KeywordFalse => Some(Expression::Boolean(false)),
            TokenKind::StringLiteral => {
                Some(Expression::String(self.current_token.literal.clone()))
            }
            TokenKind::Bang => self.parse_prefix_expression(PrefixOperator::Bang),
            TokenKind::Minus => self.parse_prefix_expression(PrefixOperator::Minus),
            TokenKind::LeftParenthesis => self.parse_grouped_expression(),
            TokenKind::KeywordIf => self.parse_if_expression(),
            TokenKind::KeywordFunction => self.parse_function_literal(),
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_hash_literal(),
            kind => {
                self.errors.push(ParserError::MissingPrefixParser(kind));
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.current_token.literal.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                self.errors.push(ParserError::MalformedInteger(
                    self.current_token.literal.clone(),
                ));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> Option<Expression> {
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(
        &mut self,
        operator: InfixOperator,
        left: Expression,
    ) -> Option<Expression> {
        // Recursing at the operator's own precedence makes every binary
        // operator left-associative.
        let precedence = operator.precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    // A grouped expression has no node of its own: infix nodes print their
    // own parentheses.
    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let inner = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightParenthesis) {
            return None;
        }
        Some(inner)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LeftParenthesis) {
            return None;
        }
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightParenthesis) {
            return None;
        }
        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let consequence = self.parse_block();

        let mut alternative = None;
        if self.peek_token_is(TokenKind::KeywordElse) {
            self.next_token();
            if !self.expect_peek(TokenKind::LeftBrace) {
                return None;
            }
            alternative = Some(self.parse_block());
        }

        Some(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::LeftParenthesis) {
            return None;
        }
        let parameters = self.parse_function_parameters()?;
        if !self.expect_peek(TokenKind::LeftBrace) {
            return None;
        }
        let body = self.parse_block();
        Some(Expression::Function(FunctionLiteral { parameters, body }))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();
        if self.peek_token_is(TokenKind::RightParenthesis) {
            self.next_token();
            return Some(parameters);
        }

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }
        parameters.push(Identifier::new(self.current_token.literal.clone()));

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            if !self.expect_peek(TokenKind::Ident) {
                return None;
            }
            parameters.push(Identifier::new(self.current_token.literal.clone()));
        }

        if !self.expect_peek(TokenKind::RightParenthesis) {
            return None;
        }
        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TokenKind::RightParenthesis)?;
        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_index_expression(&mut self, container: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::RightBracket) {
            return None;
        }
        Some(Expression::Index {
            container: Box::new(container),
            index: Box::new(index),
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let items = self.parse_expression_list(TokenKind::RightBracket)?;
        Some(Expression::Array(items))
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut items = Vec::new();
        if self.peek_token_is(end) {
            self.next_token();
            return Some(items);
        }

        self.next_token();
        items.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            items.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(items)
    }

    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = Vec::new();
        while !self.peek_token_is(TokenKind::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_token_is(TokenKind::RightBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }
        if !self.expect_peek(TokenKind::RightBrace) {
            return None;
        }
        Some(Expression::Hash(pairs))
    }
}
