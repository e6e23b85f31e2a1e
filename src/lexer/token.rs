use compact_str::CompactString;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::LazyLock;

/// The hashmap for keyword spellings
pub static KEYWORD_HASHMAP: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    map.insert("fn", TokenKind::KeywordFunction);
    map.insert("function", TokenKind::KeywordFunction);
    map.insert("let", TokenKind::KeywordLet);
    map.insert("if", TokenKind::KeywordIf);
    map.insert("else", TokenKind::KeywordElse);
    map.insert("return", TokenKind::KeywordReturn);
    map.insert("true", TokenKind::KeywordTrue);
    map.insert("false", TokenKind::KeywordFalse);
    map
});

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Parentheses
    LeftParenthesis,
    RightParenthesis,
    // Braces
    LeftBrace,
    RightBrace,
    // Brackets
    LeftBracket,
    RightBracket,
    // Delimiters
    Comma,
    Colon,
    Semicolon,
    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,

    // Literals
    IntegerLiteral,
    StringLiteral,
    Ident,

    // Keywords
    KeywordLet,
    KeywordFunction,
    KeywordIf,
    KeywordElse,
    KeywordReturn,
    KeywordTrue,
    KeywordFalse,

    // Anything the lexer does not recognize.
    Illegal,
    // End of file.
    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftParenthesis => write!(f, "("),
            TokenKind::RightParenthesis => write!(f, ")"),
            TokenKind::LeftBrace => write!(f, "{{"),
            TokenKind::RightBrace => write!(f, "}}"),
            TokenKind::LeftBracket => write!(f, "["),
            TokenKind::RightBracket => write!(f, "]"),
            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),
            TokenKind::Caret => write!(f, "^"),
            TokenKind::Bang => write!(f, "!"),
            TokenKind::BangEqual => write!(f, "!="),
            TokenKind::Equal => write!(f, "="),
            TokenKind::EqualEqual => write!(f, "=="),
            TokenKind::LessThan => write!(f, "<"),
            TokenKind::LessThanEqual => write!(f, "<="),
            TokenKind::GreaterThan => write!(f, ">"),
            TokenKind::GreaterThanEqual => write!(f, ">="),
            TokenKind::IntegerLiteral => write!(f, "int"),
            TokenKind::StringLiteral => write!(f, "string"),
            TokenKind::Ident => write!(f, "ident"),
            TokenKind::KeywordLet => write!(f, "let"),
            TokenKind::KeywordFunction => write!(f, "function"),
            TokenKind::KeywordIf => write!(f, "if"),
            TokenKind::KeywordElse => write!(f, "else"),
            TokenKind::KeywordReturn => write!(f, "return"),
            TokenKind::KeywordTrue => write!(f, "true"),
            TokenKind::KeywordFalse => write!(f, "false"),
            TokenKind::Illegal => write!(f, "ILLEGAL"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

/// A lexed token: a kind tag plus the exact source slice that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: CompactString,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<CompactString>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Self {
            kind: TokenKind::Eof,
            literal: CompactString::default(),
        }
    }
}
