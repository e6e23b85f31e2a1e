use compact_str::CompactString;
use thiserror::Error;

use crate::lexer::TokenKind;

/// A recoverable parse failure. The parser accumulates these and keeps
/// going; the messages quote token literals because tokens carry no
/// line/column information.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("Expected next token to be of type '{expected}'. Got '{actual}' -> {literal}")]
    UnexpectedToken {
        expected: TokenKind,
        actual: TokenKind,
        literal: CompactString,
    },
    #[error("there is not registered prefix parser function for token type \"{0}\"")]
    MissingPrefixParser(TokenKind),
    #[error("unable to parse '{0}' as integer")]
    MalformedInteger(CompactString),
}
