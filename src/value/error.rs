use compact_str::CompactString;
use thiserror::Error;

use super::ValueType;
use crate::parser::expression::{InfixOperator, PrefixOperator};

/// A runtime failure. Errors flow through the same path as ordinary values:
/// every compound evaluation short-circuits on the first one and the driver
/// renders it as `ERROR: <message>`. The message templates are part of the
/// language surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ValueType,
        operator: InfixOperator,
        right: ValueType,
    },
    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: ValueType,
    },
    #[error("unknown operator: {0}INTEGER")]
    UnknownIntegerOperator(InfixOperator),
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ValueType,
        operator: InfixOperator,
        right: ValueType,
    },
    #[error("unsupported types: {left} {operator} {right}")]
    UnsupportedTypes {
        left: ValueType,
        operator: InfixOperator,
        right: ValueType,
    },
    #[error("reference error: {0} is not defined")]
    UndefinedReference(CompactString),
    #[error("not a function")]
    NotAFunction,
    #[error("value error: unhashable type as hash key: {0}")]
    UnhashableKey(ValueType),
    #[error("type error: {0} cannot be used as index of ARRAY")]
    BadArrayIndex(ValueType),
    #[error("type error: {0} cannot be used as index expression")]
    BadIndexContainer(ValueType),
    // Builtin contract violations. `len` spells its arity error differently
    // from its siblings; the casing is part of the surface.
    #[error("Type error: Expected 1 argument. Got {0}")]
    LenArity(usize),
    #[error("type error: Expected 1 argument. Got {0}")]
    ExpectedOneArgument(usize),
    #[error("type error: Expected 2 arguments. Got {0}")]
    ExpectedTwoArguments(usize),
    #[error("type mismatch: Expected {expected}. Got {actual}")]
    BuiltinTypeMismatch {
        expected: &'static str,
        actual: ValueType,
    },
}
