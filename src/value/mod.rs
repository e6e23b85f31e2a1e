pub mod error;

use compact_str::{CompactString, CompactStringExt};
use fnv::FnvHasher;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hasher;
use std::sync::{Arc, Mutex};

use crate::environment::Environment;
use crate::parser::expression::Identifier;
use crate::parser::statement::Block;
use error::RuntimeError;

/// A natively-implemented function exposed into the value namespace.
pub trait NativeFunction: std::fmt::Debug + Send + Sync {
    fn get_name(&self) -> &'static str;
    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeError>;
}

/// A user function: parameter list, body, and the environment captured when
/// its literal was evaluated.
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: Block,
    pub env: Environment,
}

/// The type tag of a runtime value, as it appears in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer,
    Boolean,
    String,
    Null,
    Return,
    Array,
    Hash,
    Function,
    Builtin,
}

impl Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Integer => write!(f, "INTEGER"),
            ValueType::Boolean => write!(f, "BOOLEAN"),
            ValueType::String => write!(f, "STRING"),
            ValueType::Null => write!(f, "NULL"),
            ValueType::Return => write!(f, "RETURN"),
            ValueType::Array => write!(f, "ARRAY"),
            ValueType::Hash => write!(f, "HASH"),
            ValueType::Function => write!(f, "FUNCTION"),
            ValueType::Builtin => write!(f, "BUILTIN"),
        }
    }
}

/// A compact fingerprint of a hashable value, used to index hashes.
/// Integers keep their bit pattern, booleans map to 1/0, strings use a
/// 64-bit FNV-1a over their UTF-8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: ValueType,
    pub value: u64,
}

/// A hash entry keeps the original key value alongside the stored value so
/// the pair can be displayed.
#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(CompactString),
    Null,
    /// The unwinding sentinel produced by `return`: blocks bubble it up
    /// unchanged, the program or a function call boundary unwraps it.
    Return(Box<Value>),
    Array(Arc<Mutex<Vec<Value>>>),
    Hash(Arc<HashMap<HashKey, HashPair>>),
    Function(Arc<Function>),
    Builtin(Arc<dyn NativeFunction>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(Mutex::new(items)))
    }

    pub fn get_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
            Value::Null => ValueType::Null,
            Value::Return(_) => ValueType::Return,
            Value::Array(_) => ValueType::Array,
            Value::Hash(_) => ValueType::Hash,
            Value::Function(_) => ValueType::Function,
            Value::Builtin(_) => ValueType::Builtin,
        }
    }

    /// `false`, `null` and `0` are false; every other value is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(value) => *value,
            Value::Null => false,
            Value::Integer(value) => *value != 0,
            _ => true,
        }
    }

    /// Only integers, booleans and strings are hashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(value) => Some(HashKey {
                kind: ValueType::Integer,
                value: *value as u64,
            }),
            Value::Boolean(value) => Some(HashKey {
                kind: ValueType::Boolean,
                value: u64::from(*value),
            }),
            Value::String(text) => {
                let mut hasher = FnvHasher::default();
                hasher.write(text.as_bytes());
                Some(HashKey {
                    kind: ValueType::String,
                    value: hasher.finish(),
                })
            }
            _ => None,
        }
    }

    pub fn concat_strings(left: &CompactString, right: &CompactString) -> Value {
        Value::String([left, right].concat_compact())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::String(text) => write!(f, "'{text}'"),
            Value::Null => write!(f, "null"),
            Value::Return(inner) => write!(f, "{inner}"),
            Value::Array(items) => {
                let items = items.lock().unwrap();
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Hash(pairs) => {
                write!(f, "{{")?;
                for (index, pair) in pairs.values().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
            Value::Function(function) => {
                write!(f, "fn(")?;
                for (index, parameter) in function.parameters.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{parameter}")?;
                }
                write!(f, ") {}", function.body)
            }
            Value::Builtin(builtin) => write!(f, "__builtin__.{}", builtin.get_name()),
        }
    }
}
