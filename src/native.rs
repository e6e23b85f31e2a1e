use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::value::error::RuntimeError;
use crate::value::{NativeFunction, Value};

static BUILTINS: LazyLock<HashMap<&'static str, Value>> = LazyLock::new(|| {
    let builtins: [Arc<dyn NativeFunction>; 6] = [
        Arc::new(Len),
        Arc::new(Head),
        Arc::new(Foot),
        Arc::new(Tail),
        Arc::new(Push),
        Arc::new(Pop),
    ];
    builtins
        .into_iter()
        .map(|builtin| (builtin.get_name(), Value::Builtin(builtin)))
        .collect()
});

/// Consulted by identifier resolution after the environment chain misses.
pub fn lookup(name: &str) -> Option<Value> {
    BUILTINS.get(name).cloned()
}

fn expect_array(argument: &Value) -> Result<&std::sync::Mutex<Vec<Value>>, RuntimeError> {
    match argument {
        Value::Array(items) => Ok(items),
        other => Err(RuntimeError::BuiltinTypeMismatch {
            expected: "ARRAY",
            actual: other.get_type(),
        }),
    }
}

#[derive(Debug)]
struct Len;

impl NativeFunction for Len {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeError> {
        let [argument] = arguments else {
            return Err(RuntimeError::LenArity(arguments.len()));
        };
        match argument {
            Value::String(text) => Ok(Value::Integer(text.len() as i64)),
            Value::Array(items) => Ok(Value::Integer(items.lock().unwrap().len() as i64)),
            Value::Hash(pairs) => Ok(Value::Integer(pairs.len() as i64)),
            other => Err(RuntimeError::BuiltinTypeMismatch {
                expected: "STRING, ARRAY or HASH",
                actual: other.get_type(),
            }),
        }
    }
}

#[derive(Debug)]
struct Head;

impl NativeFunction for Head {
    fn get_name(&self) -> &'static str {
        "head"
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeError> {
        let [argument] = arguments else {
            return Err(RuntimeError::ExpectedOneArgument(arguments.len()));
        };
        let items = expect_array(argument)?.lock().unwrap();
        Ok(items.first().cloned().unwrap_or(Value::Null))
    }
}

#[derive(Debug)]
struct Foot;

impl NativeFunction for Foot {
    fn get_name(&self) -> &'static str {
        "foot"
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeError> {
        let [argument] = arguments else {
            return Err(RuntimeError::ExpectedOneArgument(arguments.len()));
        };
        let items = expect_array(argument)?.lock().unwrap();
        Ok(items.last().cloned().unwrap_or(Value::Null))
    }
}

#[derive(Debug)]
struct Tail;

impl NativeFunction for Tail {
    fn get_name(&self) -> &'static str {
        "tail"
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeError> {
        let [argument] = arguments else {
            return Err(RuntimeError::ExpectedOneArgument(arguments.len()));
        };
        let items = expect_array(argument)?.lock().unwrap();
        if items.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::array(items[1..].to_vec()))
    }
}

/// `push` is pure: it returns a new array and leaves its input untouched.
#[derive(Debug)]
struct Push;

impl NativeFunction for Push {
    fn get_name(&self) -> &'static str {
        "push"
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeError> {
        let [argument, value] = arguments else {
            return Err(RuntimeError::ExpectedTwoArguments(arguments.len()));
        };
        let items = expect_array(argument)?.lock().unwrap();
        let mut pushed = Vec::with_capacity(items.len() + 1);
        pushed.extend(items.iter().cloned());
        pushed.push(value.clone());
        Ok(Value::array(pushed))
    }
}

/// `pop` mutates: it removes the last element in place, observably through
/// every alias of the array.
#[derive(Debug)]
struct Pop;

impl NativeFunction for Pop {
    fn get_name(&self) -> &'static str {
        "pop"
    }

    fn call(&self, arguments: &[Value]) -> Result<Value, RuntimeError> {
        let [argument] = arguments else {
            return Err(RuntimeError::ExpectedOneArgument(arguments.len()));
        };
        let mut items = expect_array(argument)?.lock().unwrap();
        Ok(items.pop().unwrap_or(Value::Null))
    }
}
