//! Recursive reduction of the syntax tree to runtime values.
//!
//! Evaluation is single-threaded and fully synchronous; recursion depth is
//! bounded by source nesting. Runtime failures travel in the `Err` channel
//! and short-circuit every compound form; the `return` sentinel travels as
//! a value so that blocks stay transparent to it.

use compact_str::CompactString;
use std::collections::HashMap;
use std::sync::Arc;

use crate::environment::Environment;
use crate::native;
use crate::parser::expression::{
    Expression, FunctionLiteral, Identifier, InfixOperator, PrefixOperator,
};
use crate::parser::statement::{Block, Program, Statement};
use crate::value::error::RuntimeError;
use crate::value::{Function, HashPair, Value, ValueType};

pub fn eval_program(program: &Program, environment: &Environment) -> Result<Value, RuntimeError> {
    let mut result = Value::Null;
    for statement in &program.statements {
        result = eval_statement(statement, environment)?;
        // Only the program boundary unwraps the sentinel.
        if let Value::Return(inner) = result {
            return Ok(*inner);
        }
    }
    Ok(result)
}

fn eval_statement(statement: &Statement, environment: &Environment) -> Result<Value, RuntimeError> {
    match statement {
        Statement::Let { name, value } => {
            let value = match value {
                Some(expression) => eval_expression(expression, environment)?,
                None => Value::Null,
            };
            environment.set(&name.name, value);
            Ok(Value::Null)
        }
        Statement::Return(value) => {
            let value = match value {
                Some(expression) => eval_expression(expression, environment)?,
                None => Value::Null,
            };
            Ok(Value::Return(Box::new(value)))
        }
        Statement::Expression(expression) => eval_expression(expression, environment),
        Statement::Block(block) => eval_block(block, environment),
    }
}

fn eval_block(block: &Block, environment: &Environment) -> Result<Value, RuntimeError> {
    let mut result = Value::Null;
    for statement in &block.statements {
        result = eval_statement(statement, environment)?;
        // Blocks bubble the sentinel up unchanged.
        if matches!(result, Value::Return(_)) {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_expression(
    expression: &Expression,
    environment: &Environment,
) -> Result<Value, RuntimeError> {
    match expression {
        Expression::Identifier(identifier) => eval_identifier(identifier, environment),
        Expression::Integer(value) => Ok(Value::Integer(*value)),
        Expression::Boolean(value) => Ok(Value::Boolean(*value)),
        Expression::String(text) => Ok(Value::String(text.clone())),
        Expression::Array(items) => Ok(Value::array(eval_expressions(items, environment)?)),
        Expression::Hash(pairs) => eval_hash_literal(pairs, environment),
        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, environment)?;
            eval_prefix_expression(*operator, right)
        }
        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, environment)?;
            let right = eval_expression(right, environment)?;
            eval_infix_expression(*operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => eval_if_expression(condition, consequence, alternative.as_ref(), environment),
        Expression::Function(literal) => Ok(eval_function_literal(literal, environment)),
        Expression::Call {
            function,
            arguments,
        } => {
            let callee = eval_expression(function, environment)?;
            let arguments = eval_expressions(arguments, environment)?;
            apply_function(callee, arguments)
        }
        Expression::Index { container, index } => {
            let container = eval_expression(container, environment)?;
            let index = eval_expression(index, environment)?;
            eval_index_expression(container, index)
        }
    }
}

fn eval_identifier(
    identifier: &Identifier,
    environment: &Environment,
) -> Result<Value, RuntimeError> {
    environment
        .get(&identifier.name)
        .or_else(|| native::lookup(&identifier.name))
        .ok_or_else(|| RuntimeError::UndefinedReference(identifier.name.clone()))
}

/// Left-to-right with the same short-circuit rule as every compound form.
fn eval_expressions(
    expressions: &[Expression],
    environment: &Environment,
) -> Result<Vec<Value>, RuntimeError> {
    expressions
        .iter()
        .map(|expression| eval_expression(expression, environment))
        .collect()
}

fn eval_prefix_expression(
    operator: PrefixOperator,
    right: Value,
) -> Result<Value, RuntimeError> {
    match operator {
        PrefixOperator::Minus => match right {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
            other => Err(RuntimeError::UnknownPrefixOperator {
                operator,
                operand: other.get_type(),
            }),
        },
        PrefixOperator::Bang => match right {
            Value::Boolean(value) => Ok(Value::Boolean(!value)),
            Value::Integer(value) => Ok(Value::Boolean(value == 0)),
            Value::Null => Ok(Value::Boolean(true)),
            other => Err(RuntimeError::UnknownPrefixOperator {
                operator,
                operand: other.get_type(),
            }),
        },
    }
}

fn eval_infix_expression(
    operator: InfixOperator,
    left: Value,
    right: Value,
) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => {
            eval_integer_infix_expression(operator, left, right)
        }
        (Value::Boolean(left), Value::Boolean(right)) => {
            eval_boolean_infix_expression(operator, left, right)
        }
        (Value::String(left), Value::String(right)) => {
            eval_string_infix_expression(operator, &left, &right)
        }
        (left, right) if left.get_type() != right.get_type() => Err(RuntimeError::TypeMismatch {
            left: left.get_type(),
            operator,
            right: right.get_type(),
        }),
        (left, right) => Err(RuntimeError::UnsupportedTypes {
            left: left.get_type(),
            operator,
            right: right.get_type(),
        }),
    }
}

fn eval_integer_infix_expression(
    operator: InfixOperator,
    left: i64,
    right: i64,
) -> Result<Value, RuntimeError> {
    let value = match operator {
        InfixOperator::Add => Value::Integer(left.wrapping_add(right)),
        InfixOperator::Subtract => Value::Integer(left.wrapping_sub(right)),
        InfixOperator::Multiply => Value::Integer(left.wrapping_mul(right)),
        // Division by zero is null, not an error.
        InfixOperator::Divide if right == 0 => Value::Null,
        InfixOperator::Divide => Value::Integer(left.wrapping_div(right)),
        InfixOperator::EqualEqual => Value::Boolean(left == right),
        InfixOperator::BangEqual => Value::Boolean(left != right),
        InfixOperator::LessThan => Value::Boolean(left < right),
        InfixOperator::LessThanEqual => Value::Boolean(left <= right),
        InfixOperator::GreaterThan => Value::Boolean(left > right),
        InfixOperator::GreaterThanEqual => Value::Boolean(left >= right),
        // `%` and `^` parse but have no evaluation rule.
        InfixOperator::Modulo | InfixOperator::Power => {
            return Err(RuntimeError::UnknownIntegerOperator(operator));
        }
    };
    Ok(value)
}

fn eval_boolean_infix_expression(
    operator: InfixOperator,
    left: bool,
    right: bool,
) -> Result<Value, RuntimeError> {
    match operator {
        InfixOperator::EqualEqual => Ok(Value::Boolean(left == right)),
        InfixOperator::BangEqual => Ok(Value::Boolean(left != right)),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: ValueType::Boolean,
            operator,
            right: ValueType::Boolean,
        }),
    }
}

fn eval_string_infix_expression(
    operator: InfixOperator,
    left: &CompactString,
    right: &CompactString,
) -> Result<Value, RuntimeError> {
    match operator {
        InfixOperator::Add => Ok(Value::concat_strings(left, right)),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: ValueType::String,
            operator,
            right: ValueType::String,
        }),
    }
}

fn eval_if_expression(
    condition: &Expression,
    consequence: &Block,
    alternative: Option<&Block>,
    environment: &Environment,
) -> Result<Value, RuntimeError> {
    let condition = eval_expression(condition, environment)?;
    if condition.is_truthy() {
        eval_block(consequence, environment)
    } else if let Some(alternative) = alternative {
        eval_block(alternative, environment)
    } else {
        Ok(Value::Null)
    }
}

fn eval_function_literal(literal: &FunctionLiteral, environment: &Environment) -> Value {
    Value::Function(Arc::new(Function {
        parameters: literal.parameters.clone(),
        body: literal.body.clone(),
        env: environment.clone(),
    }))
}

fn apply_function(callee: Value, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
    match callee {
        Value::Function(function) => {
            let scope = function.env.new_scope();
            // Positional binding without an arity check: surplus arguments
            // are dropped, missing parameters stay unbound.
            for (parameter, argument) in function.parameters.iter().zip(arguments) {
                scope.set(&parameter.name, argument);
            }
            let result = eval_block(&function.body, &scope)?;
            // The call boundary unwraps the sentinel.
            Ok(match result {
                Value::Return(inner) => *inner,
                other => other,
            })
        }
        Value::Builtin(builtin) => builtin.call(&arguments),
        _ => Err(RuntimeError::NotAFunction),
    }
}

fn eval_index_expression(container: Value, index: Value) -> Result<Value, RuntimeError> {
    match container {
        Value::Array(items) => match index {
            Value::Integer(index) => {
                let items = items.lock().unwrap();
                let item = usize::try_from(index)
                    .ok()
                    .and_then(|index| items.get(index).cloned());
                Ok(item.unwrap_or(Value::Null))
            }
            other => Err(RuntimeError::BadArrayIndex(other.get_type())),
        },
        Value::Hash(pairs) => {
            let key = index
                .hash_key()
                .ok_or_else(|| RuntimeError::UnhashableKey(index.get_type()))?;
            Ok(pairs
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Value::Null))
        }
        other => Err(RuntimeError::BadIndexContainer(other.get_type())),
    }
}

fn eval_hash_literal(
    pairs: &[(Expression, Expression)],
    environment: &Environment,
) -> Result<Value, RuntimeError> {
    let mut map = HashMap::new();
    for (key_expression, value_expression) in pairs {
        let key = eval_expression(key_expression, environment)?;
        let hash_key = key
            .hash_key()
            .ok_or_else(|| RuntimeError::UnhashableKey(key.get_type()))?;
        let value = eval_expression(value_expression, environment)?;
        map.insert(hash_key, HashPair { key, value });
    }
    Ok(Value::Hash(Arc::new(map)))
}
