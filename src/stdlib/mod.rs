pub mod collections;
pub mod io;
pub mod math;
pub mod string;


use crate::error::{EvalError, EvalErrorKind};
use crate::interpreter::{Function, Value};

use std::collections::HashMap;
use std::sync::Arc;

pub fn add_stdlib_to_env(globals: &mut HashMap<String, Value>) {
    collections::add_collections(globals);
    string::add_string_functions(globals);
    math::add_math_functions(globals);
    io::add_io_functions(globals);
}

fn insert_fn<F>(globals: &mut HashMap<String, Value>, name: &str, func: F)
where
    F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
{
    let function = Function::Native {
        name: name.to_string(),
        func: Arc::new(func),
    };
    globals.insert(name.to_string(), Value::Function(Arc::new(function)));
}

fn arity(name: &str, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::arity(name, expected, args.len()))
    }
}

fn mismatch(name: &str, expected: &str, got: &Value) -> EvalError {
    EvalError::type_error(format!(
        "`{name}` expects {expected}, got {}",
        got.type_name()
    ))
}

/// The result of `name` would not fit in memory.
fn too_large(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::Overflow,
        format!("`{name}` result is too large to allocate"),
    )
}

fn expect_string<'a>(name: &str, value: &'a Value) -> Result<&'a str, EvalError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch(name, "a string", other)),
    }
}

fn expect_int(name: &str, value: &Value) -> Result<i64, EvalError> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(mismatch(name, "an int", other)),
    }
}

fn expect_number(name: &str, value: &Value) -> Result<f64, EvalError> {
    value.as_f64().ok_or_else(|| mismatch(name, "a number", value))
}

fn expect_array<'a>(name: &str, value: &'a Value) -> Result<&'a [Value], EvalError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(mismatch(name, "an array", other)),
    }
}
