use crate::error::EvalError;
use crate::interpreter::Value;
use crate::stdlib::{arity, expect_int, expect_string, insert_fn, mismatch, too_large};

use std::collections::HashMap;

pub fn add_string_functions(globals: &mut HashMap<String, Value>) {
    // str(value: T) -> string
    insert_fn(globals, "str", |args| {
        arity("str", args, 1)?;
        Ok(Value::String(args[0].to_string()))
    });

    // substring(s: string, start: int, end: int) -> string
    insert_fn(globals, "substring", |args| {
        arity("substring", args, 3)?;
        let s = expect_string("substring", &args[0])?;
        let start = usize::try_from(expect_int("substring", &args[1])?).unwrap_or(0);
        let end = usize::try_from(expect_int("substring", &args[2])?).unwrap_or(0);
        let out: String = s.chars().skip(start).take(end.saturating_sub(start)).collect();
        Ok(Value::String(out))
    });

    // to_upper(s: string) -> string
    insert_fn(globals, "to_upper", |args| {
        arity("to_upper", args, 1)?;
        Ok(Value::String(expect_string("to_upper", &args[0])?.to_uppercase()))
    });

    // to_lower(s: string) -> string
    insert_fn(globals, "to_lower", |args| {
        arity("to_lower", args, 1)?;
        Ok(Value::String(expect_string("to_lower", &args[0])?.to_lowercase()))
    });

    // trim(s: string) -> string
    insert_fn(globals, "trim", |args| {
        arity("trim", args, 1)?;
        Ok(Value::from(expect_string("trim", &args[0])?.trim()))
    });

    // split(s: string, delimiter: string) -> [string]
    insert_fn(globals, "split", |args| {
        arity("split", args, 2)?;
        let s = expect_string("split", &args[0])?;
        let delimiter = expect_string("split", &args[1])?;
        let parts: Vec<Value> = if delimiter.is_empty() {
            s.chars().map(|c| Value::String(c.to_string())).collect()
        } else {
            s.split(delimiter).map(Value::from).collect()
        };
        Ok(Value::Array(parts))
    });

    // replace(s: string, from: string, to: string) -> string
    insert_fn(globals, "replace", |args| {
        arity("replace", args, 3)?;
        let s = expect_string("replace", &args[0])?;
        let from = expect_string("replace", &args[1])?;
        let to = expect_string("replace", &args[2])?;
        Ok(Value::String(s.replace(from, to)))
    });

    // contains(s: string, substring: string) -> bool
    // contains(array: [T], element: T) -> bool
    insert_fn(globals, "contains", |args| {
        arity("contains", args, 2)?;
        match &args[0] {
            Value::String(s) => Ok(Value::Bool(s.contains(expect_string("contains", &args[1])?))),
            Value::Array(items) => Ok(Value::Bool(items.contains(&args[1]))),
            other => Err(mismatch("contains", "a string or an array", other)),
        }
    });

    // starts_with(s: string, prefix: string) -> bool
    insert_fn(globals, "starts_with", |args| {
        arity("starts_with", args, 2)?;
        let s = expect_string("starts_with", &args[0])?;
        Ok(Value::Bool(s.starts_with(expect_string("starts_with", &args[1])?)))
    });

    // ends_with(s: string, suffix: string) -> bool
    insert_fn(globals, "ends_with", |args| {
        arity("ends_with", args, 2)?;
        let s = expect_string("ends_with", &args[0])?;
        Ok(Value::Bool(s.ends_with(expect_string("ends_with", &args[1])?)))
    });

    // repeat(s: string, times: int) -> string
    insert_fn(globals, "repeat", |args| {
        arity("repeat", args, 2)?;
        let s = expect_string("repeat", &args[0])?;
        let times = usize::try_from(expect_int("repeat", &args[1])?)
            .map_err(|_| EvalError::type_error("`repeat` expects a non-negative count"))?;
        if s.is_empty() {
            return Ok(Value::String(String::new()));
        }

        let len = s.len().checked_mul(times).ok_or_else(|| too_large("repeat"))?;
        let mut repeated = String::new();
        repeated
            .try_reserve_exact(len)
            .map_err(|_| too_large("repeat"))?;
        for _ in 0..times {
            repeated.push_str(s);
        }
        Ok(Value::String(repeated))
    });
}
