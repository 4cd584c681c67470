use crate::error::EvalError;
use crate::interpreter::Value;
use crate::stdlib::{arity, expect_array, expect_int, expect_string, insert_fn, mismatch, too_large};

use std::collections::HashMap;

pub fn add_collections(globals: &mut HashMap<String, Value>) {
    // len(value: string | array | object) -> int
    insert_fn(globals, "len", |args| {
        arity("len", args, 1)?;
        let len = match &args[0] {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            other => return Err(mismatch("len", "a string, array or object", other)),
        };
        Ok(Value::Int(len as i64))
    });

    // append(array: [T], element: T) -> [T]
    insert_fn(globals, "append", |args| {
        arity("append", args, 2)?;
        let mut items = expect_array("append", &args[0])?.to_vec();
        items.push(args[1].clone());
        Ok(Value::Array(items))
    });

    // slice(array: [T], start: int, end: int) -> [T]
    insert_fn(globals, "slice", |args| {
        arity("slice", args, 3)?;
        let items = expect_array("slice", &args[0])?;
        let (start, end) = (expect_int("slice", &args[1])?, expect_int("slice", &args[2])?);
        let clamp = |i: i64| usize::try_from(i).unwrap_or(0).min(items.len());
        let (start, end) = (clamp(start), clamp(end));
        Ok(Value::Array(items[start..end.max(start)].to_vec()))
    });

    // reverse(array: [T]) -> [T]
    insert_fn(globals, "reverse", |args| {
        arity("reverse", args, 1)?;
        let mut items = expect_array("reverse", &args[0])?.to_vec();
        items.reverse();
        Ok(Value::Array(items))
    });

    // range(end: int) -> [int]
    // range(start: int, end: int) -> [int]
    insert_fn(globals, "range", |args| {
        let (start, end) = match args {
            [end] => (0, expect_int("range", end)?),
            [start, end] => (expect_int("range", start)?, expect_int("range", end)?),
            _ => return Err(EvalError::arity("range", 2, args.len())),
        };
        let len = if end > start {
            usize::try_from(end.abs_diff(start)).map_err(|_| too_large("range"))?
        } else {
            0
        };
        let mut items = Vec::new();
        items.try_reserve_exact(len).map_err(|_| too_large("range"))?;
        items.extend((start..end).map(Value::Int));
        Ok(Value::Array(items))
    });

    // join(array: [T], separator: string) -> string
    insert_fn(globals, "join", |args| {
        arity("join", args, 2)?;
        let items = expect_array("join", &args[0])?;
        let separator = expect_string("join", &args[1])?;
        let parts: Vec<String> = items.iter().map(Value::to_text).collect();
        Ok(Value::String(parts.join(separator)))
    });

    // keys(object: object) -> [string]
    insert_fn(globals, "keys", |args| {
        arity("keys", args, 1)?;
        match &args[0] {
            Value::Object(map) => Ok(Value::Array(
                map.keys().cloned().map(Value::String).collect(),
            )),
            other => Err(mismatch("keys", "an object", other)),
        }
    });

    // values(object: object) -> [T]
    insert_fn(globals, "values", |args| {
        arity("values", args, 1)?;
        match &args[0] {
            Value::Object(map) => Ok(Value::Array(map.values().cloned().collect())),
            other => Err(mismatch("values", "an object", other)),
        }
    });

    // type_of(value: T) -> string
    insert_fn(globals, "type_of", |args| {
        arity("type_of", args, 1)?;
        Ok(Value::from(args[0].type_name()))
    });
}
