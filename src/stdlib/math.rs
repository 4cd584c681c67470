use crate::error::{EvalError, EvalErrorKind};
use crate::interpreter::Value;
use crate::stdlib::{arity, expect_number, insert_fn, mismatch};

use std::collections::HashMap;

fn float_to_int(name: &str, value: f64) -> Result<Value, EvalError> {
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(Value::Int(value as i64))
    } else {
        Err(EvalError::new(
            EvalErrorKind::Overflow,
            format!("`{name}` result {value} does not fit in an int"),
        ))
    }
}

fn rounding(name: &'static str, op: fn(f64) -> f64) -> impl Fn(&[Value]) -> Result<Value, EvalError> {
    move |args: &[Value]| {
        arity(name, args, 1)?;
        match &args[0] {
            Value::Int(i) => Ok(Value::Int(*i)),
            other => float_to_int(name, op(expect_number(name, other)?)),
        }
    }
}

fn extremum(name: &'static str, pick_left: fn(&Value, &Value) -> bool) -> impl Fn(&[Value]) -> Result<Value, EvalError> {
    move |args: &[Value]| {
        arity(name, args, 2)?;
        let (left, right) = (&args[0], &args[1]);
        expect_number(name, left)?;
        expect_number(name, right)?;
        Ok(if pick_left(left, right) { left.clone() } else { right.clone() })
    }
}

pub fn add_math_functions(globals: &mut HashMap<String, Value>) {
    // abs(n: number) -> number
    insert_fn(globals, "abs", |args| {
        arity("abs", args, 1)?;
        match &args[0] {
            Value::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(|| {
                EvalError::new(EvalErrorKind::Overflow, format!("`abs` of {i} overflows"))
            }),
            Value::Float(f) => Ok(Value::Float(f.abs())),
            other => Err(mismatch("abs", "a number", other)),
        }
    });

    // sqrt(n: number) -> float
    insert_fn(globals, "sqrt", |args| {
        arity("sqrt", args, 1)?;
        Ok(Value::Float(expect_number("sqrt", &args[0])?.sqrt()))
    });

    // pow(base: number, exponent: number) -> float
    insert_fn(globals, "pow", |args| {
        arity("pow", args, 2)?;
        let base = expect_number("pow", &args[0])?;
        let exponent = expect_number("pow", &args[1])?;
        Ok(Value::Float(base.powf(exponent)))
    });

    // max(a: number, b: number) -> number
    insert_fn(globals, "max", extremum("max", |a, b| a.as_f64() >= b.as_f64()));

    // min(a: number, b: number) -> number
    insert_fn(globals, "min", extremum("min", |a, b| a.as_f64() <= b.as_f64()));

    // floor(n: number) -> int
    insert_fn(globals, "floor", rounding("floor", f64::floor));

    // ceil(n: number) -> int
    insert_fn(globals, "ceil", rounding("ceil", f64::ceil));

    // round(n: number) -> int
    insert_fn(globals, "round", rounding("round", f64::round));

    // int(value: number | string | bool) -> int
    insert_fn(globals, "int", |args| {
        arity("int", args, 1)?;
        match &args[0] {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Float(f) => float_to_int("int", f.trunc()),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::String(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                EvalError::type_error(format!("`int` cannot parse {s:?} as an int"))
            }),
            other => Err(mismatch("int", "a number, string or bool", other)),
        }
    });

    // float(value: number | string) -> float
    insert_fn(globals, "float", |args| {
        arity("float", args, 1)?;
        match &args[0] {
            Value::String(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
                EvalError::type_error(format!("`float` cannot parse {s:?} as a float"))
            }),
            other => Ok(Value::Float(expect_number("float", other)?)),
        }
    });
}
