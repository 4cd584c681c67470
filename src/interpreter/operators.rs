//! Arithmetic, comparison and unary operators. `and`/`or` short-circuit and
//! are handled by the interpreter.

use crate::ast::{BinOp, UnOp};
use crate::error::{EvalError, EvalErrorKind};
use crate::interpreter::value::Value;

use std::cmp::Ordering;

fn overflow(op: BinOp) -> EvalError {
    EvalError::new(
        EvalErrorKind::Overflow,
        format!("integer overflow in `{}`", op.symbol()),
    )
}

fn mismatch(op: BinOp, l: &Value, r: &Value) -> EvalError {
    EvalError::type_error(format!(
        "cannot apply `{}` to {} and {}",
        op.symbol(),
        l.type_name(),
        r.type_name()
    ))
}

pub fn binary(op: BinOp, l: Value, r: Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => add(l, r),
        BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod | BinOp::Power => arithmetic(op, &l, &r),
        BinOp::Eq => Ok(Value::Bool(l == r)),
        BinOp::NotEq => Ok(Value::Bool(l != r)),
        BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
            let ordering = compare(&l, &r).ok_or_else(|| mismatch(op, &l, &r))?;
            Ok(Value::Bool(match op {
                BinOp::Less => ordering == Ordering::Less,
                BinOp::Greater => ordering == Ordering::Greater,
                BinOp::LessEq => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        // short-circuit forms never reach here, but keep the plain meaning
        BinOp::And => Ok(if l.is_truthy() { r } else { l }),
        BinOp::Or => Ok(if l.is_truthy() { l } else { r }),
    }
}

fn add(l: Value, r: Value) -> Result<Value, EvalError> {
    match (l, r) {
        (Value::String(mut a), b) => {
            a.push_str(&b.to_string());
            Ok(Value::String(a))
        }
        (a, Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Ok(Value::Array(a))
        }
        (l, r) => arithmetic(BinOp::Add, &l, &r),
    }
}

fn arithmetic(op: BinOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        return int_arithmetic(op, *a, *b);
    }

    let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) else {
        return Err(mismatch(op, l, r));
    };

    Ok(Value::Float(match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Mod => a % b,
        _ => a.powf(b),
    }))
}

fn int_arithmetic(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
    let division_by_zero = || EvalError::new(EvalErrorKind::DivisionByZero, "division by zero");

    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            // exact quotients stay integers
            match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                Some(_) => return Ok(Value::Float(a as f64 / b as f64)),
                None => None,
            }
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(division_by_zero());
            }
            a.checked_rem(b)
        }
        _ => match u32::try_from(b) {
            Ok(exp) => a.checked_pow(exp),
            Err(_) => return Ok(Value::Float((a as f64).powf(b as f64))),
        },
    };

    result.map(Value::Int).ok_or_else(|| overflow(op))
}

pub fn compare(l: &Value, r: &Value) -> Option<Ordering> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

pub fn unary(unop: UnOp, value: Value) -> Result<Value, EvalError> {
    match (unop, value) {
        (UnOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnOp::Minus, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or_else(|| {
            EvalError::new(EvalErrorKind::Overflow, "integer overflow in negation")
        }),
        (UnOp::Minus, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnOp::Plus, value @ (Value::Int(_) | Value::Float(_))) => Ok(value),
        (unop, value) => Err(EvalError::type_error(format!(
            "cannot apply unary `{}` to {}",
            if unop == UnOp::Minus { "-" } else { "+" },
            value.type_name()
        ))),
    }
}
