//! Tree-walking interpreter for fragment bodies.
//!
//! All fragments of one template share a single [`Environment`]. Statement
//! fragments run directly in it, so their `let` bindings stay visible to later
//! fragments; value fragments run in a child frame that is dropped afterwards.
//! Lambdas are dynamically scoped: their parameters are pushed on top of the
//! caller's environment.

pub mod environment;
pub mod operators;
pub mod value;


pub use environment::{Context, Environment};
pub use value::{AsyncFn, BoxFuture, Deferred, Function, NativeFn, Value};

use crate::ast::{BinOp, Block, Expr, Spanned};
use crate::error::{EvalError, EvalErrorKind, SyntaxError};
use crate::executor::Evaluator;
use crate::parser;
use crate::stack::ensure_sufficient_stack;
use crate::stdlib;

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::ops::Range;
use std::sync::Arc;

/// How many lambda calls may be active at once.
pub const MAX_CALL_DEPTH: usize = 1000;

#[derive(Clone)]
pub struct Interpreter {
    globals: HashMap<String, Value>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter with the standard library installed.
    pub fn new() -> Self {
        let mut globals = HashMap::new();
        stdlib::add_stdlib_to_env(&mut globals);
        Interpreter { globals }
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.globals.insert(name.into(), value);
    }

    pub fn register_fn<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        let function = Function::Native {
            name: name.to_string(),
            func: Arc::new(func),
        };
        self.define(name, Value::Function(Arc::new(function)));
    }

    pub fn register_async_fn<F, Fut>(&mut self, name: &str, func: F)
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, EvalError>> + Send + 'static,
    {
        let boxed: AsyncFn = Arc::new(move |args: Vec<Value>| -> BoxFuture<Result<Value, EvalError>> {
            Box::pin(func(args))
        });
        let function = Function::Async {
            name: name.to_string(),
            func: boxed,
        };
        self.define(name, Value::Function(Arc::new(function)));
    }

    /// A fresh scope chain for one template run.
    pub fn environment(&self, context: Context) -> Environment {
        let mut globals = self.globals.clone();
        globals.insert("context".to_string(), context.into());
        Environment::new(globals)
    }

    /// Run statements in order; the value is that of the last one.
    pub fn run_block(&self, block: &[Spanned<Expr>], env: &mut Environment) -> Result<Value, EvalError> {
        let mut last = Value::Null;
        for expr in block {
            last = self.eval(expr, env)?;
        }
        Ok(last)
    }

    pub fn eval(&self, node: &Spanned<Expr>, env: &mut Environment) -> Result<Value, EvalError> {
        ensure_sufficient_stack(|| self.eval_expr(node, env))
    }

    fn eval_expr(&self, node: &Spanned<Expr>, env: &mut Environment) -> Result<Value, EvalError> {
        let (expr, span) = node;
        let at = |error: EvalError| error.with_span(span.clone());

        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::String(s) => Ok(Value::String(s.clone())),

            Expr::Variable(name) => env
                .get(name)
                .cloned()
                .ok_or_else(|| at(EvalError::undefined_variable(name))),

            Expr::Array { elements } => elements
                .iter()
                .map(|element| self.eval(element, env))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),

            Expr::Object { entries } => {
                let mut map = BTreeMap::new();
                for (key, value) in entries {
                    map.insert(key.clone(), self.eval(value, env)?);
                }
                Ok(Value::Object(map))
            }

            Expr::Index { array, index } => {
                let target = self.eval(array, env)?;
                let key = self.eval(index, env)?;
                index_value(target, key).map_err(at)
            }

            Expr::Field { object, field_name } => match self.eval(object, env)? {
                Value::Object(mut map) => Ok(map.remove(field_name).unwrap_or_default()),
                other => Err(at(EvalError::type_error(format!(
                    "cannot read field `{field_name}` of {}",
                    other.type_name()
                )))),
            },

            Expr::Call { function, args } => {
                let callee = self.eval(function, env)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, env))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(&callee, args, env).map_err(at)
            }

            Expr::Lambda { args, expression } => {
                Ok(Value::Function(Arc::new(Function::Lambda {
                    params: args.clone(),
                    body: Arc::new((**expression).clone()),
                })))
            }

            Expr::BinOp {
                operator: BinOp::And,
                l_value,
                r_value,
            } => {
                let l = self.eval(l_value, env)?;
                if !l.is_truthy() {
                    return Ok(l);
                }
                self.eval(r_value, env)
            }

            Expr::BinOp {
                operator: BinOp::Or,
                l_value,
                r_value,
            } => {
                let l = self.eval(l_value, env)?;
                if l.is_truthy() {
                    return Ok(l);
                }
                self.eval(r_value, env)
            }

            Expr::BinOp {
                operator,
                l_value,
                r_value,
            } => {
                let l = self.eval(l_value, env)?;
                let r = self.eval(r_value, env)?;
                operators::binary(*operator, l, r).map_err(at)
            }

            Expr::UnOp { unop, expression } => {
                let value = self.eval(expression, env)?;
                operators::unary(*unop, value).map_err(at)
            }

            Expr::Assign {
                l_value,
                r_value,
                assign_op,
            } => {
                let value = match assign_op.operator() {
                    None => self.eval(r_value, env)?,
                    Some(operator) => {
                        let current = self.eval(l_value, env)?;
                        let rhs = self.eval(r_value, env)?;
                        operators::binary(operator, current, rhs).map_err(at)?
                    }
                };
                self.assign(l_value, value.clone(), env)?;
                Ok(value)
            }

            Expr::Let { var, value } => {
                let value = self.eval(value, env)?;
                env.declare(var.clone(), value);
                Ok(Value::Null)
            }

            Expr::Do { expressions } => env.scoped(|env| self.run_block(expressions, env)),

            Expr::IfElse {
                condition,
                if_branch,
                else_branch,
            } => {
                if self.eval(condition, env)?.is_truthy() {
                    self.eval(if_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.eval(else_branch, env)
                } else {
                    Ok(Value::Null)
                }
            }

            Expr::While { condition, body } => {
                while self.eval(condition, env)?.is_truthy() {
                    self.eval(body, env)?;
                }
                Ok(Value::Null)
            }

            Expr::For {
                var,
                iterable,
                body,
            } => {
                let items = match self.eval(iterable, env)? {
                    Value::Array(items) => items,
                    Value::String(s) => s.chars().map(|c| Value::String(c.to_string())).collect(),
                    Value::Object(map) => map.into_keys().map(Value::String).collect(),
                    other => {
                        return Err(EvalError::type_error(format!(
                            "cannot iterate over {}",
                            other.type_name()
                        ))
                        .with_span(iterable.1.clone()));
                    }
                };

                for item in items {
                    env.scoped(|env| {
                        env.declare(var.clone(), item);
                        self.eval(body, env)
                    })?;
                }
                Ok(Value::Null)
            }
        }
    }

    pub fn call(&self, callee: &Value, args: Vec<Value>, env: &mut Environment) -> Result<Value, EvalError> {
        let Value::Function(function) = callee else {
            return Err(EvalError::new(
                EvalErrorKind::NotCallable,
                format!("{} is not a function", callee.type_name()),
            ));
        };

        match function.as_ref() {
            Function::Native { func, .. } => func(&args),
            Function::Async { func, .. } => Ok(Value::Deferred(Deferred::new(func(args)))),
            Function::Lambda { params, body } => {
                if params.len() != args.len() {
                    return Err(EvalError::arity(function.name(), params.len(), args.len()));
                }
                if env.calls() >= MAX_CALL_DEPTH {
                    return Err(EvalError::new(
                        EvalErrorKind::RecursionLimit,
                        format!("function calls nest deeper than {MAX_CALL_DEPTH} levels"),
                    ));
                }
                env.call_frame(|env| {
                    for (param, arg) in params.iter().zip(args) {
                        env.declare(param.clone(), arg);
                    }
                    self.eval(body, env)
                })
            }
        }
    }

    fn assign(&self, target: &Spanned<Expr>, value: Value, env: &mut Environment) -> Result<(), EvalError> {
        let (root, path) = self.place(target, env)?;
        let slot = env
            .get_mut(&root)
            .ok_or_else(|| EvalError::undefined_variable(&root).with_span(target.1.clone()))?;
        *slot_mut(slot, &path)? = value;
        Ok(())
    }

    /// Resolve an assignment target to a variable name and a path into it.
    fn place(&self, target: &Spanned<Expr>, env: &mut Environment) -> Result<(String, Vec<(Key, Range<usize>)>), EvalError> {
        match &target.0 {
            Expr::Variable(name) => Ok((name.clone(), vec![])),
            Expr::Field { object, field_name } => {
                let (root, mut path) = self.place(object, env)?;
                path.push((Key::Field(field_name.clone()), target.1.clone()));
                Ok((root, path))
            }
            Expr::Index { array, index } => {
                let (root, mut path) = self.place(array, env)?;
                let key = match self.eval(index, env)? {
                    Value::Int(i) => Key::Index(i),
                    Value::String(s) => Key::Field(s),
                    other => {
                        return Err(EvalError::type_error(format!(
                            "cannot index with {}",
                            other.type_name()
                        ))
                        .with_span(index.1.clone()));
                    }
                };
                path.push((key, target.1.clone()));
                Ok((root, path))
            }
            _ => Err(EvalError::type_error("invalid assignment target").with_span(target.1.clone())),
        }
    }
}

enum Key {
    Field(String),
    Index(i64),
}

fn slot_mut<'v>(mut slot: &'v mut Value, path: &[(Key, Range<usize>)]) -> Result<&'v mut Value, EvalError> {
    for (key, span) in path {
        slot = match (slot, key) {
            (Value::Object(map), Key::Field(name)) => map.entry(name.clone()).or_default(),
            (Value::Array(items), Key::Index(i)) => match position(*i, items.len()) {
                Some(index) => &mut items[index],
                None => {
                    return Err(EvalError::new(
                        EvalErrorKind::IndexOutOfBounds,
                        format!(
                            "index {i} is out of bounds for an array of length {}",
                            items.len()
                        ),
                    )
                    .with_span(span.clone()));
                }
            },
            (other, _) => {
                return Err(EvalError::type_error(format!(
                    "cannot assign into {}",
                    other.type_name()
                ))
                .with_span(span.clone()));
            }
        };
    }
    Ok(slot)
}

fn position(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < len)
}

fn index_value(target: Value, key: Value) -> Result<Value, EvalError> {
    match (target, key) {
        (Value::Array(items), Value::Int(i)) => Ok(position(i, items.len())
            .and_then(|i| items.into_iter().nth(i))
            .unwrap_or_default()),
        (Value::String(s), Value::Int(i)) => Ok(usize::try_from(i)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or_default()),
        (Value::Object(mut map), Value::String(key)) => Ok(map.remove(&key).unwrap_or_default()),
        (target, key) => Err(EvalError::type_error(format!(
            "cannot index {} with {}",
            target.type_name(),
            key.type_name()
        ))),
    }
}

impl Evaluator for Interpreter {
    type Fragment = Block;
    type Scope = Environment;

    fn parse(&self, source: &str, offset: usize) -> Result<Block, Vec<SyntaxError>> {
        parser::parse(source, offset)
    }

    fn scope(&self, context: Context) -> Environment {
        self.environment(context)
    }

    fn execute(&self, fragment: &Block, scope: &mut Environment) -> Result<(), EvalError> {
        self.run_block(fragment, scope).map(|_| ())
    }

    fn evaluate(&self, fragment: &Block, scope: &mut Environment) -> Result<Value, EvalError> {
        scope.scoped(|env| self.run_block(fragment, env))
    }
}
