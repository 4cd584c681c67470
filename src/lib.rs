//! # brittle
//!
//! A minimal text-templating engine. A template is ordinary text with script
//! fragments embedded in two kinds of markers:
//!
//! - `` [`code`] `` runs `code` for its effect; nothing is written.
//! - `` [=`code`] `` evaluates `code` and splices the value into the output.
//! - `` \[`code`] `` is not a marker; it renders as the literal `` [`code`] ``.
//!
//! Rendering is a three stage pipeline: [`template::tokenize`] splits the
//! document, [`compiler::compile`] turns the tokens into a [`Program`], and
//! an [`Executor`] runs that program against a [`Context`]. All fragments of
//! one document share a single script scope, so a binding made in one is
//! visible in the next.
//!
//! ## Quick start
//!
//! ```rust
//! use brittle::{run_template, run_template_with, Context};
//!
//! assert_eq!(run_template("x=[=`1+1`]y").unwrap(), "x=2y");
//! assert_eq!(run_template("[`let n = 2;`][=`n * 3`]").unwrap(), "6");
//!
//! let context = Context::new().with("name", "Ada");
//! assert_eq!(run_template_with("Hi [=`context.name`]", context).unwrap(), "Hi Ada");
//! ```
//!
//! ## Host functions
//!
//! An [`Engine`] carries the functions fragments may call. Asynchronous
//! functions produce deferred values, which only the asynchronous render
//! awaits:
//!
//! ```rust
//! use brittle::{Engine, Value};
//!
//! let mut engine = Engine::new();
//! engine.register_fn("greet", |args| Ok(Value::String(format!("hello {}", args[0]))));
//! assert_eq!(engine.render("[=`greet('you')`]").unwrap(), "hello you");
//! ```
//!
//! Fragments run with the full privileges of the host process. There is no
//! sandbox. The only limits are on nesting: expressions nest at most
//! [`parser::MAX_NESTING`] levels and function calls at most
//! [`interpreter::MAX_CALL_DEPTH`].

pub mod ast;
pub mod compiler;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod stack;
pub mod stdlib;
pub mod template;

pub use compiler::{Instruction, Program, ProgramParseError};
pub use error::{Cause, EvalError, EvalErrorKind, SyntaxError, TemplateError};
pub use executor::{Evaluator, Executor, Procedure};
pub use interpreter::{Context, Interpreter, Value};

use std::future::Future;

/// Tokenize and compile a template without running it.
pub fn compile(source: &str) -> Program {
    compiler::compile(template::tokenize(source))
}

/// A configured rendering engine: the standard interpreter plus whatever
/// host functions have been registered.
#[derive(Default)]
pub struct Engine {
    executor: Executor<Interpreter>,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            executor: Executor::new(),
        }
    }

    /// Bind a global value visible to every fragment.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.executor.evaluator_mut().define(name, value.into());
        self
    }

    pub fn register_fn<F>(&mut self, name: &str, func: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.executor.evaluator_mut().register_fn(name, func);
        self
    }

    /// Register a function whose calls yield deferred values.
    pub fn register_async_fn<F, Fut>(&mut self, name: &str, func: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, EvalError>> + Send + 'static,
    {
        self.executor.evaluator_mut().register_async_fn(name, func);
        self
    }

    pub fn executor(&self) -> &Executor<Interpreter> {
        &self.executor
    }

    /// Render with an empty `context`.
    pub fn render(&self, source: &str) -> Result<String, TemplateError> {
        self.render_with(source, Context::new())
    }

    pub fn render_with(&self, source: &str, context: Context) -> Result<String, TemplateError> {
        self.executor.execute(&compile(source), context)
    }

    pub async fn render_async(&self, source: &str, context: Context) -> Result<String, TemplateError> {
        self.executor.execute_async(&compile(source), context).await
    }
}

/// Render a template with the standard library and an empty `context`.
pub fn run_template(source: &str) -> Result<String, TemplateError> {
    Engine::new().render(source)
}

pub fn run_template_with(source: &str, context: Context) -> Result<String, TemplateError> {
    Engine::new().render_with(source, context)
}

/// Render a template, awaiting deferred values produced by value fragments.
pub async fn run_template_async(source: &str, context: Context) -> Result<String, TemplateError> {
    Engine::new().render_async(source, context).await
}
