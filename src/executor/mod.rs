//! Runs a compiled [`Program`].
//!
//! Running happens in two steps. [`Executor::prepare`] parses every fragment
//! and yields a [`Procedure`]; a syntax error anywhere stops the template
//! before any fragment has run. The procedure is then called with a
//! [`Context`], synchronously or asynchronously. Either way the output
//! buffer starts empty, instructions run strictly in program order, and the
//! first failure aborts the run. It is logged once at that boundary and
//! handed back as a [`TemplateError`].

use crate::compiler::{Instruction, Program};
use crate::error::{Cause, EvalError, EvalErrorKind, SyntaxError, TemplateError};
use crate::interpreter::{Context, Interpreter, Value};

use std::ops::Range;


/// The seam between the template machinery and the script language.
pub trait Evaluator {
    /// A parsed fragment body.
    type Fragment;
    /// State shared by all fragments of one run.
    type Scope;

    /// Parse a fragment body starting at byte `offset` of the template.
    fn parse(&self, source: &str, offset: usize) -> Result<Self::Fragment, Vec<SyntaxError>>;

    fn scope(&self, context: Context) -> Self::Scope;

    /// Run a statement fragment in the shared scope.
    fn execute(&self, fragment: &Self::Fragment, scope: &mut Self::Scope) -> Result<(), EvalError>;

    /// Evaluate a value fragment in a child scope of the shared one.
    fn evaluate(&self, fragment: &Self::Fragment, scope: &mut Self::Scope) -> Result<Value, EvalError>;
}

enum Step<F> {
    Text(String),
    Emit(F),
    Exec(F),
}

/// A program whose fragments are parsed and ready to run.
pub struct Procedure<'e, E: Evaluator> {
    evaluator: &'e E,
    steps: Vec<(Step<E::Fragment>, Range<usize>)>,
}

impl<'e, E: Evaluator> Procedure<'e, E> {
    pub fn new(evaluator: &'e E, program: &Program) -> Result<Self, TemplateError> {
        let mut steps = Vec::with_capacity(program.len());

        for (index, (instruction, span)) in program.instructions().iter().enumerate() {
            let parse = |source: &str| {
                evaluator
                    .parse(source, span.start)
                    .map_err(|errors| TemplateError::new(index, span.clone(), Cause::Syntax(errors)))
            };

            let step = match instruction {
                Instruction::Text(text) => Step::Text(text.clone()),
                Instruction::Emit(source) => Step::Emit(parse(source)?),
                Instruction::Exec(source) => Step::Exec(parse(source)?),
            };
            steps.push((step, span.clone()));
        }

        Ok(Procedure { evaluator, steps })
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn call(&self, context: Context) -> Result<String, TemplateError> {
        let mut scope = self.evaluator.scope(context);
        let mut output = String::new();

        let result = self.steps.iter().enumerate().try_for_each(|(index, (step, span))| {
            let fail = |error: EvalError| TemplateError::new(index, span.clone(), error);
            match step {
                Step::Text(text) => output.push_str(text),
                Step::Exec(fragment) => self.evaluator.execute(fragment, &mut scope).map_err(fail)?,
                Step::Emit(fragment) => {
                    let value = self.evaluator.evaluate(fragment, &mut scope).map_err(fail)?;
                    if let Value::Deferred(_) = value {
                        return Err(fail(pending_in_sync_mode(span)));
                    }
                    output.push_str(&value.to_text());
                }
            }
            Ok(())
        });

        report(result.map(|()| output))
    }

    /// Like [`call`](Self::call), but deferred values produced by value
    /// fragments are awaited before the next instruction starts. Statement
    /// fragments are never awaited.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn call_async(&self, context: Context) -> Result<String, TemplateError> {
        let mut scope = self.evaluator.scope(context);
        let mut output = String::new();

        for (index, (step, span)) in self.steps.iter().enumerate() {
            let fail = |error: EvalError| TemplateError::new(index, span.clone(), error);
            match step {
                Step::Text(text) => output.push_str(text),
                Step::Exec(fragment) => {
                    if let Err(error) = self.evaluator.execute(fragment, &mut scope) {
                        return report(Err(fail(error)));
                    }
                }
                Step::Emit(fragment) => {
                    let mut value = match self.evaluator.evaluate(fragment, &mut scope) {
                        Ok(value) => value,
                        Err(error) => return report(Err(fail(error))),
                    };
                    while let Value::Deferred(deferred) = value {
                        value = match deferred.resolve().await {
                            Ok(value) => value,
                            Err(error) => return report(Err(fail(error.with_span(span.clone())))),
                        };
                    }
                    output.push_str(&value.to_text());
                }
            }
        }

        Ok(output)
    }
}

fn pending_in_sync_mode(span: &Range<usize>) -> EvalError {
    EvalError::new(
        EvalErrorKind::Pending,
        "fragment produced a deferred value; render the template asynchronously to await it",
    )
    .with_span(span.clone())
}

/// The single place failures are reported before reaching the caller.
fn report<T>(result: Result<T, TemplateError>) -> Result<T, TemplateError> {
    result.inspect_err(|error| {
        tracing::error!(
            instruction = error.instruction,
            span = ?error.span,
            "{error}"
        );
    })
}

pub struct Executor<E = Interpreter> {
    evaluator: E,
}

impl Default for Executor<Interpreter> {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor<Interpreter> {
    pub fn new() -> Self {
        Executor {
            evaluator: Interpreter::new(),
        }
    }
}

impl<E: Evaluator> Executor<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Executor { evaluator }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    pub fn prepare(&self, program: &Program) -> Result<Procedure<'_, E>, TemplateError> {
        report(Procedure::new(&self.evaluator, program))
    }

    pub fn execute(&self, program: &Program, context: Context) -> Result<String, TemplateError> {
        self.prepare(program)?.call(context)
    }

    /// Fragments are parsed when the returned future is first polled.
    pub async fn execute_async(&self, program: &Program, context: Context) -> Result<String, TemplateError> {
        self.prepare(program)?.call_async(context).await
    }
}

/// Run a program synchronously with the standard interpreter.
pub fn execute(program: &Program, context: Context) -> Result<String, TemplateError> {
    Executor::new().execute(program, context)
}

/// Run a program asynchronously with the standard interpreter.
pub async fn execute_async(program: &Program, context: Context) -> Result<String, TemplateError> {
    Executor::new().execute_async(program, context).await
}
