//! Error types shared by the pipeline.
//!
//! [`SyntaxError`] comes out of the script front end, [`EvalError`] out of the
//! interpreter and host functions. Both reach the caller wrapped in a single
//! [`TemplateError`], which also knows which instruction failed and can render
//! itself as an `ariadne` report over the template source.

use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use thiserror::Error;

use std::io;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub label: String,
    pub span: Range<usize>,
    pub note: Option<String>,
}

impl SyntaxError {
    pub fn new(span: Range<usize>, message: impl Into<String>, label: impl Into<String>) -> Self {
        SyntaxError {
            message: message.into(),
            label: label.into(),
            span,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalErrorKind {
    UndefinedVariable,
    TypeError,
    DivisionByZero,
    Overflow,
    IndexOutOfBounds,
    NotCallable,
    ArityMismatch,
    /// A deferred value reached output outside the asynchronous mode, or was
    /// awaited twice.
    Pending,
    HostError,
    /// Function calls nested deeper than the interpreter allows.
    RecursionLimit,
}

/// A failure raised while a fragment runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    pub span: Option<Range<usize>>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Attach a span unless a more precise one is already present.
    pub fn with_span(mut self, span: Range<usize>) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(
            EvalErrorKind::UndefinedVariable,
            format!("`{name}` is not defined"),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::TypeError, message)
    }

    pub fn arity(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            EvalErrorKind::ArityMismatch,
            format!("`{name}` takes {expected} argument(s) but {got} were given"),
        )
    }

    pub fn host_error(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::HostError, message)
    }
}

/// What went wrong inside a failed template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Cause {
    #[error("{}", join_messages(.0))]
    Syntax(Vec<SyntaxError>),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

fn join_messages(errors: &[SyntaxError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The single failure type of the engine. Syntax and runtime failures are
/// both "template execution failed"; `cause` tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template execution failed: {cause}")]
pub struct TemplateError {
    /// Index of the failing instruction in the compiled program.
    pub instruction: usize,
    /// Source span of the failing fragment body.
    pub span: Range<usize>,
    #[source]
    pub cause: Cause,
}

impl TemplateError {
    pub fn new(instruction: usize, span: Range<usize>, cause: impl Into<Cause>) -> Self {
        TemplateError {
            instruction,
            span,
            cause: cause.into(),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self.cause, Cause::Syntax(_))
    }

    /// Build a diagnostic pointing into the template source.
    pub fn report(&self, file: &str) -> Report<'static, (String, Range<usize>)> {
        let file = file.to_string();
        let mut colors = ColorGenerator::new();

        match &self.cause {
            Cause::Syntax(errors) => {
                let mut report = Report::build(ReportKind::Error, (file.clone(), self.span.clone()))
                    .with_code("Syntax Error")
                    .with_message(format!(
                        "template execution failed: invalid fragment (instruction {})",
                        self.instruction
                    ));
                for error in errors {
                    report = report.with_label(
                        Label::new((file.clone(), error.span.clone()))
                            .with_message(&error.label)
                            .with_color(colors.next()),
                    );
                    if let Some(note) = &error.note {
                        report = report.with_note(note);
                    }
                }
                report.finish()
            }
            Cause::Eval(error) => {
                let span = error.span.clone().unwrap_or_else(|| self.span.clone());
                Report::build(ReportKind::Error, (file.clone(), span.clone()))
                    .with_code(format!("{:?}", error.kind))
                    .with_message(format!(
                        "template execution failed: fragment raised an error (instruction {})",
                        self.instruction
                    ))
                    .with_label(
                        Label::new((file, span))
                            .with_message(&error.message)
                            .with_color(colors.next()),
                    )
                    .finish()
            }
        }
    }

    /// Print the diagnostic to stderr.
    pub fn eprint(&self, file: &str, source: &str) -> io::Result<()> {
        self.report(file)
            .eprint((file.to_string(), Source::from(source)))
    }
}
