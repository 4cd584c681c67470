use crate::ast::{Expr, Spanned};
use crate::error::SyntaxError;
use crate::lexer::Token;
use crate::parser::{ParseResult, Parser};

use ariadne::{Color, Fmt};

use std::ops::Range;

pub fn lambda_syntax() -> String {
    format!(
        "the syntax for a function is '{}({}, {}, ...) {} expression'",
        Fmt::fg("fn", Color::Yellow),
        Fmt::fg("arg1", Color::Rgb(150, 200, 100)),
        Fmt::fg("arg2", Color::Rgb(150, 200, 100)),
        Fmt::fg("->", Color::Yellow),
    )
}

impl Parser {
    pub fn parse_lambda(&mut self, span_fn: Range<usize>) -> ParseResult<Spanned<Expr>> {
        self.expect(Token::LParen, "`(` after `fn`")
            .map_err(|error| error.with_note(lambda_syntax()))?;

        let mut args = vec![];
        if self.eat(&Token::RParen).is_none() {
            loop {
                let arg = self
                    .expect_identifier("a parameter name")
                    .map_err(|error| error.with_note(lambda_syntax()))?;
                if args.contains(&arg) {
                    return Err(SyntaxError::new(
                        span_fn,
                        format!("duplicate parameter `{arg}`"),
                        "parameters must have distinct names",
                    ));
                }
                args.push(arg);

                match self.next_token("`,` or `)` after a parameter")? {
                    (Token::Comma, _) => {}
                    (Token::RParen, _) => break,
                    other => {
                        return Err(self
                            .unexpected(Some(other), "`,` or `)` after a parameter")
                            .with_note(lambda_syntax()));
                    }
                }
            }
        }

        self.expect(Token::Arrow, "`->` before the function body")
            .map_err(|error| error.with_note(lambda_syntax()))?;
        let expression = self.parse_expression()?;
        let span = span_fn.start..expression.1.end;

        Ok((
            Expr::Lambda {
                args,
                expression: Box::new(expression),
            },
            span,
        ))
    }

    /// Arguments after an already consumed `(`, plus the span of the `)`.
    pub fn parse_call_args(&mut self) -> ParseResult<(Vec<Spanned<Expr>>, Range<usize>)> {
        let mut args = vec![];

        loop {
            if let Some(span_close) = self.eat(&Token::RParen) {
                return Ok((args, span_close));
            }

            args.push(self.parse_expression()?);

            match self.next_token("`,` or `)` in function call")? {
                (Token::Comma, _) => {}
                (Token::RParen, span_close) => return Ok((args, span_close)),
                other => {
                    return Err(self.unexpected(Some(other), "`,` or `)` in function call"));
                }
            }
        }
    }
}
