use crate::ast::{Expr, Spanned};
use crate::lexer::Token;
use crate::parser::{ParseResult, Parser};

use ariadne::{Color, Fmt};

use std::ops::Range;

fn if_syntax() -> String {
    format!(
        "the syntax for 'if' is '{} condition {} expression {} expression'",
        Fmt::fg("if", Color::Yellow),
        Fmt::fg("then", Color::Yellow),
        Fmt::fg("else", Color::Yellow),
    )
}

fn loop_syntax() -> String {
    format!(
        "loops are written '{} condition {} ... {}' or '{} name {} values {} ... {}'",
        Fmt::fg("while", Color::Yellow),
        Fmt::fg("do", Color::Yellow),
        Fmt::fg("end", Color::Yellow),
        Fmt::fg("for", Color::Yellow),
        Fmt::fg("in", Color::Yellow),
        Fmt::fg("do", Color::Yellow),
        Fmt::fg("end", Color::Yellow),
    )
}

impl Parser {
    pub fn parse_if(&mut self, span: Range<usize>) -> ParseResult<Spanned<Expr>> {
        let condition = self.parse_expression()?;
        self.expect(Token::KeywordThen, "`then` after the condition")
            .map_err(|error| error.with_note(if_syntax()))?;
        let if_branch = self.parse_expression()?;

        let else_branch = match self.eat(&Token::KeywordElse) {
            Some(_) => Some(Box::new(self.parse_expression()?)),
            None => None,
        };

        let end = else_branch
            .as_ref()
            .map_or(if_branch.1.end, |branch| branch.1.end);
        Ok((
            Expr::IfElse {
                condition: Box::new(condition),
                if_branch: Box::new(if_branch),
                else_branch,
            },
            span.start..end,
        ))
    }

    pub fn parse_while(&mut self, span: Range<usize>) -> ParseResult<Spanned<Expr>> {
        let condition = self.parse_expression()?;
        let body = self.parse_loop_body()?;
        let end = body.1.end;
        Ok((
            Expr::While {
                condition: Box::new(condition),
                body: Box::new(body),
            },
            span.start..end,
        ))
    }

    pub fn parse_for(&mut self, span: Range<usize>) -> ParseResult<Spanned<Expr>> {
        let var = self
            .expect_identifier("a loop variable after `for`")
            .map_err(|error| error.with_note(loop_syntax()))?;
        self.expect(Token::KeywordIn, "`in` after the loop variable")
            .map_err(|error| error.with_note(loop_syntax()))?;
        let iterable = self.parse_expression()?;
        let body = self.parse_loop_body()?;
        let end = body.1.end;
        Ok((
            Expr::For {
                var,
                iterable: Box::new(iterable),
                body: Box::new(body),
            },
            span.start..end,
        ))
    }

    fn parse_loop_body(&mut self) -> ParseResult<Spanned<Expr>> {
        let span_do = self
            .expect(Token::KeywordDo, "`do` to start the loop body")
            .map_err(|error| error.with_note(loop_syntax()))?;
        self.parse_block(span_do)
    }
}
