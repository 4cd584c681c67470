pub mod control;
pub mod expression;
pub mod function;

#[cfg(test)]
pub mod test;

use crate::ast::{Block, Expr, Spanned};
use crate::error::SyntaxError;
use crate::lexer::Token;
use crate::stack::ensure_sufficient_stack;

use logos::Logos;

use std::iter::Peekable;
use std::ops::Range;
use std::vec::IntoIter;

type TokenIter = Peekable<IntoIter<(Token, Range<usize>)>>;
pub(crate) type ParseResult<T> = Result<T, SyntaxError>;

/// How deeply expressions may nest: parentheses, blocks, operands, unary and
/// postfix chains all count.
pub const MAX_NESTING: usize = 128;

/// Parse one fragment body. `offset` is where the body starts in the
/// template, so every span in the tree points into the whole document.
pub fn parse(source: &str, offset: usize) -> Result<Block, Vec<SyntaxError>> {
    let mut parser = Parser::new(source, offset)?;
    parser.parse_program().map_err(|error| vec![error])
}

pub struct Parser {
    tokens: TokenIter,
    // span reported for errors at end of input
    eof: Range<usize>,
    depth: usize,
}

impl Parser {
    /// Lex the whole fragment up front; every invalid character is reported.
    pub fn new(source: &str, offset: usize) -> Result<Self, Vec<SyntaxError>> {
        let mut tokens = vec![];
        let mut errors = vec![];

        let Some(end) = offset.checked_add(source.len()) else {
            return Err(vec![SyntaxError::new(
                offset..offset,
                "fragment offset is out of range",
                "this fragment cannot be placed in the document",
            )]);
        };

        for (token, span) in Token::lexer(source).spanned() {
            let text = &source[span.clone()];
            let span = span.start + offset..span.end + offset;
            match token {
                Ok(token) => tokens.push((token, span)),
                Err(()) => errors.push(invalid_token(text, span)),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Parser {
            tokens: tokens.into_iter().peekable(),
            eof: end..end,
            depth: 0,
        })
    }

    pub fn parse_program(&mut self) -> ParseResult<Block> {
        let mut tree = vec![];
        while let Some((token, _)) = self.tokens.peek() {
            if *token == Token::Semicolon {
                self.tokens.next();
                continue;
            }
            tree.push(self.parse_statement()?);
        }
        Ok(tree)
    }

    /// Statements up to (and including) the closing `end`.
    pub fn parse_block(&mut self, start: Range<usize>) -> ParseResult<Spanned<Expr>> {
        let mut expressions = vec![];
        loop {
            let Some((token, span)) = self.tokens.peek() else {
                return Err(SyntaxError::new(
                    start,
                    "reached end of fragment while parsing a block",
                    "this block is never closed with `end`",
                ));
            };
            match token {
                Token::Semicolon => {
                    self.tokens.next();
                }
                Token::KeywordEnd => {
                    let end = span.end;
                    self.tokens.next();
                    return Ok((Expr::Do { expressions }, start.start..end));
                }
                _ => expressions.push(self.parse_statement()?),
            }
        }
    }

    pub fn parse_statement(&mut self) -> ParseResult<Spanned<Expr>> {
        if let Some(span_let) = self.eat(&Token::KeywordLet) {
            return self.parse_let(span_let);
        }
        self.parse_expression()
    }

    fn parse_let(&mut self, span_let: Range<usize>) -> ParseResult<Spanned<Expr>> {
        let var = self.expect_identifier("a variable name after `let`")?;
        self.expect(Token::Assign, "`=` after the variable name")
            .map_err(|error| error.with_note("the syntax for a binding is 'let name = value'"))?;
        let value = self.parse_expression()?;
        let span = span_let.start..value.1.end;
        Ok((
            Expr::Let {
                var,
                value: Box::new(value),
            },
            span,
        ))
    }

    fn next_token(&mut self, expected: &str) -> ParseResult<(Token, Range<usize>)> {
        self.tokens
            .next()
            .ok_or_else(|| self.unexpected(None, expected))
    }

    fn expect(&mut self, token: Token, expected: &str) -> ParseResult<Range<usize>> {
        let (found, span) = self.next_token(expected)?;
        if found == token {
            Ok(span)
        } else {
            Err(self.unexpected(Some((found, span)), expected))
        }
    }

    fn eat(&mut self, token: &Token) -> Option<Range<usize>> {
        if self.tokens.peek().is_some_and(|(found, _)| found == token) {
            self.tokens.next().map(|(_, span)| span)
        } else {
            None
        }
    }

    /// Go one nesting level deeper, failing past [`MAX_NESTING`].
    fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING {
            let span = match self.tokens.peek() {
                Some((_, span)) => span.clone(),
                None => self.eof.clone(),
            };
            return Err(SyntaxError::new(
                span,
                "expression nests too deeply",
                format!("more than {MAX_NESTING} levels deep here"),
            )
            .with_note("split the expression up with `let` bindings"));
        }
        self.depth += 1;
        Ok(())
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.descend()?;
        let result = ensure_sufficient_stack(|| parse(self));
        self.depth -= 1;
        result
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<String> {
        match self.next_token(expected)? {
            (Token::Variable(name), _) => Ok(name),
            other => Err(self.unexpected(Some(other), expected)),
        }
    }

    fn unexpected(&self, found: Option<(Token, Range<usize>)>, expected: &str) -> SyntaxError {
        match found {
            Some((token, span)) => SyntaxError::new(
                span,
                format!("unexpected token `{token}`, expected {expected}"),
                format!("expected {expected}"),
            ),
            None => SyntaxError::new(
                self.eof.clone(),
                format!("unexpected end of fragment, expected {expected}"),
                format!("expected {expected} here"),
            ),
        }
    }
}

fn invalid_token(text: &str, span: Range<usize>) -> SyntaxError {
    let error = SyntaxError::new(
        span,
        format!("invalid token `{text}`"),
        "not a valid token",
    );
    if text.starts_with('"') || text.starts_with('\'') {
        error.with_note("strings must be closed on the same fragment and use only \\n, \\r, \\t, \\0, \\\\ and quote escapes")
    } else {
        error
    }
}
