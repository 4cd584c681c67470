use crate::ast::{AssignOp, BinOp, Expr, Spanned, UnOp};
use crate::error::SyntaxError;
use crate::lexer::Token;
use crate::parser::{ParseResult, Parser};

use ariadne::{Color, Fmt};

use std::ops::Range;

fn binary_operator(token: &Token) -> Option<BinOp> {
    Some(match token {
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Mul => BinOp::Mul,
        Token::Div => BinOp::Div,
        Token::Mod => BinOp::Mod,
        Token::Power => BinOp::Power,
        Token::Eq => BinOp::Eq,
        Token::NotEq => BinOp::NotEq,
        Token::Less => BinOp::Less,
        Token::Greater => BinOp::Greater,
        Token::LessEq => BinOp::LessEq,
        Token::GreaterEq => BinOp::GreaterEq,
        Token::And => BinOp::And,
        Token::Or => BinOp::Or,
        _ => return None,
    })
}

fn assign_operator(token: &Token) -> Option<AssignOp> {
    Some(match token {
        Token::Assign => AssignOp::Assign,
        Token::AddAssign => AssignOp::AddAssign,
        Token::SubAssign => AssignOp::SubAssign,
        Token::MulAssign => AssignOp::MulAssign,
        Token::DivAssign => AssignOp::DivAssign,
        Token::ModAssign => AssignOp::ModAssign,
        _ => return None,
    })
}

impl Parser {
    pub fn parse_expression(&mut self) -> ParseResult<Spanned<Expr>> {
        self.nested(Self::parse_assignment)
    }

    fn parse_assignment(&mut self) -> ParseResult<Spanned<Expr>> {
        let l_expr = self.parse_binary(0)?;

        let Some(assign_op) = self
            .tokens
            .peek()
            .and_then(|(token, _)| assign_operator(token))
        else {
            return Ok(l_expr);
        };
        let (_, span_op) = self.next_token("an assignment operator")?;

        if !matches!(
            l_expr.0,
            Expr::Variable(_) | Expr::Field { .. } | Expr::Index { .. }
        ) {
            return Err(SyntaxError::new(
                l_expr.1.start..span_op.end,
                "invalid assignment target",
                "only variables, fields and indexed elements can be assigned",
            ));
        }

        // right associative: a = b = c
        let r_expr = self.parse_expression()?;
        let span = l_expr.1.start..r_expr.1.end;
        Ok((
            Expr::Assign {
                l_value: Box::new(l_expr),
                r_value: Box::new(r_expr),
                assign_op,
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Spanned<Expr>> {
        let mut l_expr = self.parse_unary()?;
        let depth = self.depth;

        loop {
            let Some(operator) = self
                .tokens
                .peek()
                .and_then(|(token, _)| binary_operator(token))
            else {
                break;
            };

            let (precedence, right_assoc) = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            // each operator pushes the tree built so far one level down
            self.descend()?;
            self.tokens.next();

            let next_min = if right_assoc { precedence } else { precedence + 1 };
            let r_expr = self.parse_binary(next_min)?;
            let span = l_expr.1.start..r_expr.1.end;
            l_expr = (
                Expr::BinOp {
                    operator,
                    l_value: Box::new(l_expr),
                    r_value: Box::new(r_expr),
                },
                span,
            );
        }

        self.depth = depth;
        Ok(l_expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Spanned<Expr>> {
        let unop = match self.tokens.peek() {
            Some((Token::Minus, _)) => UnOp::Minus,
            Some((Token::Plus, _)) => UnOp::Plus,
            Some((Token::Not, _)) => UnOp::Not,
            _ => return self.parse_postfix(),
        };
        let (_, span_op) = self.next_token("a unary operator")?;

        let expression = self.nested(Self::parse_unary)?;
        let span = span_op.start..expression.1.end;
        Ok((
            Expr::UnOp {
                unop,
                expression: Box::new(expression),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<Spanned<Expr>> {
        let mut l_expr = self.parse_primary()?;
        let depth = self.depth;

        loop {
            let postfix = match self.tokens.peek() {
                Some((token @ (Token::LBracket | Token::LParen | Token::Dot), _)) => token.clone(),
                _ => break,
            };
            // a postfix operation wraps the tree built so far
            self.descend()?;
            self.tokens.next();

            match postfix {
                Token::LBracket => {
                    let index = self.parse_expression()?;
                    let span_close = self
                        .expect(Token::RBracket, "`]` after the index")
                        .map_err(|error| {
                            error.with_note(format!(
                                "the syntax for indexing is 'your_expression{}your_index{}'",
                                Fmt::fg("[", Color::Yellow),
                                Fmt::fg("]", Color::Yellow),
                            ))
                        })?;
                    let span = l_expr.1.start..span_close.end;
                    l_expr = (
                        Expr::Index {
                            array: Box::new(l_expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                } // index

                Token::LParen => {
                    let (args, span_close) = self.parse_call_args()?;
                    let span = l_expr.1.start..span_close.end;
                    l_expr = (
                        Expr::Call {
                            function: Box::new(l_expr),
                            args,
                        },
                        span,
                    );
                } // call

                _ => {
                    let (field_name, span_field) = match self.next_token("a field name after `.`")? {
                        (Token::Variable(name), span) => (name, span),
                        other => return Err(self.unexpected(Some(other), "a field name after `.`")),
                    };
                    let span = l_expr.1.start..span_field.end;
                    l_expr = (
                        Expr::Field {
                            object: Box::new(l_expr),
                            field_name,
                        },
                        span,
                    );
                } // field
            }
        }

        self.depth = depth;
        Ok(l_expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Spanned<Expr>> {
        let (token, span) = self.next_token("an expression")?;

        let expr = match token {
            // literals
            Token::Null => Expr::Null,
            Token::Bool(b) => Expr::Bool(b),
            Token::Int(i) => Expr::Int(i),
            Token::Float(f) => Expr::Float(f),
            Token::String(s) => Expr::String(s),
            Token::Variable(name) => Expr::Variable(name),

            Token::LParen => {
                let expr = self.parse_expression()?;
                let span_close = self.expect(Token::RParen, "`)` to close the parenthesis")?;
                return Ok((expr.0, span.start..span_close.end));
            }

            Token::LBracket => return self.parse_array(span),
            Token::LBrace => return self.parse_object(span),

            // keywords
            Token::KeywordIf => return self.parse_if(span),
            Token::KeywordDo => return self.parse_block(span),
            Token::KeywordWhile => return self.parse_while(span),
            Token::KeywordFor => return self.parse_for(span),
            Token::KeywordFn => return self.parse_lambda(span),

            Token::KeywordLet => {
                return Err(SyntaxError::new(
                    span,
                    "`let` is a statement, not an expression",
                    "a binding cannot appear here",
                )
                .with_note("wrap it in a block: 'do let name = value; ... end'"));
            }

            other => return Err(self.unexpected(Some((other, span)), "an expression")),
        };

        Ok((expr, span))
    }

    fn parse_array(&mut self, start: Range<usize>) -> ParseResult<Spanned<Expr>> {
        let mut elements = vec![];

        loop {
            if let Some(span_close) = self.eat(&Token::RBracket) {
                return Ok((Expr::Array { elements }, start.start..span_close.end));
            }

            elements.push(self.parse_expression()?);

            match self.next_token("`,` or `]` after array element")? {
                (Token::Comma, _) => {}
                (Token::RBracket, span_close) => {
                    return Ok((Expr::Array { elements }, start.start..span_close.end));
                }
                other => {
                    return Err(self.unexpected(Some(other), "`,` or `]` after array element"));
                }
            }
        }
    }

    fn parse_object(&mut self, start: Range<usize>) -> ParseResult<Spanned<Expr>> {
        let mut entries = vec![];

        loop {
            if let Some(span_close) = self.eat(&Token::RBrace) {
                return Ok((Expr::Object { entries }, start.start..span_close.end));
            }

            let key = match self.next_token("a field name")? {
                (Token::Variable(name), _) | (Token::String(name), _) => name,
                other => return Err(self.unexpected(Some(other), "a field name")),
            };
            self.expect(Token::Colon, "`:` after the field name")?;
            entries.push((key, self.parse_expression()?));

            match self.next_token("`,` or `}` after object field")? {
                (Token::Comma, _) => {}
                (Token::RBrace, span_close) => {
                    return Ok((Expr::Object { entries }, start.start..span_close.end));
                }
                other => {
                    return Err(self.unexpected(Some(other), "`,` or `}` after object field"));
                }
            }
        }
    }
}
