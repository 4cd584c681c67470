//! Turns template tokens into a [`Program`].
//!
//! A program is a flat list of instructions run in order against one output
//! buffer and one shared script scope. It has a textual form, one record per
//! instruction:
//!
//! ```text
//! text 0..6 `Hello `
//! emit 8..20 `context.name`
//! exec 24..34 `let n = 2;`
//! ```
//!
//! Inside the backticks `\` and `` ` `` are escaped with a backslash, so any
//! payload survives a trip through [`Display`](fmt::Display) and
//! [`FromStr`].

use crate::template::Token;

use thiserror::Error;

use std::fmt;
use std::ops::Range;
use std::str::FromStr;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Append literal document text.
    Text(String),
    /// Evaluate in a child scope and append the value as text.
    Emit(String),
    /// Run in the shared scope for its effect.
    Exec(String),
}

impl Instruction {
    fn keyword(&self) -> &'static str {
        match self {
            Instruction::Text(_) => "text",
            Instruction::Emit(_) => "emit",
            Instruction::Exec(_) => "exec",
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Instruction::Text(s) | Instruction::Emit(s) | Instruction::Exec(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<(Instruction, Range<usize>)>,
}

impl Program {
    pub fn instructions(&self) -> &[(Instruction, Range<usize>)] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Compile tokens into a program, one instruction per token.
pub fn compile(tokens: Vec<(Token, Range<usize>)>) -> Program {
    let instructions: Vec<_> = tokens
        .into_iter()
        .map(|(token, span)| {
            let instruction = match token {
                Token::Text(content) => Instruction::Text(content),
                Token::Script {
                    expression,
                    writes_output: true,
                } => Instruction::Emit(expression),
                Token::Script {
                    expression,
                    writes_output: false,
                } => Instruction::Exec(expression),
            };
            (instruction, span)
        })
        .collect();

    tracing::debug!(instructions = instructions.len(), "compiled template");
    Program { instructions }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (instruction, span) in &self.instructions {
            write!(f, "{} {}..{} `", instruction.keyword(), span.start, span.end)?;
            for ch in instruction.payload().chars() {
                if ch == '\\' || ch == '`' {
                    f.write_str("\\")?;
                }
                write!(f, "{ch}")?;
            }
            f.write_str("`\n")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed program at byte {offset}: {message}")]
pub struct ProgramParseError {
    pub offset: usize,
    pub message: String,
}

impl FromStr for Program {
    type Err = ProgramParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut reader = Reader { text, pos: 0 };
        let mut instructions = vec![];

        loop {
            reader.skip_whitespace();
            if reader.at_end() {
                break;
            }

            let start = reader.pos;
            let keyword = reader.word();
            reader.expect(' ')?;
            let span = reader.span()?;
            reader.expect(' ')?;
            let payload = reader.quoted()?;

            let instruction = match keyword {
                "text" => Instruction::Text(payload),
                "emit" => Instruction::Emit(payload),
                "exec" => Instruction::Exec(payload),
                other => {
                    return Err(ProgramParseError {
                        offset: start,
                        message: format!("unknown instruction `{other}`"),
                    });
                }
            };
            instructions.push((instruction, span));
        }

        Ok(Program { instructions })
    }
}

struct Reader<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn error(&self, message: impl Into<String>) -> ProgramParseError {
        ProgramParseError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn word(&mut self) -> &'a str {
        self.take_while(|c| c.is_ascii_alphabetic())
    }

    fn expect(&mut self, expected: char) -> Result<(), ProgramParseError> {
        match self.rest().chars().next() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected `{expected}`, found `{c}`"))),
            None => Err(self.error(format!("expected `{expected}`, found end of input"))),
        }
    }

    fn number(&mut self) -> Result<usize, ProgramParseError> {
        let digits = self.take_while(|c| c.is_ascii_digit());
        digits
            .parse()
            .map_err(|_| self.error("expected a byte offset"))
    }

    fn span(&mut self) -> Result<Range<usize>, ProgramParseError> {
        let at = self.pos;
        let start = self.number()?;
        self.expect('.')?;
        self.expect('.')?;
        let end = self.number()?;
        if start > end {
            return Err(ProgramParseError {
                offset: at,
                message: format!("span {start}..{end} ends before it starts"),
            });
        }
        Ok(start..end)
    }

    fn quoted(&mut self) -> Result<String, ProgramParseError> {
        self.expect('`')?;
        let mut payload = String::new();
        let mut chars = self.rest().chars();

        loop {
            let Some(ch) = chars.next() else {
                self.pos = self.text.len();
                return Err(self.error("unterminated payload"));
            };
            self.pos += ch.len_utf8();
            match ch {
                '`' => return Ok(payload),
                '\\' => match chars.next() {
                    Some(escaped @ ('\\' | '`')) => {
                        self.pos += 1;
                        payload.push(escaped);
                    }
                    _ => return Err(self.error("invalid escape in payload")),
                },
                other => payload.push(other),
            }
        }
    }
}
