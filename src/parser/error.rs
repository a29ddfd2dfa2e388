// Copyright 2021 Rigetti Computing
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::fmt::Formatter;

use crate::parser::lexer::{Command, LexInput};
use crate::parser::{ParserInput, Token};

/// An error encountered while tokenizing source text.
///
/// Carries the source position (1-indexed line and column) at which no token
/// rule matched, along with a snippet of the offending line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at line {line}, column {column} ({snippet}): {kind}")]
pub struct LexError {
    line: u32,
    column: usize,
    snippet: String,
    kind: LexErrorKind,
}

impl LexError {
    /// The 1-indexed line at which lexing failed.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The 1-indexed column at which lexing failed.
    pub fn column(&self) -> usize {
        self.column
    }

    /// What the lexer expected to find.
    pub fn kind(&self) -> &LexErrorKind {
        &self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    /// The input matched no token rule.
    #[error("expected {0}")]
    Expected(&'static str),

    /// An integer literal too large for a 64-bit integer.
    #[error("integer literal out of range")]
    IntegerTooLarge,

    /// An error occurred in an underlying nom parser.
    #[error("internal lexing error: {0:?}")]
    Internal(nom::error::ErrorKind),
}

/// Lexer-internal error carrying the remaining input, converted to a
/// [`LexError`] at the lexer boundary.
#[derive(Debug)]
pub(crate) struct InternalLexError<'a> {
    input: LexInput<'a>,
    kind: LexErrorKind,
}

impl<'a> InternalLexError<'a> {
    pub(crate) fn from_kind(input: LexInput<'a>, kind: LexErrorKind) -> Self {
        Self { input, kind }
    }
}

impl<'a> nom::error::ParseError<LexInput<'a>> for InternalLexError<'a> {
    fn from_error_kind(input: LexInput<'a>, kind: nom::error::ErrorKind) -> Self {
        Self::from_kind(input, LexErrorKind::Internal(kind))
    }

    fn append(_input: LexInput<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<InternalLexError<'_>> for LexError {
    fn from(err: InternalLexError<'_>) -> Self {
        let snippet = line_snippet(err.input);
        LexError {
            line: err.input.location_line(),
            column: err.input.get_utf8_column(),
            snippet,
            kind: err.kind,
        }
    }
}

/// Quote the beginning of the line the span points into, for diagnostics.
fn line_snippet(input: LexInput<'_>) -> String {
    match std::str::from_utf8(input.get_line_beginning()) {
        Ok(line) if line.len() < input.fragment().len() => format!("\"{line}\"..."),
        Ok(line) => format!("\"{line}\""),
        Err(_) => String::new(),
    }
}

/// An error encountered while parsing a token stream into instructions.
///
/// Like [`LexError`], this is fully owned and carries the position of the
/// token at which parsing failed. When the parser ran out of input, the
/// position is that of the last token successfully read.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("at line {line}, column {column} ({snippet}): {kind}")]
pub struct ParseError {
    line: u32,
    column: usize,
    snippet: String,
    kind: ParserErrorKind,
}

impl ParseError {
    /// The 1-indexed line of the token at which parsing failed.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The 1-indexed column of the token at which parsing failed.
    pub fn column(&self) -> usize {
        self.column
    }

    /// What went wrong, including the expected/found description.
    pub fn kind(&self) -> &ParserErrorKind {
        &self.kind
    }

    /// Convert an internal error, using `all_tokens` to locate the end of
    /// input when the error occurred at EOF.
    pub(crate) fn from_internal(err: InternalParseError<'_>, all_tokens: ParserInput<'_>) -> Self {
        let (line, column, snippet) = match err.input.first() {
            Some(token) => (
                token.line(),
                token.column(),
                format!("{:?}", token.as_token()),
            ),
            // Point just past the last valid token, using its printed form
            // for the width.
            None => match all_tokens.last() {
                Some(token) => {
                    let width = token.as_token().to_string().len();
                    (token.line(), token.column() + width, String::from("EOF"))
                }
                None => (1, 1, String::from("EOF")),
            },
        };
        ParseError {
            line,
            column,
            snippet,
            kind: err.kind,
        }
    }

    /// Convert the error out of a whole-parser run, whichever `nom` wrapper
    /// it arrives in.
    pub(crate) fn from_nom_err(
        err: nom::Err<InternalParseError<'_>>,
        all_tokens: ParserInput<'_>,
    ) -> Self {
        match err {
            nom::Err::Error(err) | nom::Err::Failure(err) => Self::from_internal(err, all_tokens),
            // Complete parsers never return Incomplete.
            nom::Err::Incomplete(_) => Self::from_internal(
                InternalParseError::from_kind(
                    &[],
                    ParserErrorKind::Internal(nom::error::ErrorKind::Complete),
                ),
                all_tokens,
            ),
        }
    }
}

/// Parsing errors specific to Quil parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParserErrorKind {
    /// The parser ran out of input while expecting more.
    #[error("expected {0}, found EOF")]
    UnexpectedEOF(&'static str),

    /// The next token did not match what the grammar called for.
    #[error("expected {expected}, found {actual:?}")]
    ExpectedToken { actual: Token, expected: String },

    /// Tried to parse a kind of command and couldn't.
    #[error("failed to parse arguments for {command}: {error}")]
    InvalidCommand { command: Command, error: String },

    /// Unexpected start of an instruction.
    #[error("expected a command or a gate")]
    NotACommandOrGate,

    /// Literals specified in the input cannot be supported without loss of precision.
    #[error("using this literal will result in loss of precision")]
    UnsupportedPrecision,

    /// An error occurred in an underlying nom parser.
    #[error("internal parsing error: {0:?}")]
    Internal(nom::error::ErrorKind),
}

/// Parser-internal error over the remaining token stream; converted to a
/// [`ParseError`] once the whole-program parse finishes.
#[derive(Debug)]
pub(crate) struct InternalParseError<'a> {
    input: ParserInput<'a>,
    kind: ParserErrorKind,
}

impl<'a> InternalParseError<'a> {
    pub(crate) fn from_kind(input: ParserInput<'a>, kind: ParserErrorKind) -> Self {
        Self { input, kind }
    }

    /// Label a generic nom error with the command whose arguments failed to
    /// parse. Errors that already carry a description pass through untouched.
    pub(crate) fn with_command_context(self, command: Command) -> Self {
        match self.kind {
            ParserErrorKind::Internal(kind) => Self {
                input: self.input,
                kind: ParserErrorKind::InvalidCommand {
                    command,
                    error: format!("{kind:?}"),
                },
            },
            _ => self,
        }
    }
}

impl fmt::Display for InternalParseError<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.input.first() {
            None => write!(f, "at EOF: {}", self.kind),
            Some(token) => write!(
                f,
                "at line {}, column {} ({:?}): {}",
                token.line(),
                token.column(),
                token.as_token(),
                self.kind
            ),
        }
    }
}

impl<'a> nom::error::ParseError<ParserInput<'a>> for InternalParseError<'a> {
    fn from_error_kind(input: ParserInput<'a>, kind: nom::error::ErrorKind) -> Self {
        Self::from_kind(input, ParserErrorKind::Internal(kind))
    }

    fn append(_input: ParserInput<'a>, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}
