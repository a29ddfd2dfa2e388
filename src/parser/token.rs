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

use crate::parser::lexer::{Command, DataType, LexInput, Modifier, Operator};

/// A single lexed token along with the source position it was read from.
///
/// Positions are captured eagerly so that the token stream does not borrow
/// from the source text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TokenWithLocation {
    token: Token,
    line: u32,
    column: usize,
}

impl TokenWithLocation {
    /// Returns a reference to the contained token.
    pub(crate) fn as_token(&self) -> &Token {
        &self.token
    }

    /// The line that this token appears on, 1-indexed.
    pub(crate) fn line(&self) -> u32 {
        self.line
    }

    /// The column of the line this token appears on, 1-indexed.
    pub(crate) fn column(&self) -> usize {
        self.column
    }
}

impl PartialEq<Token> for TokenWithLocation {
    fn eq(&self, other: &Token) -> bool {
        &self.token == other
    }
}

impl nom::InputLength for TokenWithLocation {
    fn input_len(&self) -> usize {
        // All tokens take up exactly one place in the input token stream
        1
    }
}

/// Wrap a parser that returns a [`Token`], recording the position of the
/// input it matched at.
pub(crate) fn token_with_location<'i, E, P>(
    mut parser: P,
) -> impl FnMut(LexInput<'i>) -> nom::IResult<LexInput<'i>, TokenWithLocation, E>
where
    P: nom::Parser<LexInput<'i>, Token, E>,
    E: nom::error::ParseError<LexInput<'i>>,
{
    move |input| {
        let line = input.location_line();
        let column = input.get_utf8_column();
        parser.parse(input).map(|(leftover, token)| {
            (
                leftover,
                TokenWithLocation {
                    token,
                    line,
                    column,
                },
            )
        })
    }
}

#[derive(Clone, PartialEq)]
pub enum Token {
    Colon,
    Comma,
    Command(Command),
    Comment(String),
    DataType(DataType),
    Float(f64),
    Identifier(String),
    Indentation,
    Integer(u64),
    LBracket,
    LParenthesis,
    Modifier(Modifier),
    NewLine,
    NonBlocking,
    Operator(Operator),
    RBracket,
    RParenthesis,
    Semicolon,
    Sharing,
    String(String),
    Target(String),
    Variable(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Command(cmd) => write!(f, "{cmd}"),
            Token::Comment(comment) => write!(f, "#{comment}"),
            Token::DataType(typ) => write!(f, "{typ}"),
            Token::Float(float) => write!(f, "{float}"),
            Token::Identifier(ident) => write!(f, "{ident}"),
            Token::Indentation => write!(f, "    "),
            Token::Integer(i) => write!(f, "{i}"),
            Token::LBracket => write!(f, "["),
            Token::LParenthesis => write!(f, "("),
            Token::Modifier(m) => write!(f, "{m}"),
            Token::NewLine => write!(f, "NEWLINE"),
            Token::NonBlocking => write!(f, "NONBLOCKING"),
            Token::Operator(op) => write!(f, "{op}"),
            Token::RBracket => write!(f, "]"),
            Token::RParenthesis => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Sharing => write!(f, "SHARING"),
            Token::String(s) => write!(f, "{s:?}"),
            Token::Target(label) => write!(f, "@{label}"),
            Token::Variable(v) => write!(f, "%{v}"),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Colon => write!(f, "COLON"),
            Token::Comma => write!(f, "COMMA"),
            Token::Command(cmd) => write!(f, "COMMAND({cmd})"),
            Token::Comment(comment) => write!(f, "COMMENT({comment:?})"),
            Token::DataType(typ) => write!(f, "DATATYPE({typ})"),
            Token::Float(float) => write!(f, "FLOAT({float})"),
            Token::Identifier(id) => write!(f, "IDENTIFIER({id})"),
            Token::Indentation => write!(f, "INDENT"),
            Token::Integer(i) => write!(f, "INTEGER({i})"),
            Token::LBracket => write!(f, "LBRACKET"),
            Token::LParenthesis => write!(f, "LPAREN"),
            Token::Modifier(m) => write!(f, "MODIFIER({m})"),
            Token::NewLine => write!(f, "NEWLINE"),
            Token::NonBlocking => write!(f, "NONBLOCKING"),
            Token::Operator(op) => write!(f, "OPERATOR({op})"),
            Token::RBracket => write!(f, "RBRACKET"),
            Token::RParenthesis => write!(f, "RPAREN"),
            Token::Semicolon => write!(f, "SEMICOLON"),
            Token::Sharing => write!(f, "SHARING"),
            Token::String(s) => write!(f, "STRING({s:?})"),
            Token::Target(label) => write!(f, "@{label}"),
            Token::Variable(v) => write!(f, "VARIABLE({v})"),
        }
    }
}

impl nom::InputLength for Token {
    fn input_len(&self) -> usize {
        1
    }
}
