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

use nom::IResult;

pub(crate) use error::{InternalLexError, InternalParseError};
pub use error::{LexError, LexErrorKind, ParseError, ParserErrorKind};
pub(crate) use expression::parse_expression;
pub(crate) use instruction::parse_instructions;
pub use lexer::Command;
pub(crate) use lexer::lex;
pub use token::Token;
pub(crate) use token::TokenWithLocation;

mod command;
mod common;
mod error;
mod expression;
mod gate;
pub(crate) mod instruction;
pub(crate) mod lexer;
mod macros;
mod token;

pub(crate) type ParserInput<'a> = &'a [TokenWithLocation];
pub(crate) type ParserResult<'a, R> = IResult<ParserInput<'a>, R, InternalParseError<'a>>;

/// Split the first token off of the input, if any, discarding its location.
pub(crate) fn split_first_token(input: ParserInput) -> Option<(&Token, ParserInput)> {
    input
        .split_first()
        .map(|(first, rest)| (first.as_token(), rest))
}

/// Peek at the first token of the input without consuming it.
pub(crate) fn first_token(input: ParserInput) -> Option<&Token> {
    input.first().map(TokenWithLocation::as_token)
}
