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

/// Fail with [`ParserErrorKind::ExpectedToken`] at the given input.
macro_rules! expected_token {
    ($input: expr, $actual:expr, $expected:expr) => {{
        Err(nom::Err::Error($crate::parser::InternalParseError::from_kind(
            $input,
            $crate::parser::ParserErrorKind::ExpectedToken {
                actual: $actual.clone(),
                expected: $expected,
            },
        )))
    }};
}

/// Fail with [`ParserErrorKind::UnexpectedEOF`] at the given input.
macro_rules! unexpected_eof {
    ($input: expr) => {{
        Err(nom::Err::Error($crate::parser::InternalParseError::from_kind(
            $input,
            $crate::parser::ParserErrorKind::UnexpectedEOF("something else"),
        )))
    }};
}

/// Match (and consume) a single token at the head of the input.
///
/// Three forms, mirroring the shapes of [`Token`]'s variants:
///
/// - `token!(NewLine)` matches a unit variant and returns `()`.
/// - `token!(Identifier(v))` matches a variant with contents, cloning and
///   returning them.
/// - `token!(Operator(Operator::Minus))` matches a specific nested variant
///   and returns `()`.
macro_rules! token {
    ($expected_variant: ident($enm:ident::$variant:ident)) => {{
        use $crate::parser::lexer::$enm;
        use $crate::parser::{InternalParseError, ParserErrorKind, Token};
        move |input: ParserInput<'a>| match $crate::parser::split_first_token(input) {
            None => Err(nom::Err::Error(InternalParseError::from_kind(
                input,
                ParserErrorKind::UnexpectedEOF(stringify!($expected_variant)),
            ))),
            Some((Token::$expected_variant($enm::$variant), remainder)) => Ok((remainder, ())),
            Some((other_token, _)) => {
                $crate::parser::macros::expected_token!(
                    input,
                    other_token,
                    stringify!($expected_variant).to_owned()
                )
            }
        }
    }};
    ($expected_variant: ident($contents: ident)) => {{
        use $crate::parser::{InternalParseError, ParserErrorKind, Token};
        move |input: ParserInput<'a>| match $crate::parser::split_first_token(input) {
            None => Err(nom::Err::Error(InternalParseError::from_kind(
                input,
                ParserErrorKind::UnexpectedEOF(stringify!($expected_variant)),
            ))),
            Some((Token::$expected_variant($contents), remainder)) => {
                Ok((remainder, $contents.clone()))
            }
            Some((other_token, _)) => {
                $crate::parser::macros::expected_token!(
                    input,
                    other_token,
                    stringify!($expected_variant).to_owned()
                )
            }
        }
    }};
    ($expected_variant: ident) => {{
        use $crate::parser::{InternalParseError, ParserErrorKind, Token};
        move |input: ParserInput<'a>| match $crate::parser::split_first_token(input) {
            None => Err(nom::Err::Error(InternalParseError::from_kind(
                input,
                ParserErrorKind::UnexpectedEOF(stringify!($expected_variant)),
            ))),
            Some((Token::$expected_variant, remainder)) => Ok((remainder, ())),
            Some((other_token, _)) => {
                $crate::parser::macros::expected_token!(
                    input,
                    other_token,
                    stringify!($expected_variant).to_owned()
                )
            }
        }
    }};
}

/// Lex the input, run the given parser to completion, and compare against the
/// expected value.
#[cfg(test)]
macro_rules! make_test {
    ($name: ident, $parser: ident, $input: expr, $expected: expr) => {
        #[test]
        fn $name() {
            let tokens = $crate::parser::lex($input).unwrap();
            let (remainder, parsed) = $parser(&tokens).unwrap();
            assert_eq!(remainder.len(), 0, "tokens left over");
            assert_eq!(parsed, $expected);
        }
    };
}

#[cfg(test)]
pub(crate) use make_test;
pub(crate) use {expected_token, token, unexpected_eof};
