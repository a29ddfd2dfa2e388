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

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{is_a, tag, take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map, recognize, value},
    multi::many0,
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated, tuple},
    Finish, IResult,
};
use nom_locate::LocatedSpan;

use crate::parser::error::{InternalLexError, LexError, LexErrorKind};
use crate::parser::token::{token_with_location, Token, TokenWithLocation};

/// Reserved Quil command keywords. An identifier matching one of these (by its
/// SCREAMING-KEBAB-CASE spelling) lexes as a [`Token::Command`] instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE")]
pub enum Command {
    Add,
    Capture,
    Declare,
    #[strum(to_string = "DEFCAL")]
    DefCal,
    #[strum(to_string = "DEFFRAME")]
    DefFrame,
    #[strum(to_string = "DEFWAVEFORM")]
    DefWaveform,
    Delay,
    Div,
    Exchange,
    Fence,
    Halt,
    Jump,
    JumpUnless,
    JumpWhen,
    Label,
    Measure,
    Move,
    Mul,
    Nop,
    Pragma,
    Pulse,
    RawCapture,
    Reset,
    SetFrequency,
    SetPhase,
    SetScale,
    ShiftFrequency,
    ShiftPhase,
    Sub,
    SwapPhases,
    Wait,
}

/// Scalar types usable in a `DECLARE` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DataType {
    Bit,
    Octet,
    Real,
    Integer,
}

/// Gate modifier keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Modifier {
    Controlled,
    Dagger,
    Forked,
}

/// Arithmetic operators usable within parameter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Operator {
    #[strum(serialize = "^")]
    Caret,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = "/")]
    Slash,
    #[strum(serialize = "*")]
    Star,
}

pub(crate) type LexInput<'a> = LocatedSpan<&'a str>;
type InternalLexResult<'a, T = Token> = IResult<LexInput<'a>, T, InternalLexError<'a>>;

/// Completely lex a string, returning the tokens within.
///
/// Every byte of the input is either consumed into a token or skipped as
/// whitespace or a comment; any other byte sequence is a [`LexError`]. The
/// token vector owns its positions, so it does not borrow from `input`.
pub(crate) fn lex(input: &str) -> Result<Vec<TokenWithLocation>, LexError> {
    let input = LexInput::new(input);
    all_consuming(_lex)(input)
        .finish()
        .map(|(_, tokens)| tokens)
        .map_err(LexError::from)
}

fn _lex(input: LexInput) -> InternalLexResult<Vec<TokenWithLocation>> {
    terminated(
        many0(alt((
            token_with_location(value(Token::Indentation, tag("    "))),
            preceded(many0(tag(" ")), lex_token),
        ))),
        many0(one_of("\n\t ")),
    )(input)
}

fn lex_token(input: LexInput) -> InternalLexResult<TokenWithLocation> {
    expecting(
        "a token",
        alt((
            token_with_location(lex_comment),
            token_with_location(lex_punctuation),
            token_with_location(lex_target),
            token_with_location(lex_string),
            // Operator must come before number (or it may be parsed as a prefix)
            token_with_location(lex_operator),
            token_with_location(lex_number),
            token_with_location(lex_variable),
            // This should come last because it's sort of a catch all
            token_with_location(lex_keyword_or_identifier),
        )),
    )(input)
}

/// Attach a description of what was expected to a failed sub-lexer.
fn expecting<'a, O, P>(
    context: &'static str,
    mut parser: P,
) -> impl FnMut(LexInput<'a>) -> InternalLexResult<'a, O>
where
    P: FnMut(LexInput<'a>) -> InternalLexResult<'a, O>,
{
    move |input| {
        parser(input).map_err(|err| match err {
            nom::Err::Error(_) => nom::Err::Error(InternalLexError::from_kind(
                input,
                LexErrorKind::Expected(context),
            )),
            other => other,
        })
    }
}

fn lex_comment(input: LexInput) -> InternalLexResult {
    let (input, _) = tag("#")(input)?;
    let (input, content) = take_while(|chr| chr != '\n')(input)?;
    Ok((input, Token::Comment(content.to_string())))
}

fn is_valid_identifier_leading_character(chr: char) -> bool {
    chr.is_ascii_alphabetic() || chr == '_'
}

fn is_valid_identifier_end_character(chr: char) -> bool {
    is_valid_identifier_leading_character(chr) || chr.is_ascii_digit()
}

fn lex_identifier_raw(input: LexInput) -> InternalLexResult<String> {
    map(
        recognize(tuple((
            take_while1(is_valid_identifier_leading_character),
            take_while(is_valid_identifier_end_character),
            recognize(many0(pair(
                take_while1(|chr| chr == '-'),
                take_while1(is_valid_identifier_end_character),
            ))),
        ))),
        |span: LexInput| span.fragment().to_string(),
    )(input)
}

/// Map a raw identifier onto the keyword it spells, if any.
///
/// Keyword recognition happens here, after a maximal identifier has been
/// consumed, so that identifiers which merely start with a keyword (such as
/// `NOT-A-COMMAND` or `Halting`) are not broken apart.
fn recognize_keyword_or_identifier(identifier: String) -> Token {
    if identifier == "NONBLOCKING" {
        Token::NonBlocking
    } else if identifier == "SHARING" {
        Token::Sharing
    } else if let Ok(command) = Command::from_str(&identifier) {
        Token::Command(command)
    } else if let Ok(data_type) = DataType::from_str(&identifier) {
        Token::DataType(data_type)
    } else if let Ok(modifier) = Modifier::from_str(&identifier) {
        Token::Modifier(modifier)
    } else {
        Token::Identifier(identifier)
    }
}

fn lex_keyword_or_identifier(input: LexInput) -> InternalLexResult {
    let (input, identifier) = lex_identifier_raw(input)?;
    Ok((input, recognize_keyword_or_identifier(identifier)))
}

fn lex_target(input: LexInput) -> InternalLexResult {
    let (input, _) = tag("@")(input)?;
    let (input, label) = lex_identifier_raw(input)?;
    Ok((input, Token::Target(label)))
}

fn lex_number(input: LexInput) -> InternalLexResult {
    let (leftover, float_string): (LexInput, LexInput) = recognize(double)(input)?;
    // A match running straight into an identifier character is an identifier
    // that merely starts like a number, such as `NAND` or `inf_time`.
    if leftover
        .fragment()
        .starts_with(is_valid_identifier_end_character)
    {
        return Err(nom::Err::Error(InternalLexError::from_kind(
            input,
            LexErrorKind::Expected("a number"),
        )));
    }
    let integer_parse_result: IResult<LexInput, _> = all_consuming(digit1)(float_string);
    let token = match integer_parse_result {
        Ok(_) => match float_string.parse::<u64>() {
            Ok(value) => Token::Integer(value),
            // A failure so that no other token rule hides the bad literal.
            Err(_) => {
                return Err(nom::Err::Failure(InternalLexError::from_kind(
                    input,
                    LexErrorKind::IntegerTooLarge,
                )))
            }
        },
        Err(_) => Token::Float(double(float_string)?.1),
    };
    Ok((leftover, token))
}

fn lex_operator(input: LexInput) -> InternalLexResult {
    use Operator::*;
    map(
        alt((
            value(Caret, tag("^")),
            value(Minus, tag("-")),
            value(Plus, tag("+")),
            value(Slash, tag("/")),
            value(Star, tag("*")),
        )),
        Token::Operator,
    )(input)
}

fn recognize_newlines(input: LexInput) -> InternalLexResult<LexInput> {
    alt((is_a("\n"), is_a("\r\n")))(input)
}

fn lex_punctuation(input: LexInput) -> InternalLexResult {
    use Token::*;
    alt((
        value(Colon, tag(":")),
        value(Comma, tag(",")),
        value(Indentation, alt((tag("    "), tag("\t")))),
        value(LBracket, tag("[")),
        value(LParenthesis, tag("(")),
        value(NewLine, recognize_newlines),
        value(RBracket, tag("]")),
        value(RParenthesis, tag(")")),
        value(Semicolon, tag(";")),
    ))(input)
}

fn lex_string(input: LexInput) -> InternalLexResult {
    map(
        delimited(char('"'), take_while(|chr| chr != '"'), char('"')),
        |span: LexInput| Token::String(span.fragment().to_string()),
    )(input)
}

fn lex_variable(input: LexInput) -> InternalLexResult {
    map(preceded(tag("%"), lex_identifier_raw), Token::Variable)(input)
}
