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

//! Sub-parsers shared by the gate, command, and expression parsers.

use nom::branch::alt;
use nom::combinator::{cut, map, opt};
use nom::multi::{many1, separated_list0};
use nom::sequence::{delimited, preceded, terminated};

use crate::expression::Expression;
use crate::instruction::{
    ArithmeticOperand, AttributeValue, FrameIdentifier, GateModifier, MemoryReference, Qubit,
    ScalarType, Vector, WaveformInvocation,
};
use crate::parser::lexer::{DataType, Modifier};
use crate::parser::macros::{expected_token, token, unexpected_eof};
use crate::parser::{
    first_token, parse_expression, split_first_token, InternalParseError, ParserErrorKind,
    ParserInput, ParserResult, Token, TokenWithLocation,
};

impl From<DataType> for ScalarType {
    fn from(value: DataType) -> Self {
        match value {
            DataType::Bit => ScalarType::Bit,
            DataType::Integer => ScalarType::Integer,
            DataType::Octet => ScalarType::Octet,
            DataType::Real => ScalarType::Real,
        }
    }
}

impl From<Modifier> for GateModifier {
    fn from(value: Modifier) -> Self {
        match value {
            Modifier::Controlled => GateModifier::Controlled,
            Modifier::Dagger => GateModifier::Dagger,
            Modifier::Forked => GateModifier::Forked,
        }
    }
}

/// A qubit described by either a fixed index or a variable name.
pub(crate) fn parse_qubit<'a>(input: ParserInput<'a>) -> ParserResult<'a, Qubit> {
    match split_first_token(input) {
        None => unexpected_eof!(input),
        Some((Token::Integer(index), remainder)) => Ok((remainder, Qubit::Fixed(*index))),
        Some((Token::Identifier(name), remainder)) => {
            Ok((remainder, Qubit::Variable(name.clone())))
        }
        Some((other_token, _)) => expected_token!(input, other_token, "a qubit".to_owned()),
    }
}

/// A named memory region access with an optional index, such as `ro` (index
/// zero) or `ro[3]`.
pub(crate) fn parse_memory_reference<'a>(
    input: ParserInput<'a>,
) -> ParserResult<'a, MemoryReference> {
    let (input, name) = token!(Identifier(v))(input)?;
    let (input, index) = opt(delimited(
        token!(LBracket),
        token!(Integer(v)),
        token!(RBracket),
    ))(input)?;
    let index = index.unwrap_or(0);
    Ok((input, MemoryReference { name, index }))
}

pub(crate) fn parse_gate_modifier<'a>(input: ParserInput<'a>) -> ParserResult<'a, GateModifier> {
    match split_first_token(input) {
        None => unexpected_eof!(input),
        Some((Token::Modifier(modifier), remainder)) => {
            Ok((remainder, GateModifier::from(*modifier)))
        }
        Some((other_token, _)) => {
            expected_token!(input, other_token, "a gate modifier".to_owned())
        }
    }
}

/// A frame identifier: one or more qubits followed by a quoted frame name,
/// such as `0 1 "cz"`.
pub(crate) fn parse_frame_identifier<'a>(
    input: ParserInput<'a>,
) -> ParserResult<'a, FrameIdentifier> {
    let (input, qubits) = many1(parse_qubit)(input)?;
    let (input, name) = token!(String(v))(input)?;
    Ok((input, FrameIdentifier { name, qubits }))
}

/// An indented `KEY: value` line within a `DEFFRAME` block. The value is
/// either a quoted string or an expression.
pub(crate) fn parse_frame_attribute<'a>(
    input: ParserInput<'a>,
) -> ParserResult<'a, (String, AttributeValue)> {
    let (input, _) = token!(NewLine)(input)?;
    let (input, _) = token!(Indentation)(input)?;
    let (input, key) = token!(Identifier(v))(input)?;
    let (input, _) = token!(Colon)(input)?;
    let (input, value) = alt((
        map(token!(String(v)), AttributeValue::String),
        map(parse_expression, AttributeValue::Expression),
    ))(input)?;
    Ok((input, (key, value)))
}

/// A waveform invocation with optional named parameters, such as
/// `flat(duration: 1e-6, iq: 1)`.
pub(crate) fn parse_waveform_invocation<'a>(
    input: ParserInput<'a>,
) -> ParserResult<'a, WaveformInvocation> {
    let (input, name) = token!(Identifier(v))(input)?;
    let (input, parameters) = opt(preceded(
        token!(LParenthesis),
        cut(terminated(
            separated_list0(token!(Comma), parse_named_argument),
            token!(RParenthesis),
        )),
    ))(input)?;
    let parameters = parameters.unwrap_or_default().into_iter().collect();
    Ok((input, WaveformInvocation { name, parameters }))
}

fn parse_named_argument<'a>(input: ParserInput<'a>) -> ParserResult<'a, (String, Expression)> {
    let (input, name) = token!(Identifier(v))(input)?;
    let (input, _) = token!(Colon)(input)?;
    let (input, value) = parse_expression(input)?;
    Ok((input, (name, value)))
}

/// A literal or memory reference usable in classical arithmetic.
pub(crate) fn parse_arithmetic_operand<'a>(
    input: ParserInput<'a>,
) -> ParserResult<'a, ArithmeticOperand> {
    alt((
        map(parse_memory_reference, ArithmeticOperand::MemoryReference),
        parse_integer_operand,
        map(token!(Float(v)), ArithmeticOperand::LiteralReal),
        map(
            preceded(token!(Operator(Operator::Minus)), token!(Float(v))),
            |value| ArithmeticOperand::LiteralReal(-value),
        ),
    ))(input)
}

/// An integer literal, optionally negated. A literal outside the `i64` range
/// is a hard error rather than a silent wrap.
fn parse_integer_operand<'a>(input: ParserInput<'a>) -> ParserResult<'a, ArithmeticOperand> {
    let (rest, minus) = opt(token!(Operator(Operator::Minus)))(input)?;
    let (rest, value) = token!(Integer(v))(rest)?;
    let converted = if minus.is_some() {
        0i64.checked_sub_unsigned(value)
    } else {
        i64::try_from(value).ok()
    };
    match converted {
        Some(converted) => Ok((rest, ArithmeticOperand::LiteralInteger(converted))),
        None => Err(nom::Err::Failure(InternalParseError::from_kind(
            input,
            ParserErrorKind::UnsupportedPrecision,
        ))),
    }
}

/// The declared shape of a memory region: a scalar type with an optional
/// bracketed length, defaulting to one.
pub(crate) fn parse_vector<'a>(input: ParserInput<'a>) -> ParserResult<'a, Vector> {
    let (input, data_type) = match split_first_token(input) {
        None => return unexpected_eof!(input),
        Some((Token::DataType(data_type), remainder)) => (remainder, ScalarType::from(*data_type)),
        Some((other_token, _)) => {
            return expected_token!(input, other_token, "a data type".to_owned())
        }
    };
    let (input, length) = opt(delimited(
        token!(LBracket),
        token!(Integer(v)),
        token!(RBracket),
    ))(input)?;
    let length = length.unwrap_or(1);
    Ok((input, Vector { data_type, length }))
}

/// Consume newlines, semicolons, comments, and blank indented lines between
/// top-level instructions.
pub(crate) fn skip_newlines_and_comments<'a>(
    mut input: ParserInput<'a>,
) -> ParserResult<'a, ()> {
    loop {
        match first_token(input) {
            Some(Token::NewLine | Token::Semicolon | Token::Comment(_)) => input = &input[1..],
            // Indentation on an otherwise-empty line is not significant.
            Some(Token::Indentation) => match input.get(1).map(TokenWithLocation::as_token) {
                Some(Token::NewLine) | None => input = &input[1..],
                _ => return Ok((input, ())),
            },
            _ => return Ok((input, ())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::expression::Expression;
    use crate::instruction::{
        ArithmeticOperand, AttributeValue, FrameIdentifier, MemoryReference, Qubit, ScalarType,
        Vector, WaveformInvocation,
    };
    use crate::parser::macros::make_test;

    use super::{
        parse_arithmetic_operand, parse_frame_identifier, parse_memory_reference, parse_vector,
        parse_waveform_invocation,
    };

    make_test!(
        memory_reference_with_index,
        parse_memory_reference,
        "ro[3]",
        MemoryReference {
            name: "ro".to_owned(),
            index: 3
        }
    );

    make_test!(
        memory_reference_without_index,
        parse_memory_reference,
        "theta",
        MemoryReference {
            name: "theta".to_owned(),
            index: 0
        }
    );

    make_test!(
        frame_identifier,
        parse_frame_identifier,
        "0 1 \"cz\"",
        FrameIdentifier {
            name: "cz".to_owned(),
            qubits: vec![Qubit::Fixed(0), Qubit::Fixed(1)]
        }
    );

    make_test!(
        vector_with_length,
        parse_vector,
        "BIT[2]",
        Vector {
            data_type: ScalarType::Bit,
            length: 2
        }
    );

    make_test!(
        vector_without_length,
        parse_vector,
        "REAL",
        Vector {
            data_type: ScalarType::Real,
            length: 1
        }
    );

    make_test!(
        negative_operand,
        parse_arithmetic_operand,
        "-2",
        ArithmeticOperand::LiteralInteger(-2)
    );

    make_test!(
        most_negative_operand,
        parse_arithmetic_operand,
        "-9223372036854775808",
        ArithmeticOperand::LiteralInteger(i64::MIN)
    );

    #[test]
    fn operand_outside_i64_range_is_an_error() {
        for input in ["9223372036854775808", "-9223372036854775809"] {
            let tokens = crate::parser::lex(input).unwrap();
            let result = parse_arithmetic_operand(&tokens);
            assert!(result.is_err(), "{input} should not convert");
        }
    }

    make_test!(
        waveform_invocation,
        parse_waveform_invocation,
        "flat(duration: 1e-6, iq: 1)",
        WaveformInvocation {
            name: "flat".to_owned(),
            parameters: [
                ("duration".to_owned(), Expression::Number(1e-6)),
                ("iq".to_owned(), Expression::Number(1.0)),
            ]
            .into_iter()
            .collect()
        }
    );

    // `parse_frame_attribute` consumes the leading newline and indentation
    // itself, so it can't go through make_test!.
    #[test]
    fn frame_attribute() {
        let tokens = crate::parser::lex("\n    HARDWARE-OBJECT: \"q0_rf\"").unwrap();
        let (remainder, parsed) = super::parse_frame_attribute(&tokens).unwrap();
        assert_eq!(remainder.len(), 0);
        assert_eq!(
            parsed,
            (
                "HARDWARE-OBJECT".to_owned(),
                AttributeValue::String("q0_rf".to_owned())
            )
        );
    }
}
