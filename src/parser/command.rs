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

//! Parsers for the arguments of each Quil command keyword. Each parser picks
//! up immediately after its keyword token.

use nom::combinator::{cut, opt};
use nom::multi::{many0, many1, separated_list0, separated_list1};
use nom::sequence::{preceded, terminated};

use crate::instruction::{
    Arithmetic, ArithmeticOperator, Calibration, Capture, Declaration, Delay, Exchange, Fence,
    FrameDefinition, Instruction, Jump, JumpUnless, JumpWhen, Label, MeasureCalibrationDefinition,
    Measurement, Move, Pragma, PragmaArgument, Pulse, Qubit, RawCapture, Reset, SetFrequency,
    SetPhase, SetScale, ShiftFrequency, ShiftPhase, SwapPhases, Waveform, WaveformDefinition,
};
use crate::parser::common::{
    parse_arithmetic_operand, parse_frame_attribute, parse_frame_identifier, parse_gate_modifier,
    parse_memory_reference, parse_qubit, parse_vector, parse_waveform_invocation,
};
use crate::parser::instruction::parse_block;
use crate::parser::lexer::Command;
use crate::parser::macros::{expected_token, token, unexpected_eof};
use crate::parser::{
    first_token, parse_expression, split_first_token, InternalParseError, ParserErrorKind,
    ParserInput, ParserResult, Token,
};

/// `ADD`, `SUB`, `MUL`, and `DIV`, all of which take a destination and a
/// source operand.
pub(crate) fn parse_arithmetic<'a>(
    operator: ArithmeticOperator,
    input: ParserInput<'a>,
) -> ParserResult<'a, Instruction> {
    let (input, destination) = parse_arithmetic_operand(input)?;
    let (input, source) = parse_arithmetic_operand(input)?;
    Ok((
        input,
        Instruction::Arithmetic(Arithmetic {
            operator,
            destination,
            source,
        }),
    ))
}

pub(crate) fn parse_capture<'a>(
    input: ParserInput<'a>,
    blocking: bool,
) -> ParserResult<'a, Instruction> {
    let (input, frame) = parse_frame_identifier(input)?;
    let (input, waveform) = parse_waveform_invocation(input)?;
    let (input, memory_reference) = parse_memory_reference(input)?;
    Ok((
        input,
        Instruction::Capture(Capture {
            blocking,
            frame,
            waveform,
            memory_reference,
        }),
    ))
}

/// `DECLARE name TYPE[length]` with an optional `SHARING other` clause.
pub(crate) fn parse_declare<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, name) = token!(Identifier(v))(input)?;
    let (input, size) = parse_vector(input)?;
    let (input, sharing) = opt(preceded(token!(Sharing), token!(Identifier(v))))(input)?;
    Ok((
        input,
        Instruction::Declaration(Declaration {
            name,
            size,
            sharing,
        }),
    ))
}

/// `DEFCAL`, covering both gate calibrations and (after a `MEASURE` keyword)
/// measurement calibrations.
pub(crate) fn parse_defcal<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    match first_token(input) {
        Some(Token::Command(Command::Measure)) => parse_defcal_measure(&input[1..]),
        _ => parse_defcal_gate(input),
    }
}

fn parse_defcal_gate<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, modifiers) = many0(parse_gate_modifier)(input)?;
    let (input, name) = token!(Identifier(v))(input)?;
    let (input, parameters) = opt(preceded(
        token!(LParenthesis),
        cut(terminated(
            separated_list0(token!(Comma), parse_expression),
            token!(RParenthesis),
        )),
    ))(input)?;
    let parameters = parameters.unwrap_or_default();
    let (input, qubits) = many0(parse_qubit)(input)?;
    let (input, _) = token!(Colon)(input)?;
    let (input, instructions) = parse_block(input)?;
    Ok((
        input,
        Instruction::CalibrationDefinition(Calibration {
            name,
            parameters,
            qubits,
            modifiers,
            instructions,
        }),
    ))
}

/// `DEFCAL MEASURE [qubit] destination:`. The qubit is optional, so a lone
/// identifier before the colon is the destination parameter, not a qubit.
fn parse_defcal_measure<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (after_qubit, qubit) = opt(parse_qubit)(input)?;
    let (input, qubit, parameter) = match (qubit, first_token(after_qubit)) {
        (Some(Qubit::Variable(name)), Some(Token::Colon)) => (after_qubit, None, name),
        (qubit, _) => {
            let (input, parameter) = token!(Identifier(v))(after_qubit)?;
            (input, qubit, parameter)
        }
    };
    let (input, _) = token!(Colon)(input)?;
    let (input, instructions) = parse_block(input)?;
    Ok((
        input,
        Instruction::MeasureCalibrationDefinition(MeasureCalibrationDefinition {
            qubit,
            parameter,
            instructions,
        }),
    ))
}

/// `DEFFRAME 0 "name":` followed by one or more indented attribute lines.
pub(crate) fn parse_defframe<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, identifier) = parse_frame_identifier(input)?;
    let (input, _) = token!(Colon)(input)?;
    let (input, attribute_pairs) = many1(parse_frame_attribute)(input)?;
    let attributes = attribute_pairs.into_iter().collect();
    Ok((
        input,
        Instruction::FrameDefinition(FrameDefinition {
            identifier,
            attributes,
        }),
    ))
}

/// `DEFWAVEFORM name[(%params)] sample-rate:` followed by an indented,
/// comma-separated sample list.
pub(crate) fn parse_defwaveform<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, name) = token!(Identifier(v))(input)?;
    let (input, parameters) = opt(preceded(
        token!(LParenthesis),
        cut(terminated(
            separated_list0(token!(Comma), token!(Variable(v))),
            token!(RParenthesis),
        )),
    ))(input)?;
    let parameters = parameters.unwrap_or_default();
    let (input, sample_rate) = parse_literal_real(input)?;
    let (input, _) = token!(Colon)(input)?;
    let (input, _) = token!(NewLine)(input)?;
    let (input, _) = token!(Indentation)(input)?;
    let (input, samples) = separated_list1(token!(Comma), parse_expression)(input)?;
    Ok((
        input,
        Instruction::WaveformDefinition(WaveformDefinition {
            name,
            definition: Waveform {
                samples,
                parameters,
                sample_rate,
            },
        }),
    ))
}

/// A real-number literal, allowing integers only as far as they convert to
/// `f64` without loss.
fn parse_literal_real<'a>(input: ParserInput<'a>) -> ParserResult<'a, f64> {
    match split_first_token(input) {
        None => unexpected_eof!(input),
        Some((Token::Float(value), remainder)) => Ok((remainder, *value)),
        Some((Token::Integer(value), remainder)) => {
            let converted = *value as f64;
            if converted as u64 == *value {
                Ok((remainder, converted))
            } else {
                Err(nom::Err::Failure(InternalParseError::from_kind(
                    input,
                    ParserErrorKind::UnsupportedPrecision,
                )))
            }
        }
        Some((other_token, _)) => {
            expected_token!(input, other_token, "a real number".to_owned())
        }
    }
}

/// `DELAY q... ["frame"...] duration`.
pub(crate) fn parse_delay<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, qubits) = many0(parse_qubit)(input)?;
    let (input, frame_names) = many0(token!(String(v)))(input)?;
    let (input, duration) = parse_expression(input)?;
    Ok((
        input,
        Instruction::Delay(Delay {
            duration,
            frame_names,
            qubits,
        }),
    ))
}

pub(crate) fn parse_exchange<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, left) = parse_arithmetic_operand(input)?;
    let (input, right) = parse_arithmetic_operand(input)?;
    Ok((input, Instruction::Exchange(Exchange { left, right })))
}

/// `FENCE` with an optional qubit list; no qubits means all of them.
pub(crate) fn parse_fence<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, qubits) = many0(parse_qubit)(input)?;
    Ok((input, Instruction::Fence(Fence { qubits })))
}

pub(crate) fn parse_jump<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, target) = token!(Target(v))(input)?;
    Ok((input, Instruction::Jump(Jump { target })))
}

pub(crate) fn parse_jump_when<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, target) = token!(Target(v))(input)?;
    let (input, condition) = parse_memory_reference(input)?;
    Ok((input, Instruction::JumpWhen(JumpWhen { target, condition })))
}

pub(crate) fn parse_jump_unless<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, target) = token!(Target(v))(input)?;
    let (input, condition) = parse_memory_reference(input)?;
    Ok((
        input,
        Instruction::JumpUnless(JumpUnless { target, condition }),
    ))
}

pub(crate) fn parse_label<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, name) = token!(Target(v))(input)?;
    Ok((input, Instruction::Label(Label(name))))
}

/// `MEASURE q` with an optional readout target.
pub(crate) fn parse_measurement<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, qubit) = parse_qubit(input)?;
    let (input, target) = opt(parse_memory_reference)(input)?;
    Ok((input, Instruction::Measurement(Measurement { qubit, target })))
}

pub(crate) fn parse_move<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, destination) = parse_arithmetic_operand(input)?;
    let (input, source) = parse_arithmetic_operand(input)?;
    Ok((
        input,
        Instruction::Move(Move {
            destination,
            source,
        }),
    ))
}

/// `PRAGMA name [arg...] ["data"]`. The name may collide with a command or
/// data-type keyword.
pub(crate) fn parse_pragma<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, name) = match split_first_token(input) {
        None => return unexpected_eof!(input),
        Some((Token::Identifier(name), remainder)) => (remainder, name.clone()),
        Some((Token::Command(command), remainder)) => (remainder, command.to_string()),
        Some((Token::DataType(data_type), remainder)) => (remainder, data_type.to_string()),
        Some((other_token, _)) => {
            return expected_token!(input, other_token, "a pragma name".to_owned())
        }
    };
    let (input, arguments) = many0(parse_pragma_argument)(input)?;
    let (input, data) = opt(token!(String(v)))(input)?;
    Ok((
        input,
        Instruction::Pragma(Pragma {
            name,
            arguments,
            data,
        }),
    ))
}

fn parse_pragma_argument<'a>(input: ParserInput<'a>) -> ParserResult<'a, PragmaArgument> {
    match split_first_token(input) {
        None => unexpected_eof!(input),
        Some((Token::Identifier(name), remainder)) => {
            Ok((remainder, PragmaArgument::Identifier(name.clone())))
        }
        Some((Token::Integer(value), remainder)) => {
            Ok((remainder, PragmaArgument::Integer(*value)))
        }
        Some((other_token, _)) => {
            expected_token!(input, other_token, "a pragma argument".to_owned())
        }
    }
}

pub(crate) fn parse_pulse<'a>(
    input: ParserInput<'a>,
    blocking: bool,
) -> ParserResult<'a, Instruction> {
    let (input, frame) = parse_frame_identifier(input)?;
    let (input, waveform) = parse_waveform_invocation(input)?;
    Ok((
        input,
        Instruction::Pulse(Pulse {
            blocking,
            frame,
            waveform,
        }),
    ))
}

pub(crate) fn parse_raw_capture<'a>(
    input: ParserInput<'a>,
    blocking: bool,
) -> ParserResult<'a, Instruction> {
    let (input, frame) = parse_frame_identifier(input)?;
    let (input, duration) = parse_expression(input)?;
    let (input, memory_reference) = parse_memory_reference(input)?;
    Ok((
        input,
        Instruction::RawCapture(RawCapture {
            blocking,
            frame,
            duration,
            memory_reference,
        }),
    ))
}

pub(crate) fn parse_reset<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, qubit) = opt(parse_qubit)(input)?;
    Ok((input, Instruction::Reset(Reset { qubit })))
}

pub(crate) fn parse_set_frequency<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, frame) = parse_frame_identifier(input)?;
    let (input, frequency) = parse_expression(input)?;
    Ok((
        input,
        Instruction::SetFrequency(SetFrequency { frame, frequency }),
    ))
}

pub(crate) fn parse_set_phase<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, frame) = parse_frame_identifier(input)?;
    let (input, phase) = parse_expression(input)?;
    Ok((input, Instruction::SetPhase(SetPhase { frame, phase })))
}

pub(crate) fn parse_set_scale<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, frame) = parse_frame_identifier(input)?;
    let (input, scale) = parse_expression(input)?;
    Ok((input, Instruction::SetScale(SetScale { frame, scale })))
}

pub(crate) fn parse_shift_frequency<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, frame) = parse_frame_identifier(input)?;
    let (input, frequency) = parse_expression(input)?;
    Ok((
        input,
        Instruction::ShiftFrequency(ShiftFrequency { frame, frequency }),
    ))
}

pub(crate) fn parse_shift_phase<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, frame) = parse_frame_identifier(input)?;
    let (input, phase) = parse_expression(input)?;
    Ok((input, Instruction::ShiftPhase(ShiftPhase { frame, phase })))
}

pub(crate) fn parse_swap_phases<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, frame_1) = parse_frame_identifier(input)?;
    let (input, frame_2) = parse_frame_identifier(input)?;
    Ok((
        input,
        Instruction::SwapPhases(SwapPhases { frame_1, frame_2 }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::instruction::{
        Arithmetic, ArithmeticOperand, ArithmeticOperator, Declaration, Instruction,
        MemoryReference, Pragma, PragmaArgument, ScalarType, Vector,
    };
    use crate::parser::macros::make_test;

    use super::{parse_declare, parse_pragma};

    fn parse_add<'a>(
        input: crate::parser::ParserInput<'a>,
    ) -> crate::parser::ParserResult<'a, Instruction> {
        super::parse_arithmetic(ArithmeticOperator::Add, input)
    }

    make_test!(
        add_literal,
        parse_add,
        "ro 2",
        Instruction::Arithmetic(Arithmetic {
            operator: ArithmeticOperator::Add,
            destination: ArithmeticOperand::MemoryReference(MemoryReference {
                name: "ro".to_owned(),
                index: 0
            }),
            source: ArithmeticOperand::LiteralInteger(2),
        })
    );

    make_test!(
        declare_shared,
        parse_declare,
        "bits BIT[16] SHARING integers",
        Instruction::Declaration(Declaration {
            name: "bits".to_owned(),
            size: Vector {
                data_type: ScalarType::Bit,
                length: 16
            },
            sharing: Some("integers".to_owned()),
        })
    );

    make_test!(
        pragma_with_data,
        parse_pragma,
        "READOUT-POVM 0 \"(0.9 0.1 0.2 0.8)\"",
        Instruction::Pragma(Pragma {
            name: "READOUT-POVM".to_owned(),
            arguments: vec![PragmaArgument::Integer(0)],
            data: Some("(0.9 0.1 0.2 0.8)".to_owned()),
        })
    );

    make_test!(
        pragma_bare,
        parse_pragma,
        "INITIAL_REWIRING \"GREEDY\"",
        Instruction::Pragma(Pragma {
            name: "INITIAL_REWIRING".to_owned(),
            arguments: vec![],
            data: Some("GREEDY".to_owned()),
        })
    );

    #[test]
    fn defwaveform_integer_sample_rate_overflow() {
        let tokens = crate::parser::lex("custom 9223372036854775807:\n    1, 2").unwrap();
        let result = super::parse_defwaveform(&tokens);
        assert!(result.is_err());
    }
}
