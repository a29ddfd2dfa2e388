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

use nom::multi::many1;

use crate::instruction::{ArithmeticOperator, Instruction};
use crate::parser::command;
use crate::parser::common::skip_newlines_and_comments;
use crate::parser::gate::parse_gate;
use crate::parser::lexer::Command;
use crate::parser::macros::{expected_token, token, unexpected_eof};
use crate::parser::{
    first_token, split_first_token, InternalParseError, ParserErrorKind, ParserInput, ParserResult,
    Token,
};

/// Parse a single instruction, starting at its command keyword, gate
/// modifier, or gate name and stopping short of its terminator.
pub(crate) fn parse_instruction<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    match split_first_token(input) {
        None => unexpected_eof!(input),
        Some((Token::Command(command), remainder)) => {
            let result = match command {
                Command::Add => command::parse_arithmetic(ArithmeticOperator::Add, remainder),
                Command::Capture => command::parse_capture(remainder, true),
                Command::Declare => command::parse_declare(remainder),
                Command::DefCal => command::parse_defcal(remainder),
                Command::DefFrame => command::parse_defframe(remainder),
                Command::DefWaveform => command::parse_defwaveform(remainder),
                Command::Delay => command::parse_delay(remainder),
                Command::Div => command::parse_arithmetic(ArithmeticOperator::Divide, remainder),
                Command::Exchange => command::parse_exchange(remainder),
                Command::Fence => command::parse_fence(remainder),
                Command::Halt => Ok((remainder, Instruction::Halt)),
                Command::Jump => command::parse_jump(remainder),
                Command::JumpUnless => command::parse_jump_unless(remainder),
                Command::JumpWhen => command::parse_jump_when(remainder),
                Command::Label => command::parse_label(remainder),
                Command::Measure => command::parse_measurement(remainder),
                Command::Move => command::parse_move(remainder),
                Command::Mul => command::parse_arithmetic(ArithmeticOperator::Multiply, remainder),
                Command::Nop => Ok((remainder, Instruction::Nop)),
                Command::Pragma => command::parse_pragma(remainder),
                Command::Pulse => command::parse_pulse(remainder, true),
                Command::RawCapture => command::parse_raw_capture(remainder, true),
                Command::Reset => command::parse_reset(remainder),
                Command::SetFrequency => command::parse_set_frequency(remainder),
                Command::SetPhase => command::parse_set_phase(remainder),
                Command::SetScale => command::parse_set_scale(remainder),
                Command::ShiftFrequency => command::parse_shift_frequency(remainder),
                Command::ShiftPhase => command::parse_shift_phase(remainder),
                Command::Sub => command::parse_arithmetic(ArithmeticOperator::Subtract, remainder),
                Command::SwapPhases => command::parse_swap_phases(remainder),
                Command::Wait => Ok((remainder, Instruction::Wait)),
            };
            result.map_err(|err| err.map(|internal| internal.with_command_context(*command)))
        }
        Some((Token::NonBlocking, remainder)) => match split_first_token(remainder) {
            None => unexpected_eof!(remainder),
            Some((Token::Command(Command::Pulse), rest)) => command::parse_pulse(rest, false),
            Some((Token::Command(Command::Capture), rest)) => command::parse_capture(rest, false),
            Some((Token::Command(Command::RawCapture), rest)) => {
                command::parse_raw_capture(rest, false)
            }
            Some((other_token, _)) => expected_token!(
                remainder,
                other_token,
                "PULSE, CAPTURE, or RAW-CAPTURE".to_owned()
            ),
        },
        Some((Token::Identifier(_) | Token::Modifier(_), _)) => parse_gate(input),
        Some((_, _)) => Err(nom::Err::Error(InternalParseError::from_kind(
            input,
            ParserErrorKind::NotACommandOrGate,
        ))),
    }
}

/// Parse an entire token stream into instructions, requiring every token to
/// be consumed. Instructions are separated by newlines or semicolons;
/// comments and blank lines in between are skipped.
pub(crate) fn parse_instructions<'a>(
    input: ParserInput<'a>,
) -> ParserResult<'a, Vec<Instruction>> {
    let mut instructions = vec![];
    let (mut input, _) = skip_newlines_and_comments(input)?;
    while !input.is_empty() {
        let (rest, instruction) = parse_instruction(input)?;
        instructions.push(instruction);
        let rest = match first_token(rest) {
            Some(Token::Comment(_)) => &rest[1..],
            _ => rest,
        };
        let rest = match first_token(rest) {
            None => rest,
            Some(Token::NewLine | Token::Semicolon) => &rest[1..],
            Some(other_token) => {
                return expected_token!(rest, other_token, "a newline or semicolon".to_owned())
            }
        };
        let (rest, _) = skip_newlines_and_comments(rest)?;
        input = rest;
    }
    Ok((input, instructions))
}

/// The indented instruction block of a `DEFCAL` body: one or more lines, each
/// a newline followed by indentation and an instruction.
pub(crate) fn parse_block<'a>(input: ParserInput<'a>) -> ParserResult<'a, Vec<Instruction>> {
    many1(parse_block_instruction)(input)
}

fn parse_block_instruction<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, _) = token!(NewLine)(input)?;
    let (input, _) = token!(Indentation)(input)?;
    match first_token(input) {
        // A comment occupying a whole line of the block.
        Some(Token::Comment(_)) => parse_block_instruction(&input[1..]),
        _ => {
            let (rest, instruction) = parse_instruction(input)?;
            // A trailing comment on the same line as the instruction.
            let rest = match first_token(rest) {
                Some(Token::Comment(_)) => &rest[1..],
                _ => rest,
            };
            Ok((rest, instruction))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::expression::Expression;
    use crate::instruction::{
        Calibration, FrameIdentifier, Gate, Instruction, Jump, JumpUnless, Label,
        MeasureCalibrationDefinition, Measurement, MemoryReference, Pulse, Qubit, Reset,
        ShiftPhase, WaveformInvocation,
    };
    use crate::parser::lex;
    use crate::parser::macros::make_test;

    use super::{parse_instruction, parse_instructions};

    make_test!(
        halt,
        parse_instruction,
        "HALT",
        Instruction::Halt
    );

    make_test!(
        reset_single_qubit,
        parse_instruction,
        "RESET 1",
        Instruction::Reset(Reset {
            qubit: Some(Qubit::Fixed(1))
        })
    );

    make_test!(
        measure_discarding_result,
        parse_instruction,
        "MEASURE 0",
        Instruction::Measurement(Measurement {
            qubit: Qubit::Fixed(0),
            target: None,
        })
    );

    make_test!(
        nonblocking_pulse,
        parse_instruction,
        "NONBLOCKING PULSE 0 \"xy\" gaussian",
        Instruction::Pulse(Pulse {
            blocking: false,
            frame: FrameIdentifier {
                name: "xy".to_owned(),
                qubits: vec![Qubit::Fixed(0)],
            },
            waveform: WaveformInvocation {
                name: "gaussian".to_owned(),
                parameters: Default::default(),
            },
        })
    );

    make_test!(
        defcal_with_body,
        parse_instruction,
        "DEFCAL RZ(%theta) q:\n    SHIFT-PHASE q \"rf\" -%theta",
        Instruction::CalibrationDefinition(Calibration {
            name: "RZ".to_owned(),
            parameters: vec![Expression::Variable("theta".to_owned())],
            qubits: vec![Qubit::Variable("q".to_owned())],
            modifiers: vec![],
            instructions: vec![Instruction::ShiftPhase(ShiftPhase {
                frame: FrameIdentifier {
                    name: "rf".to_owned(),
                    qubits: vec![Qubit::Variable("q".to_owned())],
                },
                phase: Expression::Prefix {
                    operator: crate::expression::PrefixOperator::Minus,
                    expression: Box::new(Expression::Variable("theta".to_owned())),
                },
            })],
        })
    );

    make_test!(
        defcal_measure_without_qubit,
        parse_instruction,
        "DEFCAL MEASURE addr:\n    NOP",
        Instruction::MeasureCalibrationDefinition(MeasureCalibrationDefinition {
            qubit: None,
            parameter: "addr".to_owned(),
            instructions: vec![Instruction::Nop],
        })
    );

    make_test!(
        defcal_measure_with_qubit,
        parse_instruction,
        "DEFCAL MEASURE 0 addr:\n    NOP",
        Instruction::MeasureCalibrationDefinition(MeasureCalibrationDefinition {
            qubit: Some(Qubit::Fixed(0)),
            parameter: "addr".to_owned(),
            instructions: vec![Instruction::Nop],
        })
    );

    make_test!(
        program_with_separators_and_comments,
        parse_instructions,
        "# preamble\nX 0; Y 1\n\nLABEL @start\nJUMP-UNLESS @start ro[0]\nJUMP @end",
        vec![
            Instruction::Gate(Gate {
                name: "X".to_owned(),
                parameters: vec![],
                qubits: vec![Qubit::Fixed(0)],
                modifiers: vec![],
            }),
            Instruction::Gate(Gate {
                name: "Y".to_owned(),
                parameters: vec![],
                qubits: vec![Qubit::Fixed(1)],
                modifiers: vec![],
            }),
            Instruction::Label(Label("start".to_owned())),
            Instruction::JumpUnless(JumpUnless {
                target: "start".to_owned(),
                condition: MemoryReference {
                    name: "ro".to_owned(),
                    index: 0
                },
            }),
            Instruction::Jump(Jump {
                target: "end".to_owned()
            }),
        ]
    );

    make_test!(empty_program, parse_instructions, "", Vec::<Instruction>::new());

    #[test]
    fn block_ends_at_unindented_line() {
        let tokens = lex("DEFCAL X 0:\n    NOP\nY 0").unwrap();
        let (remainder, instruction) = parse_instruction(&tokens).unwrap();
        assert_eq!(
            instruction,
            Instruction::CalibrationDefinition(Calibration {
                name: "X".to_owned(),
                parameters: vec![],
                qubits: vec![Qubit::Fixed(0)],
                modifiers: vec![],
                instructions: vec![Instruction::Nop],
            })
        );
        // The trailing newline and the next instruction are left unconsumed.
        assert_eq!(remainder.len(), 3);
    }

    #[test]
    fn block_lines_may_carry_trailing_comments() {
        let tokens = lex("DEFCAL X 0:\n    NOP # first step\n    WAIT # settle\nX 0").unwrap();
        let (remainder, instructions) = parse_instructions(&tokens).unwrap();
        assert_eq!(remainder.len(), 0);
        assert_eq!(instructions.len(), 2);
        match &instructions[0] {
            Instruction::CalibrationDefinition(calibration) => {
                assert_eq!(
                    calibration.instructions,
                    vec![Instruction::Nop, Instruction::Wait]
                );
            }
            other => panic!("expected a calibration, got {other}"),
        }
    }

    #[test]
    fn unterminated_parameter_list() {
        let tokens = lex("RX(pi 0").unwrap();
        assert!(parse_instructions(&tokens).is_err());
    }

    #[test]
    fn stray_token_is_not_a_command_or_gate() {
        let tokens = lex(") 0").unwrap();
        assert!(parse_instructions(&tokens).is_err());
    }
}
