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

use nom::combinator::{cut, opt};
use nom::multi::{many0, many1, separated_list0};
use nom::sequence::{preceded, terminated};

use crate::instruction::{Gate, Instruction};
use crate::parser::common::{parse_gate_modifier, parse_qubit};
use crate::parser::macros::token;
use crate::parser::{parse_expression, ParserInput, ParserResult};

/// A gate application: optional modifiers, the gate name, optional
/// parenthesized parameters, and one or more qubits.
pub(crate) fn parse_gate<'a>(input: ParserInput<'a>) -> ParserResult<'a, Instruction> {
    let (input, modifiers) = many0(parse_gate_modifier)(input)?;
    let (input, name) = token!(Identifier(v))(input)?;
    // Once the opening parenthesis is committed, an unterminated parameter
    // list is fatal rather than a backtrack.
    let (input, parameters) = opt(preceded(
        token!(LParenthesis),
        cut(terminated(
            separated_list0(token!(Comma), parse_expression),
            token!(RParenthesis),
        )),
    ))(input)?;
    let parameters = parameters.unwrap_or_default();
    let (input, qubits) = many1(parse_qubit)(input)?;
    Ok((
        input,
        Instruction::Gate(Gate {
            name,
            parameters,
            qubits,
            modifiers,
        }),
    ))
}
