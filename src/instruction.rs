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

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::expression::{format_real, Expression};

#[derive(Clone, Debug, PartialEq)]
pub struct Arithmetic {
    pub operator: ArithmeticOperator,
    pub destination: ArithmeticOperand,
    pub source: ArithmeticOperand,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ArithmeticOperand {
    LiteralInteger(i64),
    LiteralReal(f64),
    MemoryReference(MemoryReference),
}

impl fmt::Display for ArithmeticOperand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArithmeticOperand::LiteralInteger(value) => write!(f, "{value}"),
            ArithmeticOperand::LiteralReal(value) => write!(f, "{}", format_real(*value)),
            ArithmeticOperand::MemoryReference(reference) => write!(f, "{reference}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum ArithmeticOperator {
    #[strum(serialize = "ADD")]
    Add,
    #[strum(serialize = "SUB")]
    Subtract,
    #[strum(serialize = "MUL")]
    Multiply,
    #[strum(serialize = "DIV")]
    Divide,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    String(String),
    Expression(Expression),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttributeValue::String(value) => write!(f, "{value:?}"),
            AttributeValue::Expression(expression) => write!(f, "{expression}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Calibration {
    pub name: String,
    pub parameters: Vec<Expression>,
    pub qubits: Vec<Qubit>,
    pub modifiers: Vec<GateModifier>,
    pub instructions: Vec<Instruction>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeasureCalibrationDefinition {
    pub qubit: Option<Qubit>,
    pub parameter: String,
    pub instructions: Vec<Instruction>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub size: Vector,
    pub sharing: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Delay {
    pub duration: Expression,
    pub frame_names: Vec<String>,
    pub qubits: Vec<Qubit>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Fence {
    pub qubits: Vec<Qubit>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameDefinition {
    pub identifier: FrameIdentifier,
    pub attributes: FrameAttributes,
}

/// The attribute block of a `DEFFRAME`, in definition order.
pub type FrameAttributes = IndexMap<String, AttributeValue>;

/// A frame is uniquely identified by its name together with the qubits
/// it applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameIdentifier {
    pub name: String,
    pub qubits: Vec<Qubit>,
}

impl fmt::Display for FrameIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for qubit in &self.qubits {
            write!(f, "{qubit} ")?;
        }
        write!(f, "{:?}", self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Gate {
    pub name: String,
    pub parameters: Vec<Expression>,
    pub qubits: Vec<Qubit>,
    pub modifiers: Vec<GateModifier>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum GateModifier {
    Controlled,
    Dagger,
    Forked,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Jump {
    pub target: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JumpWhen {
    pub target: String,
    pub condition: MemoryReference,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JumpUnless {
    pub target: String,
    pub condition: MemoryReference,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label(pub String);

#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub qubit: Qubit,
    pub target: Option<MemoryReference>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryReference {
    pub name: String,
    pub index: u64,
}

impl fmt::Display for MemoryReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    pub destination: ArithmeticOperand,
    pub source: ArithmeticOperand,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Exchange {
    pub left: ArithmeticOperand,
    pub right: ArithmeticOperand,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pragma {
    pub name: String,
    pub arguments: Vec<PragmaArgument>,
    pub data: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PragmaArgument {
    Identifier(String),
    Integer(u64),
}

impl fmt::Display for PragmaArgument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PragmaArgument::Identifier(name) => write!(f, "{name}"),
            PragmaArgument::Integer(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pulse {
    pub blocking: bool,
    pub frame: FrameIdentifier,
    pub waveform: WaveformInvocation,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Capture {
    pub blocking: bool,
    pub frame: FrameIdentifier,
    pub waveform: WaveformInvocation,
    pub memory_reference: MemoryReference,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawCapture {
    pub blocking: bool,
    pub frame: FrameIdentifier,
    pub duration: Expression,
    pub memory_reference: MemoryReference,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qubit {
    Fixed(u64),
    Variable(String),
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Qubit::Fixed(index) => write!(f, "{index}"),
            Qubit::Variable(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reset {
    pub qubit: Option<Qubit>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetFrequency {
    pub frame: FrameIdentifier,
    pub frequency: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetPhase {
    pub frame: FrameIdentifier,
    pub phase: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetScale {
    pub frame: FrameIdentifier,
    pub scale: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShiftFrequency {
    pub frame: FrameIdentifier,
    pub frequency: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShiftPhase {
    pub frame: FrameIdentifier,
    pub phase: Expression,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwapPhases {
    pub frame_1: FrameIdentifier,
    pub frame_2: FrameIdentifier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ScalarType {
    Bit,
    Integer,
    Octet,
    Real,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vector {
    pub data_type: ScalarType,
    pub length: u64,
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[{}]", self.data_type, self.length)
    }
}

/// The body of a `DEFWAVEFORM`.
#[derive(Clone, Debug, PartialEq)]
pub struct Waveform {
    pub samples: Vec<Expression>,
    pub parameters: Vec<String>,
    pub sample_rate: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaveformDefinition {
    pub name: String,
    pub definition: Waveform,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaveformInvocation {
    pub name: String,
    pub parameters: IndexMap<String, Expression>,
}

impl fmt::Display for WaveformInvocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.parameters.is_empty() {
            write!(f, "(")?;
            for (index, (name, value)) in self.parameters.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{name}: {value}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Arithmetic(Arithmetic),
    CalibrationDefinition(Calibration),
    Capture(Capture),
    Declaration(Declaration),
    Delay(Delay),
    Exchange(Exchange),
    Fence(Fence),
    FrameDefinition(FrameDefinition),
    Gate(Gate),
    Halt,
    Jump(Jump),
    JumpUnless(JumpUnless),
    JumpWhen(JumpWhen),
    Label(Label),
    MeasureCalibrationDefinition(MeasureCalibrationDefinition),
    Measurement(Measurement),
    Move(Move),
    Nop,
    Pragma(Pragma),
    Pulse(Pulse),
    RawCapture(RawCapture),
    Reset(Reset),
    SetFrequency(SetFrequency),
    SetPhase(SetPhase),
    SetScale(SetScale),
    ShiftFrequency(ShiftFrequency),
    ShiftPhase(ShiftPhase),
    SwapPhases(SwapPhases),
    WaveformDefinition(WaveformDefinition),
    Wait,
}

/// Write `items` separated by `separator`, preceded by `prefix` if non-empty.
fn write_join<I, T>(
    f: &mut fmt::Formatter,
    items: I,
    separator: &str,
    prefix: &str,
) -> fmt::Result
where
    I: IntoIterator<Item = T>,
    T: fmt::Display,
{
    let mut iter = items.into_iter();
    if let Some(first) = iter.next() {
        write!(f, "{prefix}{first}")?;
        for item in iter {
            write!(f, "{separator}{item}")?;
        }
    }
    Ok(())
}

fn write_parameter_list(f: &mut fmt::Formatter, parameters: &[Expression]) -> fmt::Result {
    if !parameters.is_empty() {
        write!(f, "(")?;
        write_join(f, parameters, ", ", "")?;
        write!(f, ")")?;
    }
    Ok(())
}

fn write_instruction_block(f: &mut fmt::Formatter, instructions: &[Instruction]) -> fmt::Result {
    for instruction in instructions {
        write!(f, "\n    {instruction}")?;
    }
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Arithmetic(Arithmetic {
                operator,
                destination,
                source,
            }) => write!(f, "{operator} {destination} {source}"),
            Instruction::CalibrationDefinition(Calibration {
                name,
                parameters,
                qubits,
                modifiers,
                instructions,
            }) => {
                write!(f, "DEFCAL ")?;
                write_join(f, modifiers, " ", "")?;
                if !modifiers.is_empty() {
                    write!(f, " ")?;
                }
                write!(f, "{name}")?;
                write_parameter_list(f, parameters)?;
                write_join(f, qubits, " ", " ")?;
                write!(f, ":")?;
                write_instruction_block(f, instructions)
            }
            Instruction::Capture(Capture {
                blocking,
                frame,
                waveform,
                memory_reference,
            }) => {
                if !blocking {
                    write!(f, "NONBLOCKING ")?;
                }
                write!(f, "CAPTURE {frame} {waveform} {memory_reference}")
            }
            Instruction::Declaration(Declaration {
                name,
                size,
                sharing,
            }) => {
                write!(f, "DECLARE {name} {size}")?;
                if let Some(shared) = sharing {
                    write!(f, " SHARING {shared}")?;
                }
                Ok(())
            }
            Instruction::Delay(Delay {
                duration,
                frame_names,
                qubits,
            }) => {
                write!(f, "DELAY")?;
                write_join(f, qubits, " ", " ")?;
                for name in frame_names {
                    write!(f, " {name:?}")?;
                }
                write!(f, " {duration}")
            }
            Instruction::Exchange(Exchange { left, right }) => {
                write!(f, "EXCHANGE {left} {right}")
            }
            Instruction::Fence(Fence { qubits }) => {
                write!(f, "FENCE")?;
                write_join(f, qubits, " ", " ")
            }
            Instruction::FrameDefinition(FrameDefinition {
                identifier,
                attributes,
            }) => {
                write!(f, "DEFFRAME {identifier}:")?;
                for (key, value) in attributes {
                    write!(f, "\n    {key}: {value}")?;
                }
                Ok(())
            }
            Instruction::Gate(Gate {
                name,
                parameters,
                qubits,
                modifiers,
            }) => {
                write_join(f, modifiers, " ", "")?;
                if !modifiers.is_empty() {
                    write!(f, " ")?;
                }
                write!(f, "{name}")?;
                write_parameter_list(f, parameters)?;
                write_join(f, qubits, " ", " ")
            }
            Instruction::Halt => write!(f, "HALT"),
            Instruction::Jump(Jump { target }) => write!(f, "JUMP @{target}"),
            Instruction::JumpUnless(JumpUnless { target, condition }) => {
                write!(f, "JUMP-UNLESS @{target} {condition}")
            }
            Instruction::JumpWhen(JumpWhen { target, condition }) => {
                write!(f, "JUMP-WHEN @{target} {condition}")
            }
            Instruction::Label(Label(name)) => write!(f, "LABEL @{name}"),
            Instruction::MeasureCalibrationDefinition(MeasureCalibrationDefinition {
                qubit,
                parameter,
                instructions,
            }) => {
                write!(f, "DEFCAL MEASURE")?;
                if let Some(qubit) = qubit {
                    write!(f, " {qubit}")?;
                }
                write!(f, " {parameter}:")?;
                write_instruction_block(f, instructions)
            }
            Instruction::Measurement(Measurement { qubit, target }) => {
                write!(f, "MEASURE {qubit}")?;
                if let Some(target) = target {
                    write!(f, " {target}")?;
                }
                Ok(())
            }
            Instruction::Move(Move {
                destination,
                source,
            }) => write!(f, "MOVE {destination} {source}"),
            Instruction::Nop => write!(f, "NOP"),
            Instruction::Pragma(Pragma {
                name,
                arguments,
                data,
            }) => {
                write!(f, "PRAGMA {name}")?;
                write_join(f, arguments, " ", " ")?;
                if let Some(data) = data {
                    write!(f, " {data:?}")?;
                }
                Ok(())
            }
            Instruction::Pulse(Pulse {
                blocking,
                frame,
                waveform,
            }) => {
                if !blocking {
                    write!(f, "NONBLOCKING ")?;
                }
                write!(f, "PULSE {frame} {waveform}")
            }
            Instruction::RawCapture(RawCapture {
                blocking,
                frame,
                duration,
                memory_reference,
            }) => {
                if !blocking {
                    write!(f, "NONBLOCKING ")?;
                }
                write!(f, "RAW-CAPTURE {frame} {duration} {memory_reference}")
            }
            Instruction::Reset(Reset { qubit }) => {
                write!(f, "RESET")?;
                if let Some(qubit) = qubit {
                    write!(f, " {qubit}")?;
                }
                Ok(())
            }
            Instruction::SetFrequency(SetFrequency { frame, frequency }) => {
                write!(f, "SET-FREQUENCY {frame} {frequency}")
            }
            Instruction::SetPhase(SetPhase { frame, phase }) => {
                write!(f, "SET-PHASE {frame} {phase}")
            }
            Instruction::SetScale(SetScale { frame, scale }) => {
                write!(f, "SET-SCALE {frame} {scale}")
            }
            Instruction::ShiftFrequency(ShiftFrequency { frame, frequency }) => {
                write!(f, "SHIFT-FREQUENCY {frame} {frequency}")
            }
            Instruction::ShiftPhase(ShiftPhase { frame, phase }) => {
                write!(f, "SHIFT-PHASE {frame} {phase}")
            }
            Instruction::SwapPhases(SwapPhases { frame_1, frame_2 }) => {
                write!(f, "SWAP-PHASES {frame_1} {frame_2}")
            }
            Instruction::WaveformDefinition(WaveformDefinition { name, definition }) => {
                write!(f, "DEFWAVEFORM {name}")?;
                if !definition.parameters.is_empty() {
                    write!(f, "(")?;
                    for (index, parameter) in definition.parameters.iter().enumerate() {
                        if index > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "%{parameter}")?;
                    }
                    write!(f, ")")?;
                }
                write!(f, " {}:\n    ", format_real(definition.sample_rate))?;
                write_join(f, &definition.samples, ", ", "")
            }
            Instruction::Wait => write!(f, "WAIT"),
        }
    }
}
