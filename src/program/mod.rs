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
use std::iter::FusedIterator;
use std::ops::Index;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::instruction::{Instruction, Waveform};
use crate::parser::{lex, parse_instructions, ParseError};

pub use self::calibration::CalibrationSet;
pub use self::error::{IndexError, SyntaxError};
pub use self::frame::FrameSet;
pub use self::memory::MemoryRegion;

mod calibration;
mod error;
mod frame;
mod memory;

/// An immutable, ordered sequence of parsed Quil instructions.
///
/// A `Program` keeps every top-level instruction in exact source order,
/// definitions included. Calibration, frame, waveform, and memory-region
/// definitions are additionally registered in side tables at construction
/// time, so lookup by identity never re-walks the sequence.
///
/// `Program` is `Send + Sync`; any number of threads may iterate it
/// concurrently, and every call to [`Program::iter`] starts over from the
/// first instruction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    instructions: Vec<Instruction>,
    calibrations: CalibrationSet,
    frames: FrameSet,
    memory_regions: IndexMap<String, MemoryRegion>,
    waveforms: IndexMap<String, Waveform>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    /// Build a program from instructions, registering each definition in its
    /// side table.
    pub fn from_instructions(instructions: Vec<Instruction>) -> Self {
        let mut program = Program::new();
        for instruction in instructions {
            program.add_instruction(instruction);
        }
        program
    }

    /// Append an instruction, keeping the side tables in sync.
    pub fn add_instruction(&mut self, instruction: Instruction) {
        match &instruction {
            Instruction::CalibrationDefinition(calibration) => {
                self.calibrations.push_calibration(calibration.clone());
            }
            Instruction::MeasureCalibrationDefinition(calibration) => {
                self.calibrations
                    .push_measurement_calibration(calibration.clone());
            }
            Instruction::FrameDefinition(definition) => {
                self.frames.insert(
                    definition.identifier.clone(),
                    definition.attributes.clone(),
                );
            }
            Instruction::Declaration(declaration) => {
                self.memory_regions.insert(
                    declaration.name.clone(),
                    MemoryRegion::new(declaration.size.clone(), declaration.sharing.clone()),
                );
            }
            Instruction::WaveformDefinition(definition) => {
                self.waveforms
                    .insert(definition.name.clone(), definition.definition.clone());
            }
            _ => {}
        }
        self.instructions.push(instruction);
    }

    /// The number of top-level instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instruction at `index`, if it is in range.
    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// The instruction at `index`, or an [`IndexError`] naming the violated
    /// bound.
    pub fn instruction(&self, index: usize) -> Result<&Instruction, IndexError> {
        self.instructions.get(index).ok_or(IndexError {
            index,
            length: self.instructions.len(),
        })
    }

    /// Iterate over the instructions in source order. Each call yields a
    /// fresh, independent cursor.
    pub fn iter(&self) -> Instructions<'_> {
        Instructions {
            iter: self.instructions.iter(),
        }
    }

    pub fn calibrations(&self) -> &CalibrationSet {
        &self.calibrations
    }

    pub fn frames(&self) -> &FrameSet {
        &self.frames
    }

    pub fn memory_regions(&self) -> &IndexMap<String, MemoryRegion> {
        &self.memory_regions
    }

    pub fn waveforms(&self) -> &IndexMap<String, Waveform> {
        &self.waveforms
    }
}

impl Index<usize> for Program {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

impl FromStr for Program {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lex(s)?;
        let (_, instructions) = parse_instructions(&tokens)
            .map_err(|err| SyntaxError::from(ParseError::from_nom_err(err, &tokens)))?;
        Ok(Program::from_instructions(instructions))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

/// An iterator over the instructions of a [`Program`], in source order.
///
/// Obtained from [`Program::iter`] or by iterating `&Program`. Advancing is
/// O(1) and allocation-free; dropping it partway through has no effect on the
/// program or on other iterators.
#[derive(Clone, Debug)]
pub struct Instructions<'a> {
    iter: std::slice::Iter<'a, Instruction>,
}

impl<'a> Iterator for Instructions<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for Instructions<'_> {}

impl DoubleEndedIterator for Instructions<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back()
    }
}

impl FusedIterator for Instructions<'_> {}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = Instructions<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use crate::instruction::{Instruction, Qubit};

    use super::Program;

    const QUILT_PROGRAM: &str = r#"DECLARE ro BIT[2]
DEFFRAME 0 "rf":
    HARDWARE-OBJECT: "q0_rf"
    SAMPLE-RATE: 1e9
DEFWAVEFORM custom 1e9:
    0.1, 0.2, 0.3
DEFCAL X 0:
    PULSE 0 "rf" custom
X 0
MEASURE 0 ro[0]
"#;

    #[test]
    fn definitions_stay_in_source_order() {
        let program = Program::from_str(QUILT_PROGRAM).unwrap();
        assert_eq!(program.len(), 6);
        assert!(matches!(program[0], Instruction::Declaration(_)));
        assert!(matches!(program[1], Instruction::FrameDefinition(_)));
        assert!(matches!(program[2], Instruction::WaveformDefinition(_)));
        assert!(matches!(program[3], Instruction::CalibrationDefinition(_)));
        assert!(matches!(program[4], Instruction::Gate(_)));
        assert!(matches!(program[5], Instruction::Measurement(_)));
    }

    #[test]
    fn definitions_are_registered_in_side_tables() {
        let program = Program::from_str(QUILT_PROGRAM).unwrap();
        assert_eq!(program.calibrations().len(), 1);
        assert_eq!(program.frames().len(), 1);
        assert_eq!(program.memory_regions().len(), 1);
        assert_eq!(program.waveforms().len(), 1);
        assert!(program.memory_regions().contains_key("ro"));
        assert!(program.waveforms().contains_key("custom"));
    }

    #[test]
    fn calibration_body_reachable_through_lookup() {
        let program = Program::from_str(QUILT_PROGRAM).unwrap();
        let gate = match &program[4] {
            Instruction::Gate(gate) => gate,
            other => panic!("expected a gate, got {other}"),
        };
        let calibration = program.calibrations().get_match_for_gate(gate).unwrap();
        assert_eq!(calibration.instructions.len(), 1);
        assert!(matches!(calibration.instructions[0], Instruction::Pulse(_)));
    }

    #[test]
    fn iteration_is_restartable() {
        let program = Program::from_str(QUILT_PROGRAM).unwrap();
        let mut first = program.iter();
        first.next();
        first.next();
        // A second iterator starts over, unaffected by the first.
        let second: Vec<_> = program.iter().collect();
        assert_eq!(second.len(), program.len());
        let first_remaining: Vec<_> = first.collect();
        assert_eq!(first_remaining.len(), program.len() - 2);
    }

    #[test]
    fn reparsing_is_idempotent() {
        let program = Program::from_str(QUILT_PROGRAM).unwrap();
        let again = Program::from_str(QUILT_PROGRAM).unwrap();
        assert_eq!(program, again);
    }

    #[test]
    fn empty_source_parses_to_empty_program() {
        let program = Program::from_str("").unwrap();
        assert_eq!(program.len(), 0);
        assert!(program.is_empty());
        assert_eq!(program.iter().next(), None);
    }

    #[test]
    fn out_of_range_access() {
        let program = Program::from_str("X 0").unwrap();
        assert!(program.get(0).is_some());
        assert!(program.get(1).is_none());
        let error = program.instruction(5).unwrap_err();
        assert_eq!(error.index(), 5);
        assert_eq!(error.length(), 1);
    }

    #[test]
    fn unterminated_parameter_list_positions_error_at_end() {
        let error = Program::from_str("RX(pi").unwrap_err();
        let parse_error = match error {
            super::SyntaxError::Parse(err) => err,
            other => panic!("expected a parse error, got {other}"),
        };
        // Just past `pi`, the last valid token.
        assert_eq!(parse_error.line(), 1);
        assert_eq!(parse_error.column(), 6);
    }

    #[test]
    fn oversized_integer_literal_is_reported() {
        let error = Program::from_str("X 18446744073709551616").unwrap_err();
        assert!(matches!(error, super::SyntaxError::Lex(_)));
    }

    #[test]
    fn display_round_trips_structurally() {
        let program = Program::from_str(QUILT_PROGRAM).unwrap();
        let reparsed = Program::from_str(&program.to_string()).unwrap();
        assert_eq!(program, reparsed);
    }

    proptest! {
        #[test]
        fn iteration_preserves_source_order(qubits in proptest::collection::vec(0u64..1000, 0..100)) {
            let source: String = qubits
                .iter()
                .map(|qubit| format!("X {qubit}\n"))
                .collect();
            let program = Program::from_str(&source).unwrap();
            prop_assert_eq!(program.len(), qubits.len());
            for (instruction, qubit) in program.iter().zip(&qubits) {
                match instruction {
                    Instruction::Gate(gate) => {
                        prop_assert_eq!(&gate.qubits, &vec![Qubit::Fixed(*qubit)]);
                    }
                    other => prop_assert!(false, "unexpected instruction {}", other),
                }
            }
        }
    }
}
