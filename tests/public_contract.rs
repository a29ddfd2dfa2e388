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

//! End-to-end checks of the crate's public parsing and iteration contract.

use std::str::FromStr;

use pretty_assertions::assert_eq;

use quil_core::instruction::{Gate, Instruction, Qubit};
use quil_core::Program;

const PROGRAM_TEXT: &str = r#"DECLARE ro BIT[2]
DEFFRAME 0 "rf":
    HARDWARE-OBJECT: "q0_rf"
    SAMPLE-RATE: 1e9
DEFCAL X q:
    WAIT
DEFCAL X 0:
    NOP
X 0
X 1
MEASURE 0 ro[0]
MEASURE 1 ro[1]
"#;

#[test]
fn instructions_come_back_in_source_order() {
    let program = Program::from_str(PROGRAM_TEXT).unwrap();
    let kinds: Vec<&str> = program
        .iter()
        .map(|instruction| match instruction {
            Instruction::Declaration(_) => "declaration",
            Instruction::FrameDefinition(_) => "frame",
            Instruction::CalibrationDefinition(_) => "calibration",
            Instruction::Gate(_) => "gate",
            Instruction::Measurement(_) => "measurement",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "declaration",
            "frame",
            "calibration",
            "calibration",
            "gate",
            "gate",
            "measurement",
            "measurement",
        ]
    );
}

#[test]
fn concurrent_iteration_needs_no_locking() {
    let program = Program::from_str(PROGRAM_TEXT).unwrap();
    let counts: Vec<usize> = std::thread::scope(|scope| {
        (0..4)
            .map(|_| scope.spawn(|| program.iter().count()))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    assert_eq!(counts, vec![program.len(); 4]);
}

#[test]
fn more_specific_calibration_wins_and_later_shadows_earlier() {
    let program = Program::from_str(PROGRAM_TEXT).unwrap();
    let fixed = Gate {
        name: "X".to_owned(),
        parameters: vec![],
        qubits: vec![Qubit::Fixed(0)],
        modifiers: vec![],
    };
    let matched = program.calibrations().get_match_for_gate(&fixed).unwrap();
    assert_eq!(matched.instructions, vec![Instruction::Nop]);

    let other = Gate {
        qubits: vec![Qubit::Fixed(1)],
        ..fixed
    };
    let matched = program.calibrations().get_match_for_gate(&other).unwrap();
    assert_eq!(matched.instructions, vec![Instruction::Wait]);
}

#[test]
fn calibration_bodies_are_not_flattened_into_the_program() {
    let program = Program::from_str(PROGRAM_TEXT).unwrap();
    // The WAIT and NOP bodies live only inside their calibrations.
    assert!(program
        .iter()
        .all(|instruction| !matches!(instruction, Instruction::Nop | Instruction::Wait)));
}

#[test]
fn failed_parse_yields_no_program() {
    let result = Program::from_str("DECLARE ro BIT[2]\nRX(");
    assert!(result.is_err());
}

#[test]
fn display_output_reparses_to_an_equal_program() {
    let program = Program::from_str(PROGRAM_TEXT).unwrap();
    let reparsed = Program::from_str(&program.to_string()).unwrap();
    assert_eq!(program, reparsed);
}

#[test]
fn indexing_matches_iteration() {
    let program = Program::from_str(PROGRAM_TEXT).unwrap();
    for (index, instruction) in program.iter().enumerate() {
        assert_eq!(&program[index], instruction);
        assert_eq!(program.instruction(index).unwrap(), instruction);
    }
    assert!(program.instruction(program.len()).is_err());
}
