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

use crate::expression::Expression;
use crate::instruction::{Calibration, Gate, Instruction, MeasureCalibrationDefinition, Qubit};

/// The `DEFCAL` definitions of a program, in definition order.
///
/// Lookup follows the Quil-T matching rule: among the definitions matching a
/// gate or measurement, the most specific one (the one naming the most fixed
/// qubits) wins, and among equally specific definitions the most recently
/// defined wins. A later definition with an identical signature therefore
/// shadows an earlier one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalibrationSet {
    calibrations: Vec<Calibration>,
    measure_calibrations: Vec<MeasureCalibrationDefinition>,
}

impl CalibrationSet {
    pub fn new() -> Self {
        CalibrationSet::default()
    }

    pub fn calibrations(&self) -> &[Calibration] {
        &self.calibrations
    }

    pub fn measure_calibrations(&self) -> &[MeasureCalibrationDefinition] {
        &self.measure_calibrations
    }

    pub fn len(&self) -> usize {
        self.calibrations.len() + self.measure_calibrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calibrations.is_empty() && self.measure_calibrations.is_empty()
    }

    pub fn push_calibration(&mut self, calibration: Calibration) {
        self.calibrations.push(calibration);
    }

    pub fn push_measurement_calibration(&mut self, calibration: MeasureCalibrationDefinition) {
        self.measure_calibrations.push(calibration);
    }

    /// Return the calibration with the body to use for the given gate, if any.
    ///
    /// A definition matches when its name, modifiers, parameter count, and
    /// qubit count all line up, every fixed qubit and constant parameter is
    /// equal, and variable qubits and parameters stand in for the rest.
    pub fn get_match_for_gate(&self, gate: &Gate) -> Option<&Calibration> {
        let mut best: Option<(usize, &Calibration)> = None;
        for calibration in &self.calibrations {
            if calibration.name != gate.name
                || calibration.modifiers != gate.modifiers
                || calibration.parameters.len() != gate.parameters.len()
                || calibration.qubits.len() != gate.qubits.len()
            {
                continue;
            }
            let parameters_match = calibration
                .parameters
                .iter()
                .zip(&gate.parameters)
                .all(|(cal, actual)| matches!(cal, Expression::Variable(_)) || cal == actual);
            if !parameters_match {
                continue;
            }
            let qubits_match = calibration
                .qubits
                .iter()
                .zip(&gate.qubits)
                .all(|(cal, actual)| matches!(cal, Qubit::Variable(_)) || cal == actual);
            if !qubits_match {
                continue;
            }
            let fixed_qubit_count = calibration
                .qubits
                .iter()
                .filter(|qubit| matches!(qubit, Qubit::Fixed(_)))
                .count();
            // `>=` so that a later definition shadows an equally specific
            // earlier one.
            if best.map_or(true, |(count, _)| fixed_qubit_count >= count) {
                best = Some((fixed_qubit_count, calibration));
            }
        }
        best.map(|(_, calibration)| calibration)
    }

    /// Return the measurement calibration to use for the given qubit, if any.
    pub fn get_match_for_measurement(
        &self,
        qubit: &Qubit,
    ) -> Option<&MeasureCalibrationDefinition> {
        let mut best: Option<(usize, &MeasureCalibrationDefinition)> = None;
        for calibration in &self.measure_calibrations {
            let specificity = match &calibration.qubit {
                Some(Qubit::Fixed(index)) => {
                    if Qubit::Fixed(*index) == *qubit {
                        2
                    } else {
                        continue;
                    }
                }
                Some(Qubit::Variable(_)) => 1,
                None => 0,
            };
            if best.map_or(true, |(previous, _)| specificity >= previous) {
                best = Some((specificity, calibration));
            }
        }
        best.map(|(_, calibration)| calibration)
    }

    /// Reconstruct the `DEFCAL` instructions defining these calibrations.
    pub fn to_instructions(&self) -> Vec<Instruction> {
        self.calibrations
            .iter()
            .cloned()
            .map(Instruction::CalibrationDefinition)
            .chain(
                self.measure_calibrations
                    .iter()
                    .cloned()
                    .map(Instruction::MeasureCalibrationDefinition),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::instruction::{
        Calibration, Gate, Instruction, MeasureCalibrationDefinition, Qubit,
    };

    use super::CalibrationSet;

    fn calibration(name: &str, qubit: Qubit, instructions: Vec<Instruction>) -> Calibration {
        Calibration {
            name: name.to_owned(),
            parameters: vec![],
            qubits: vec![qubit],
            modifiers: vec![],
            instructions,
        }
    }

    fn gate(name: &str, qubit: Qubit) -> Gate {
        Gate {
            name: name.to_owned(),
            parameters: vec![],
            qubits: vec![qubit],
            modifiers: vec![],
        }
    }

    #[test]
    fn fixed_qubit_beats_variable() {
        let mut set = CalibrationSet::new();
        set.push_calibration(calibration(
            "X",
            Qubit::Fixed(0),
            vec![Instruction::Nop],
        ));
        set.push_calibration(calibration(
            "X",
            Qubit::Variable("q".to_owned()),
            vec![Instruction::Wait],
        ));
        let matched = set.get_match_for_gate(&gate("X", Qubit::Fixed(0))).unwrap();
        assert_eq!(matched.instructions, vec![Instruction::Nop]);
        // A qubit with no fixed-qubit definition falls through to the
        // variable one.
        let matched = set.get_match_for_gate(&gate("X", Qubit::Fixed(7))).unwrap();
        assert_eq!(matched.instructions, vec![Instruction::Wait]);
    }

    #[test]
    fn later_identical_definition_shadows_earlier() {
        let mut set = CalibrationSet::new();
        set.push_calibration(calibration("X", Qubit::Fixed(0), vec![Instruction::Nop]));
        set.push_calibration(calibration("X", Qubit::Fixed(0), vec![Instruction::Halt]));
        let matched = set.get_match_for_gate(&gate("X", Qubit::Fixed(0))).unwrap();
        assert_eq!(matched.instructions, vec![Instruction::Halt]);
    }

    #[test]
    fn name_mismatch_does_not_match() {
        let mut set = CalibrationSet::new();
        set.push_calibration(calibration("X", Qubit::Fixed(0), vec![Instruction::Nop]));
        assert!(set.get_match_for_gate(&gate("Y", Qubit::Fixed(0))).is_none());
    }

    #[test]
    fn measurement_prefers_fixed_qubit() {
        let mut set = CalibrationSet::new();
        set.push_measurement_calibration(MeasureCalibrationDefinition {
            qubit: None,
            parameter: "dest".to_owned(),
            instructions: vec![Instruction::Nop],
        });
        set.push_measurement_calibration(MeasureCalibrationDefinition {
            qubit: Some(Qubit::Fixed(0)),
            parameter: "dest".to_owned(),
            instructions: vec![Instruction::Halt],
        });
        let matched = set.get_match_for_measurement(&Qubit::Fixed(0)).unwrap();
        assert_eq!(matched.instructions, vec![Instruction::Halt]);
        let matched = set.get_match_for_measurement(&Qubit::Fixed(3)).unwrap();
        assert_eq!(matched.instructions, vec![Instruction::Nop]);
    }
}
