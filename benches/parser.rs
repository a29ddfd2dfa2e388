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

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quil_core::Program;

/// A long synthetic program in the shape of a randomized benchmarking
/// sequence: repeated single- and two-qubit layers with a final readout.
fn synthetic_program(layers: usize) -> String {
    let mut source = String::from("DECLARE ro BIT[3]\n");
    for layer in 0..layers {
        let angle = (layer % 8) as f64 * 0.25;
        source.push_str(&format!("RZ({angle}) 0\nRX(pi/2) 1\nCZ 0 1\n"));
    }
    source.push_str("MEASURE 0 ro[0]\nMEASURE 1 ro[1]\n");
    source
}

fn parse_sample_calibrations(c: &mut Criterion) {
    let input = include_str!("fixtures/sample-calibrations.quil");
    c.bench_function("parse_sample_calibrations", |b| {
        b.iter(|| Program::from_str(black_box(input)).unwrap())
    });
}

fn parse_long_program(c: &mut Criterion) {
    let input = synthetic_program(3000);
    assert!(input.lines().count() > 9000);
    c.bench_function("parse_long_program", |b| {
        b.iter(|| Program::from_str(black_box(&input)).unwrap())
    });
}

criterion_group!(benches, parse_sample_calibrations, parse_long_program);
criterion_main!(benches);
