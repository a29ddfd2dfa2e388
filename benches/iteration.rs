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

fn synthetic_program(layers: usize) -> String {
    let mut source = String::from("DECLARE ro BIT[3]\n");
    for layer in 0..layers {
        let angle = (layer % 8) as f64 * 0.25;
        source.push_str(&format!("RZ({angle}) 0\nRX(pi/2) 1\nCZ 0 1\n"));
    }
    source.push_str("MEASURE 0 ro[0]\nMEASURE 1 ro[1]\n");
    source
}

/// Iteration cost should stay linear in program length: the long program is
/// a thousand times the short one, and so should its per-pass time be.
fn iterate_programs(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    for (name, layers) in [("short_program", 3), ("long_program", 3000)] {
        let program = Program::from_str(&synthetic_program(layers)).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                for instruction in &program {
                    black_box(instruction);
                }
            })
        });
    }
    group.finish();
}

fn indexed_access(c: &mut Criterion) {
    let program = Program::from_str(&synthetic_program(3000)).unwrap();
    let length = program.len();
    c.bench_function("indexed_access", |b| {
        b.iter(|| {
            for index in (0..length).step_by(97) {
                black_box(program.instruction(index).unwrap());
            }
        })
    });
}

criterion_group!(benches, iterate_programs, indexed_access);
criterion_main!(benches);
