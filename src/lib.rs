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

//! Parsing and representation of [Quil](https://github.com/quil-lang/quil) programs.
//!
//! The entry point is [`Program::from_str`](std::str::FromStr): it lexes and
//! parses Quil source text in a single pass and returns an ordered, immutable
//! [`Program`]. Instructions are kept in exact source order; calibration,
//! frame, waveform, and memory-region definitions are additionally indexed in
//! side tables for cheap lookup.
//!
//! Iteration over a parsed program is restartable and allocation-free: each
//! call to [`Program::iter`] yields a fresh cursor over the same immutable
//! instruction storage.
//!
//! This crate does not execute or simulate programs, nor does it perform any
//! I/O; source text goes in, a [`Program`] (or a positioned syntax error)
//! comes out.

pub mod expression;
pub mod instruction;
mod parser;
pub mod program;

pub use parser::{Command, LexError, LexErrorKind, ParseError, ParserErrorKind, Token};
pub use program::Program;
