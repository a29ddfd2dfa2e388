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

use crate::parser::{LexError, ParseError};

/// Errors raised when source text fails to parse into a [`Program`].
///
/// Parsing is all-or-nothing: any such error means no program was produced.
///
/// [`Program`]: crate::program::Program
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("error while lexing: {0}")]
    Lex(#[from] LexError),

    #[error("error while parsing: {0}")]
    Parse(#[from] ParseError),
}

/// Raised by bounds-checked instruction access on a [`Program`].
///
/// [`Program`]: crate::program::Program
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("instruction index {index} out of range for program of length {length}")]
pub struct IndexError {
    pub(crate) index: usize,
    pub(crate) length: usize,
}

impl IndexError {
    /// The out-of-range index that was requested.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The number of instructions in the program.
    pub fn length(&self) -> usize {
        self.length
    }
}
