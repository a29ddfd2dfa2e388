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

use crate::instruction::Vector;

/// A classical memory region introduced by a `DECLARE` instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryRegion {
    pub size: Vector,
    pub sharing: Option<String>,
}

impl MemoryRegion {
    pub fn new(size: Vector, sharing: Option<String>) -> Self {
        Self { size, sharing }
    }
}
