//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Atom table - interned identifier and string spellings
//

use std::collections::HashMap;

/// An interned spelling. Equality is integer equality; the spelling is
/// recovered through the owning [`AtomTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(u32);

/// Intern table mapping spellings to stable [`Atom`]s and back.
///
/// Append-only; atoms are never removed. Each preprocessor instance owns
/// one table, so no synchronization is needed.
#[derive(Debug, Default)]
pub struct AtomTable {
    map: HashMap<String, Atom>,
    spellings: Vec<String>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a spelling, adding it if not present.
    pub fn intern(&mut self, text: &str) -> Atom {
        if let Some(&atom) = self.map.get(text) {
            return atom;
        }
        let atom = Atom(self.spellings.len() as u32);
        self.spellings.push(text.to_string());
        self.map.insert(text.to_string(), atom);
        atom
    }

    /// Look up a spelling without adding it.
    pub fn lookup(&self, text: &str) -> Option<Atom> {
        self.map.get(text).copied()
    }

    pub fn spelling(&self, atom: Atom) -> &str {
        &self.spellings[atom.0 as usize]
    }
}
