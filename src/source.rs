//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Character source over the compilation unit's source strings
//

use crate::diag::SourceLoc;

// The deepest the scanner ever backs up is two characters (the `lf` double
// suffix probe), but keep a little slack.
const MAX_UNGET: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Cursor {
    string: usize,
    pos: usize,
    loc: SourceLoc,
}

/// Character-level source for one compilation unit: a sequence of virtual
/// source strings presented as a single character stream.
///
/// Handles newline normalization (`\r\n` and lone `\r` become `\n`),
/// backslash-newline elision (line continuations never reach the scanner),
/// and location tracking. Crossing from one string to the next bumps the
/// string index and resets the line to 1; no newline is synthesized at the
/// boundary.
#[derive(Debug)]
pub struct SourceStrings<'s> {
    strings: Vec<&'s [u8]>,
    cursor: Cursor,
    history: Vec<Cursor>,
}

impl<'s> SourceStrings<'s> {
    pub fn new(sources: &[&'s str]) -> Self {
        Self {
            strings: sources.iter().map(|s| s.as_bytes()).collect(),
            cursor: Cursor {
                string: 0,
                pos: 0,
                loc: SourceLoc { string: 0, line: 1 },
            },
            history: Vec::with_capacity(MAX_UNGET),
        }
    }

    /// Location of the character about to be returned.
    pub fn loc(&self) -> SourceLoc {
        self.cursor.loc
    }

    /// `#line` renumbering: the line the scanner is currently on.
    pub fn set_line(&mut self, line: i32) {
        self.cursor.loc.line = line;
    }

    /// `#line` renumbering: override the current source-string index.
    pub fn set_string(&mut self, string: i32) {
        self.cursor.loc.string = string;
    }

    /// Next character, or `None` at true end of input.
    pub fn get(&mut self) -> Option<u8> {
        if self.history.len() == MAX_UNGET {
            self.history.remove(0);
        }
        self.history.push(self.cursor);

        loop {
            let Some(&string) = self.strings.get(self.cursor.string) else {
                return None;
            };
            if self.cursor.pos >= string.len() {
                // the location stays put at true end of input
                if self.cursor.string + 1 >= self.strings.len() {
                    return None;
                }
                self.cursor.string += 1;
                self.cursor.pos = 0;
                self.cursor.loc.string += 1;
                self.cursor.loc.line = 1;
                continue;
            }
            let c = string[self.cursor.pos];
            self.cursor.pos += 1;
            match c {
                b'\\' if self.peek_newline() => {
                    self.consume_newline();
                    continue;
                }
                b'\r' => {
                    if string.get(self.cursor.pos) == Some(&b'\n') {
                        self.cursor.pos += 1;
                    }
                    self.cursor.loc.line += 1;
                    return Some(b'\n');
                }
                b'\n' => {
                    self.cursor.loc.line += 1;
                    return Some(b'\n');
                }
                _ => return Some(c),
            }
        }
    }

    /// Push back the most recently returned character. Supports a few
    /// levels of nesting for the scanner's short speculative probes.
    pub fn unget(&mut self) {
        if let Some(prev) = self.history.pop() {
            self.cursor = prev;
        }
    }

    fn peek_newline(&self) -> bool {
        let string = self.strings[self.cursor.string];
        matches!(string.get(self.cursor.pos), Some(b'\n') | Some(b'\r'))
    }

    fn consume_newline(&mut self) {
        let string = self.strings[self.cursor.string];
        match string.get(self.cursor.pos) {
            Some(b'\r') => {
                self.cursor.pos += 1;
                if string.get(self.cursor.pos) == Some(&b'\n') {
                    self.cursor.pos += 1;
                }
                self.cursor.loc.line += 1;
            }
            Some(b'\n') => {
                self.cursor.pos += 1;
                self.cursor.loc.line += 1;
            }
            _ => {}
        }
    }
}
