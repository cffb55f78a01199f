//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Token types for the shading-language preprocessor
//

use std::fmt;

use crate::atom::Atom;
use crate::diag::SourceLoc;

// ============================================================================
// Punctuators and Operators
// ============================================================================

/// An operator or punctuator.
///
/// Single characters are carried as their ASCII value; multi-character
/// operators get named variants. The digraphs `<%` `%>` `<:` `:>` are
/// resolved by the scanner into the corresponding brace/bracket characters
/// and never appear as distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    /// Single-character punctuator (ASCII)
    Char(u8),
    IncOp,       // ++
    DecOp,       // --
    LeftOp,      // <<
    RightOp,     // >>
    LeOp,        // <=
    GeOp,        // >=
    EqOp,        // ==
    NeOp,        // !=
    AndOp,       // &&
    OrOp,        // ||
    XorOp,       // ^^
    AddAssign,   // +=
    SubAssign,   // -=
    MulAssign,   // *=
    DivAssign,   // /=
    ModAssign,   // %=
    AndAssign,   // &=
    OrAssign,    // |=
    XorAssign,   // ^=
    LeftAssign,  // <<=
    RightAssign, // >>=
}

impl fmt::Display for Punct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Punct::Char(c) => write!(f, "{}", *c as char),
            Punct::IncOp => f.write_str("++"),
            Punct::DecOp => f.write_str("--"),
            Punct::LeftOp => f.write_str("<<"),
            Punct::RightOp => f.write_str(">>"),
            Punct::LeOp => f.write_str("<="),
            Punct::GeOp => f.write_str(">="),
            Punct::EqOp => f.write_str("=="),
            Punct::NeOp => f.write_str("!="),
            Punct::AndOp => f.write_str("&&"),
            Punct::OrOp => f.write_str("||"),
            Punct::XorOp => f.write_str("^^"),
            Punct::AddAssign => f.write_str("+="),
            Punct::SubAssign => f.write_str("-="),
            Punct::MulAssign => f.write_str("*="),
            Punct::DivAssign => f.write_str("/="),
            Punct::ModAssign => f.write_str("%="),
            Punct::AndAssign => f.write_str("&="),
            Punct::OrAssign => f.write_str("|="),
            Punct::XorAssign => f.write_str("^="),
            Punct::LeftAssign => f.write_str("<<="),
            Punct::RightAssign => f.write_str(">>="),
        }
    }
}

// ============================================================================
// Token Payload
// ============================================================================

/// The tagged payload of a token.
///
/// `Space` and `Marker` never reach the downstream parser: `Space` is the
/// interior whitespace marker recorded inside macro bodies (it preserves
/// "was there whitespace here" across redefinition comparison and rescan),
/// and `Marker` is the sentinel bounding a macro-argument prescan.
#[derive(Debug, Clone, PartialEq)]
pub enum Tok {
    EndOfInput,
    Newline,
    Punct(Punct),
    Ident(Atom),
    Int {
        value: u32,
        text: String,
        unsigned: bool,
    },
    Float {
        value: f64,
        text: String,
        double: bool,
    },
    Str(Atom),
    Space,
    Marker,
}

/// A scanned token: payload, origin, and whether whitespace preceded it.
#[derive(Debug, Clone)]
pub struct Token {
    pub tok: Tok,
    pub loc: SourceLoc,
    pub space: bool,
}

impl Token {
    pub fn new(tok: Tok, loc: SourceLoc, space: bool) -> Self {
        Self { tok, loc, space }
    }

    pub fn is_newline(&self) -> bool {
        self.tok == Tok::Newline
    }

    pub fn is_end(&self) -> bool {
        self.tok == Tok::EndOfInput
    }

    /// True for newline or end-of-input, the two line terminators a
    /// directive handler stops at.
    pub fn ends_line(&self) -> bool {
        matches!(self.tok, Tok::Newline | Tok::EndOfInput)
    }

    pub fn is_punct(&self, p: Punct) -> bool {
        self.tok == Tok::Punct(p)
    }

    pub fn is_char(&self, c: u8) -> bool {
        self.tok == Tok::Punct(Punct::Char(c))
    }

    pub fn ident(&self) -> Option<Atom> {
        match self.tok {
            Tok::Ident(atom) => Some(atom),
            _ => None,
        }
    }
}

// ============================================================================
// Recorded Token Stream
// ============================================================================

/// A recorded sequence of tokens: a macro body or a collected macro
/// argument. Rewindable by construction (readers keep their own cursor),
/// so one body can be replayed from several call sites.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    toks: Vec<Token>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, token: Token) {
        self.toks.push(token);
    }

    pub fn get(&self, pos: usize) -> Option<&Token> {
        self.toks.get(pos)
    }

    pub fn len(&self) -> usize {
        self.toks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.toks.iter()
    }

    /// Token-for-token equivalence, including interior space markers but
    /// ignoring source locations. This is the redefinition test: "same
    /// number, ordering, spelling, and white-space separation".
    pub fn same_tokens(&self, other: &TokenStream) -> bool {
        self.toks.len() == other.toks.len()
            && self
                .toks
                .iter()
                .zip(other.toks.iter())
                .all(|(a, b)| a.tok == b.tok)
    }
}
