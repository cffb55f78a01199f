//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Character-level token scanner and the public tokenize() loop
//

use log::trace;

use crate::diag::SourceLoc;
use crate::macros::Expansion;
use crate::token::{Punct, Tok, Token};
use crate::{Preprocessor, Profile};

/// Identifiers and literals longer than this are truncated (with one
/// diagnostic) while the remainder is still consumed.
pub const MAX_TOKEN_LENGTH: usize = 1024;

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn is_hex_digit(c: u8) -> bool {
    c.is_ascii_hexdigit()
}

fn hex_value(c: u8) -> u32 {
    match c {
        b'0'..=b'9' => (c - b'0') as u32,
        b'A'..=b'F' => (c - b'A' + 10) as u32,
        _ => (c - b'a' + 10) as u32,
    }
}

/// Does this character turn an in-progress integer literal into a float?
fn starts_float_suffix(c: u8) -> bool {
    matches!(c, b'.' | b'e' | b'E' | b'f' | b'F' | b'l' | b'L')
}

impl Preprocessor<'_> {
    /// Scan one raw token from the character source. Records whether
    /// whitespace (or a comment) preceded it and advances the current
    /// location.
    pub(crate) fn lex_token(&mut self) -> Token {
        let mut space = false;
        let mut ch = self.src.get();
        loop {
            while matches!(ch, Some(b' ') | Some(b'\t')) {
                space = true;
                ch = self.src.get();
            }
            let loc = self.src.loc();
            let Some(c) = ch else {
                return Token::new(Tok::EndOfInput, loc, space);
            };
            match c {
                b'\n' => return Token::new(Tok::Newline, loc, space),

                b'A'..=b'Z' | b'a'..=b'z' | b'_' => return self.lex_identifier(c, loc, space),
                b'0' => return self.lex_zero_prefixed(loc, space),
                b'1'..=b'9' => return self.lex_decimal(c, loc, space),

                b'-' => {
                    let p = match self.src.get() {
                        Some(b'-') => Punct::DecOp,
                        Some(b'=') => Punct::SubAssign,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'-')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'+' => {
                    let p = match self.src.get() {
                        Some(b'+') => Punct::IncOp,
                        Some(b'=') => Punct::AddAssign,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'+')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'*' => {
                    let p = match self.src.get() {
                        Some(b'=') => Punct::MulAssign,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'*')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'%' => {
                    let p = match self.src.get() {
                        Some(b'=') => Punct::ModAssign,
                        Some(b'>') => Punct::Char(b'}'),
                        _ => {
                            self.src.unget();
                            Punct::Char(b'%')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b':' => {
                    let p = match self.src.get() {
                        Some(b'>') => Punct::Char(b']'),
                        _ => {
                            self.src.unget();
                            Punct::Char(b':')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'^' => {
                    let p = match self.src.get() {
                        Some(b'^') => Punct::XorOp,
                        Some(b'=') => Punct::XorAssign,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'^')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'=' => {
                    let p = match self.src.get() {
                        Some(b'=') => Punct::EqOp,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'=')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'!' => {
                    let p = match self.src.get() {
                        Some(b'=') => Punct::NeOp,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'!')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'|' => {
                    let p = match self.src.get() {
                        Some(b'|') => Punct::OrOp,
                        Some(b'=') => Punct::OrAssign,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'|')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'&' => {
                    let p = match self.src.get() {
                        Some(b'&') => Punct::AndOp,
                        Some(b'=') => Punct::AndAssign,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'&')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'<' => {
                    let p = match self.src.get() {
                        Some(b'<') => match self.src.get() {
                            Some(b'=') => Punct::LeftAssign,
                            _ => {
                                self.src.unget();
                                Punct::LeftOp
                            }
                        },
                        Some(b'=') => Punct::LeOp,
                        Some(b'%') => Punct::Char(b'{'),
                        Some(b':') => Punct::Char(b'['),
                        _ => {
                            self.src.unget();
                            Punct::Char(b'<')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'>' => {
                    let p = match self.src.get() {
                        Some(b'>') => match self.src.get() {
                            Some(b'=') => Punct::RightAssign,
                            _ => {
                                self.src.unget();
                                Punct::RightOp
                            }
                        },
                        Some(b'=') => Punct::GeOp,
                        _ => {
                            self.src.unget();
                            Punct::Char(b'>')
                        }
                    };
                    return Token::new(Tok::Punct(p), loc, space);
                }
                b'.' => {
                    match self.src.get() {
                        Some(d) if d.is_ascii_digit() => {
                            self.src.unget();
                            return self.lex_float(String::new(), Some(b'.'), loc, space);
                        }
                        _ => {
                            self.src.unget();
                            return Token::new(Tok::Punct(Punct::Char(b'.')), loc, space);
                        }
                    };
                }
                b'/' => {
                    match self.src.get() {
                        Some(b'/') => {
                            // line comment: consumed entirely, the ending
                            // newline becomes the token, marked as spaced
                            loop {
                                match self.src.get() {
                                    None => return Token::new(Tok::EndOfInput, loc, true),
                                    Some(b'\n') => {
                                        return Token::new(Tok::Newline, self.src.loc(), true)
                                    }
                                    Some(_) => {}
                                }
                            }
                        }
                        Some(b'*') => {
                            let mut c2 = self.src.get();
                            loop {
                                while c2 != Some(b'*') {
                                    if c2.is_none() {
                                        self.error(loc, "EOF in comment", "comment", "");
                                        return Token::new(Tok::EndOfInput, loc, space);
                                    }
                                    c2 = self.src.get();
                                }
                                c2 = self.src.get();
                                if c2.is_none() {
                                    self.error(loc, "EOF in comment", "comment", "");
                                    return Token::new(Tok::EndOfInput, loc, space);
                                }
                                if c2 == Some(b'/') {
                                    break;
                                }
                            }
                            space = true;
                            ch = self.src.get();
                            continue;
                        }
                        Some(b'=') => return Token::new(Tok::Punct(Punct::DivAssign), loc, space),
                        _ => {
                            self.src.unget();
                            return Token::new(Tok::Punct(Punct::Char(b'/')), loc, space);
                        }
                    }
                }
                b'"' => return self.lex_string(loc, space),

                // any other character is its own single-character token,
                // including '#' and a lone '\' (continuations were elided
                // by the character source)
                _ => return Token::new(Tok::Punct(Punct::Char(c)), loc, space),
            }
        }
    }

    fn lex_identifier(&mut self, first: u8, loc: SourceLoc, space: bool) -> Token {
        let mut text = String::new();
        let mut complained = false;
        let mut c = first;
        loop {
            if text.len() < MAX_TOKEN_LENGTH {
                text.push(c as char);
            } else if !complained {
                self.error(loc, "name too long", "", "");
                complained = true;
            }
            match self.src.get() {
                Some(n) if is_ident_char(n) => c = n,
                _ => break,
            }
        }
        self.src.unget();
        let atom = self.atoms.intern(&text);
        Token::new(Tok::Ident(atom), loc, space)
    }

    /// Literal starting with `0`: hexadecimal, octal, or (once a `.`/`e`/
    /// suffix shows up) a float after all. The octal-digit-too-large error
    /// is deferred until the token is known not to be a float.
    fn lex_zero_prefixed(&mut self, loc: SourceLoc, space: bool) -> Token {
        let mut text = String::from("0");
        let mut complained = false;
        let mut ch = self.src.get();

        if let Some(x @ (b'x' | b'X')) = ch {
            text.push(x as char);
            ch = self.src.get();
            let mut value: u32 = 0;
            match ch {
                Some(c) if is_hex_digit(c) => {
                    while let Some(c) = ch.filter(|&c| is_hex_digit(c)) {
                        if value <= 0x0fff_ffff {
                            text.push(c as char);
                            value = (value << 4) | hex_value(c);
                        } else {
                            if !complained {
                                self.error(loc, "hexadecimal literal too big", "", "");
                                complained = true;
                            }
                            value = 0xffff_ffff;
                        }
                        ch = self.src.get();
                    }
                }
                _ => self.error(loc, "bad digit in hexadecimal literal", "", ""),
            }
            let unsigned = self.lex_uint_suffix(ch, &mut text);
            return Token::new(
                Tok::Int {
                    value,
                    text,
                    unsigned,
                },
                loc,
                space,
            );
        }

        // speculatively octal until it must be a float
        let mut value: u32 = 0;
        let mut octal_overflow = false;
        let mut non_octal = false;
        while let Some(c) = ch.filter(|c| (b'0'..=b'7').contains(c)) {
            if text.len() < MAX_TOKEN_LENGTH {
                text.push(c as char);
            } else if !complained {
                self.error(loc, "numeric literal too long", "", "");
                complained = true;
            }
            if value <= 0x1fff_ffff {
                value = (value << 3) | (c - b'0') as u32;
            } else {
                octal_overflow = true;
            }
            ch = self.src.get();
        }
        if matches!(ch, Some(b'8') | Some(b'9')) {
            non_octal = true;
            while let Some(c) = ch.filter(u8::is_ascii_digit) {
                if text.len() < MAX_TOKEN_LENGTH {
                    text.push(c as char);
                } else if !complained {
                    self.error(loc, "numeric literal too long", "", "");
                    complained = true;
                }
                ch = self.src.get();
            }
        }
        if ch.map(starts_float_suffix) == Some(true) {
            return self.lex_float(text, ch, loc, space);
        }

        // wasn't a float, so must be octal
        if non_octal {
            self.error(loc, "octal literal digit too large", "", "");
        }
        let unsigned = self.lex_uint_suffix(ch, &mut text);
        if octal_overflow {
            self.error(loc, "octal literal too big", "", "");
        }
        Token::new(
            Tok::Int {
                value,
                text,
                unsigned,
            },
            loc,
            space,
        )
    }

    /// Literal starting with `1`-`9`: decimal integer or float.
    fn lex_decimal(&mut self, first: u8, loc: SourceLoc, space: bool) -> Token {
        let mut text = String::new();
        let mut complained = false;
        let mut c = first;
        let mut ch;
        loop {
            if text.len() < MAX_TOKEN_LENGTH {
                text.push(c as char);
            } else if !complained {
                self.error(loc, "numeric literal too long", "", "");
                complained = true;
            }
            ch = self.src.get();
            match ch {
                Some(n) if n.is_ascii_digit() => c = n,
                _ => break,
            }
        }
        if ch.map(starts_float_suffix) == Some(true) {
            return self.lex_float(text, ch, loc, space);
        }

        let digits = text.len();
        let unsigned = self.lex_uint_suffix(ch, &mut text);
        let mut value: u32 = 0;
        for &b in &text.as_bytes()[..digits] {
            let d = (b - b'0') as u32;
            if value > u32::MAX / 10 || (value == u32::MAX / 10 && d > u32::MAX % 10) {
                self.error(loc, "numeric literal too big", "", "");
                value = u32::MAX;
                break;
            }
            value = value * 10 + d;
        }
        Token::new(
            Tok::Int {
                value,
                text,
                unsigned,
            },
            loc,
            space,
        )
    }

    /// Consume an optional `u`/`U` suffix; otherwise push the lookahead
    /// character back.
    fn lex_uint_suffix(&mut self, ch: Option<u8>, text: &mut String) -> bool {
        match ch {
            Some(c @ (b'u' | b'U')) => {
                if text.len() < MAX_TOKEN_LENGTH {
                    text.push(c as char);
                }
                true
            }
            _ => {
                self.src.unget();
                false
            }
        }
    }

    /// Scan the rest of a float or double constant. `text` holds the
    /// digits consumed so far; `ch` is the character that revealed this is
    /// a float (`.`, exponent, or suffix).
    fn lex_float(
        &mut self,
        mut text: String,
        mut ch: Option<u8>,
        loc: SourceLoc,
        space: bool,
    ) -> Token {
        let mut has_decimal_or_exponent = false;
        let mut is_double = false;
        let mut complained = false;

        if ch == Some(b'.') {
            has_decimal_or_exponent = true;
            text.push('.');
            ch = self.src.get();
            while let Some(c) = ch.filter(u8::is_ascii_digit) {
                if text.len() < MAX_TOKEN_LENGTH {
                    text.push(c as char);
                } else if !complained {
                    self.error(loc, "float literal too long", "", "");
                    complained = true;
                }
                ch = self.src.get();
            }
        }

        if let Some(e @ (b'e' | b'E')) = ch {
            has_decimal_or_exponent = true;
            if text.len() >= MAX_TOKEN_LENGTH {
                if !complained {
                    self.error(loc, "float literal too long", "", "");
                    complained = true;
                }
            } else {
                text.push(e as char);
                ch = self.src.get();
                if let Some(sign @ (b'+' | b'-')) = ch {
                    text.push(sign as char);
                    ch = self.src.get();
                }
                if ch.map(|c| c.is_ascii_digit()) == Some(true) {
                    while let Some(c) = ch.filter(u8::is_ascii_digit) {
                        if text.len() < MAX_TOKEN_LENGTH {
                            text.push(c as char);
                        } else if !complained {
                            self.error(loc, "float literal too long", "", "");
                            complained = true;
                        }
                        ch = self.src.get();
                    }
                } else {
                    self.error(loc, "bad character in float exponent", "", "");
                }
            }
        }

        let digits = text.len();
        match ch {
            Some(l @ (b'l' | b'L')) => match self.src.get() {
                Some(f @ (b'f' | b'F')) => {
                    self.double_suffix_check(loc);
                    if !has_decimal_or_exponent {
                        self.error(loc, "float literal needs a decimal point or exponent", "", "");
                    }
                    text.push(l as char);
                    text.push(f as char);
                    is_double = true;
                }
                _ => {
                    // not the lf double suffix after all; both characters
                    // go back and the literal ends here
                    self.src.unget();
                    self.src.unget();
                }
            },
            Some(f @ (b'f' | b'F')) => {
                self.float_suffix_check(loc);
                if !has_decimal_or_exponent {
                    self.error(loc, "float literal needs a decimal point or exponent", "", "");
                }
                if text.len() < MAX_TOKEN_LENGTH {
                    text.push(f as char);
                }
            }
            _ => self.src.unget(),
        }

        let value: f64 = text[..digits].parse().unwrap_or(0.0);
        Token::new(
            Tok::Float {
                value,
                text,
                double: is_double,
            },
            loc,
            space,
        )
    }

    fn lex_string(&mut self, loc: SourceLoc, space: bool) -> Token {
        let mut text = String::new();
        let mut ch = self.src.get();
        loop {
            match ch {
                Some(b'"') | Some(b'\n') | None => break,
                Some(c) => {
                    if text.len() >= MAX_TOKEN_LENGTH {
                        break;
                    }
                    text.push(c as char);
                    ch = self.src.get();
                }
            }
        }
        let atom = self.atoms.intern(&text);
        if ch != Some(b'"') {
            self.error(loc, "end of line in string", "string", "");
            if ch == Some(b'\n') {
                // leave the newline for the caller so line structure holds
                self.src.unget();
            }
        }
        Token::new(Tok::Str(atom), loc, space)
    }

    /// The lone `f`/`F` suffix is only valid from ES 300 / desktop 120 on.
    fn float_suffix_check(&mut self, loc: SourceLoc) {
        if self.options.profile == Profile::Es && self.options.version < 300 {
            self.error(loc, "floating-point suffix not supported in this version", "", "");
        } else if self.options.profile != Profile::Es
            && self.options.version < 120
            && !self.options.relaxed_errors
        {
            self.error(loc, "floating-point suffix not supported in this version", "", "");
        }
    }

    /// The `lf`/`LF` double suffix needs a dialect with doubles.
    fn double_suffix_check(&mut self, loc: SourceLoc) {
        if self.options.profile == Profile::Es || self.options.version < 400 {
            self.error(loc, "double floating-point suffix not supported in this version", "", "");
        }
    }

    // ========================================================================
    // Top-level entry
    // ========================================================================

    /// Pull the next post-expansion, directive-free token and return its
    /// literal spelling. Returns `None` at true end of input, after
    /// checking for unbalanced `#if` groups.
    pub fn tokenize(&mut self) -> Option<String> {
        loop {
            let token = self.scan_token();
            if token.is_end() {
                self.missing_endif_check();
                return None;
            }
            if token.is_char(b'#') {
                if self.previous_token == Tok::Newline {
                    let last = self.read_directive_line();
                    if last.is_end() {
                        self.missing_endif_check();
                        return None;
                    }
                    continue;
                }
                self.error(
                    token.loc,
                    "preprocessor directive cannot be preceded by another token",
                    "#",
                    "",
                );
                return None;
            }
            self.previous_token = token.tok.clone();

            if token.is_newline() {
                continue;
            }

            if let Some(atom) = token.ident() {
                match self.macro_expand(atom, token.loc, false, true) {
                    Expansion::NotExpanded => {}
                    // the error was reported; resume at the next raw token
                    Expansion::Error => continue,
                    Expansion::Expanded | Expansion::ExpandedAsZero => continue,
                }
            }

            match token.tok {
                Tok::Ident(atom) => return Some(self.atoms.spelling(atom).to_string()),
                Tok::Int { text, .. } | Tok::Float { text, .. } => return Some(text),
                Tok::Str(_) => {
                    self.error(token.loc, "string literals not supported", "\"\"", "");
                }
                Tok::Punct(Punct::Char(b'\'')) => {
                    self.error(token.loc, "character literals not supported", "'", "");
                }
                Tok::Punct(p) => return Some(p.to_string()),
                Tok::Space | Tok::Marker => {
                    trace!("stream-internal token escaped to tokenize, dropped");
                }
                Tok::Newline | Tok::EndOfInput => unreachable!(),
            }
        }
    }

    /// Literal spelling of a token, for `#error`/`#pragma` reconstruction.
    /// Line terminators have none.
    pub(crate) fn token_spelling(&self, token: &Token) -> Option<String> {
        match &token.tok {
            Tok::Ident(atom) | Tok::Str(atom) => Some(self.atoms.spelling(*atom).to_string()),
            Tok::Int { text, .. } | Tok::Float { text, .. } => Some(text.clone()),
            Tok::Punct(p) => Some(p.to_string()),
            Tok::Newline | Tok::EndOfInput | Tok::Space | Tok::Marker => None,
        }
    }

    pub(crate) fn missing_endif_check(&mut self) {
        if !self.else_seen.is_empty() {
            let loc = self.src.loc();
            self.error(loc, "missing #endif", "", "");
            self.else_seen.clear();
        }
    }
}
