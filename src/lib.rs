//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Macro preprocessor for GLSL-family shading languages.
//!
//! Runs ahead of a shading-language parser: expands object-like and
//! function-like macros, resolves `#if`/`#ifdef` conditional groups,
//! applies `#line` renumbering, and forwards `#version`, `#extension`,
//! `#pragma`, and `#error` to the embedding front end through the
//! [`PpCallbacks`] trait.
//!
//! Input is one or more source strings forming a single compilation
//! unit; output is the flattened stream of post-expansion token
//! spellings pulled one at a time from [`Preprocessor::tokenize`], or
//! all at once from [`preprocess`].
//!
//! ```
//! use glsl_pp::{preprocess, Options};
//!
//! let out = preprocess(&["#define N 4\nvec N v;"], Options::default()).unwrap();
//! assert_eq!(out, ["vec", "4", "v", ";"]);
//! ```

pub mod atom;
pub mod diag;
mod directive;
mod eval;
mod input;
mod macros;
mod scanner;
mod source;
pub mod token;

#[cfg(test)]
mod test_utils;

use std::collections::HashMap;

use atom::{Atom, AtomTable};
use input::Input;
use macros::MacroDef;
use source::SourceStrings;
use token::{Tok, Token};

pub use diag::{CollectingCallbacks, Diagnostic, PpCallbacks, Severity, SourceLoc};
pub use directive::MAX_IF_NESTING;
pub use macros::MAX_MACRO_ARGS;
pub use scanner::MAX_TOKEN_LENGTH;

// ============================================================================
// Dialect Configuration
// ============================================================================

/// Shading-language profile, as declared by `#version` in the source that
/// configured the embedding front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Desktop, no explicit profile (pre-1.50 style).
    #[default]
    None,
    Core,
    Compatibility,
    Es,
}

/// Dialect and policy configuration, fixed for the life of one
/// preprocessor instance.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Language version, e.g. `110`, `330`, `300` (with [`Profile::Es`]).
    pub version: i32,
    pub profile: Profile,
    /// Downgrade portability errors to warnings.
    pub relaxed_errors: bool,
    /// Treat any `#version` directive as an error (set by embedders that
    /// have already consumed the version line themselves).
    pub error_on_version: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            version: 110,
            profile: Profile::None,
            relaxed_errors: false,
            error_on_version: false,
        }
    }
}

impl Options {
    /// Desktop dialects before 3.30 apply `#line N` to the directive's
    /// own line, so the following line reports `N + 1`. ES and 3.30+
    /// dialects number the following line `N` directly.
    pub fn line_directive_numbers_own_line(&self) -> bool {
        self.profile != Profile::Es && self.version < 330
    }
}

// ============================================================================
// Directive and Builtin Name Tables
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Directive {
    Define,
    Undef,
    If,
    Ifdef,
    Ifndef,
    Elif,
    Else,
    Endif,
    Line,
    Error,
    Pragma,
    Version,
    Extension,
}

/// Atoms interned up front so directive dispatch and builtin-macro
/// recognition are integer comparisons.
#[derive(Debug)]
pub(crate) struct KnownAtoms {
    pub(crate) directives: HashMap<Atom, Directive>,
    pub(crate) defined: Atom,
    pub(crate) core: Atom,
    pub(crate) compatibility: Atom,
    pub(crate) es: Atom,
    pub(crate) line_macro: Atom,
    pub(crate) file_macro: Atom,
    pub(crate) version_macro: Atom,
}

impl KnownAtoms {
    fn new(atoms: &mut AtomTable) -> Self {
        let mut directives = HashMap::new();
        for (name, directive) in [
            ("define", Directive::Define),
            ("undef", Directive::Undef),
            ("if", Directive::If),
            ("ifdef", Directive::Ifdef),
            ("ifndef", Directive::Ifndef),
            ("elif", Directive::Elif),
            ("else", Directive::Else),
            ("endif", Directive::Endif),
            ("line", Directive::Line),
            ("error", Directive::Error),
            ("pragma", Directive::Pragma),
            ("version", Directive::Version),
            ("extension", Directive::Extension),
        ] {
            directives.insert(atoms.intern(name), directive);
        }
        Self {
            directives,
            defined: atoms.intern("defined"),
            core: atoms.intern("core"),
            compatibility: atoms.intern("compatibility"),
            es: atoms.intern("es"),
            line_macro: atoms.intern("__LINE__"),
            file_macro: atoms.intern("__FILE__"),
            version_macro: atoms.intern("__VERSION__"),
        }
    }

    pub(crate) fn is_builtin_macro(&self, atom: Atom) -> bool {
        atom == self.line_macro || atom == self.file_macro || atom == self.version_macro
    }
}

// ============================================================================
// Preprocessor Instance
// ============================================================================

/// One compilation unit's preprocessor. Owns the macro table, atom
/// table, conditional-nesting state, and the token input stack; borrows
/// the source strings and the embedder's callback sink.
pub struct Preprocessor<'a> {
    pub(crate) options: Options,
    pub(crate) atoms: AtomTable,
    pub(crate) known: KnownAtoms,
    pub(crate) src: SourceStrings<'a>,
    pub(crate) macros: HashMap<Atom, MacroDef>,
    pub(crate) inputs: Vec<Input>,
    pub(crate) ungot: Option<Token>,
    /// One entry per open conditional group: has this group seen its
    /// `#else` yet? Depth is the stack length.
    pub(crate) else_seen: Vec<bool>,
    pub(crate) version_seen: bool,
    /// Last token delivered, for the "`#` must start a line" check.
    pub(crate) previous_token: Tok,
    pub(crate) callbacks: &'a mut dyn PpCallbacks,
}

impl<'a> Preprocessor<'a> {
    pub fn new(
        sources: &'a [&'a str],
        options: Options,
        callbacks: &'a mut dyn PpCallbacks,
    ) -> Self {
        let mut atoms = AtomTable::new();
        let known = KnownAtoms::new(&mut atoms);
        Self {
            options,
            atoms,
            known,
            src: SourceStrings::new(sources),
            macros: HashMap::new(),
            inputs: Vec::new(),
            ungot: None,
            else_seen: Vec::new(),
            version_seen: false,
            previous_token: Tok::Newline,
            callbacks,
        }
    }

    pub(crate) fn error(&mut self, loc: SourceLoc, message: &str, label: &str, context: &str) {
        self.callbacks.report(Diagnostic {
            severity: Severity::Error,
            loc,
            message: message.to_string(),
            label: label.to_string(),
            context: context.to_string(),
        });
    }

    pub(crate) fn warn(&mut self, loc: SourceLoc, message: &str, label: &str, context: &str) {
        self.callbacks.report(Diagnostic {
            severity: Severity::Warning,
            loc,
            message: message.to_string(),
            label: label.to_string(),
            context: context.to_string(),
        });
    }

    /// Reject `#define`/`#undef` of names the embedder reserves.
    pub(crate) fn reserved_pp_check(&mut self, loc: SourceLoc, atom: Atom, label: &str) {
        let name = self.atoms.spelling(atom).to_string();
        if let Some(message) = self.callbacks.reserved_name(&name) {
            self.error(loc, message, label, &name);
        }
    }

    /// Is the token source on top of the input stack a macro body?
    pub(crate) fn in_macro_input(&self) -> bool {
        matches!(self.inputs.last(), Some(Input::Macro(_)))
    }

    /// Where the character scanner currently is, after any `#line`
    /// remapping. This is the location diagnostics for the next raw
    /// token would carry.
    pub fn current_loc(&self) -> SourceLoc {
        self.src.loc()
    }
}

// ============================================================================
// One-shot Convenience API
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("preprocessing failed with {} diagnostic(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),
}

/// Preprocess a whole compilation unit, collecting the output spellings.
/// Any error diagnostic fails the unit; the returned [`Error`] carries
/// every diagnostic (warnings included) for reporting.
pub fn preprocess(sources: &[&str], options: Options) -> Result<Vec<String>, Error> {
    let mut sink = CollectingCallbacks::default();
    let mut pp = Preprocessor::new(sources, options, &mut sink);
    let mut out = Vec::new();
    while let Some(spelling) = pp.tokenize() {
        out.push(spelling);
    }
    drop(pp);
    if sink.has_errors() {
        Err(Error::Diagnostics(sink.diagnostics))
    } else {
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_collects_spellings() {
        let out = preprocess(&["#define PI 3.14159\nfloat p = PI;"], Options::default()).unwrap();
        assert_eq!(out, ["float", "p", "=", "3.14159", ";"]);
    }

    #[test]
    fn preprocess_surfaces_diagnostics() {
        let err = preprocess(&["#error boom\n"], Options::default()).unwrap_err();
        let Error::Diagnostics(diags) = err;
        assert!(diags.iter().any(|d| d.message == "boom"));
    }

    #[test]
    fn line_directive_dialect_predicate() {
        let mut opts = Options::default();
        assert!(opts.line_directive_numbers_own_line());
        opts.version = 330;
        assert!(!opts.line_directive_numbers_own_line());
        opts = Options {
            version: 300,
            profile: Profile::Es,
            ..Options::default()
        };
        assert!(!opts.line_directive_numbers_own_line());
    }

    #[test]
    fn is_defined_tracks_table_state() {
        let mut sink = CollectingCallbacks::default();
        let sources = ["#define A 1\n#undef A\n#define B 2\nx"];
        let mut pp = Preprocessor::new(&sources, Options::default(), &mut sink);
        while pp.tokenize().is_some() {}
        assert!(!pp.is_defined("A"));
        assert!(pp.is_defined("B"));
        assert!(!pp.is_defined("NEVER"));
    }
}
