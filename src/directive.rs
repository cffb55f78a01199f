//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Directive dispatch: #define #undef #if #ifdef #ifndef #elif #else #endif
// #line #error #pragma #version #extension
//

use std::rc::Rc;

use log::debug;

use crate::atom::Atom;
use crate::diag::SourceLoc;
use crate::eval::Prec;
use crate::macros::{MacroDef, MAX_MACRO_ARGS};
use crate::token::{Tok, Token, TokenStream};
use crate::{Directive, Preprocessor};

/// `#if` groups nested beyond this are rejected at push time.
pub const MAX_IF_NESTING: usize = 64;

/// What the skip routine is looking for when a branch is not taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SkipTarget {
    /// A failed `#if`/`#ifdef` condition: the next same-depth `#else`,
    /// `#elif` (re-evaluated on arrival), or `#endif` ends the skip.
    ElseOrEndif,
    /// A taken branch ended at `#else`/`#elif`: only the matching
    /// `#endif` ends the skip.
    Endif,
}

impl Preprocessor<'_> {
    /// Handle one directive line. The leading `#` has been consumed; on
    /// return the line's terminator (newline or end of input) has been
    /// consumed too, and is returned for the caller's end-of-input check.
    pub(crate) fn read_directive_line(&mut self) -> Token {
        let mut token = self.scan_token();
        let directive = token
            .ident()
            .and_then(|a| self.known.directives.get(&a).copied());
        match directive {
            Some(Directive::Define) => token = self.cpp_define(),
            Some(Directive::Undef) => token = self.cpp_undef(),
            Some(Directive::If) => token = self.cpp_if(token.loc),
            Some(Directive::Ifdef) => token = self.cpp_ifdef(true),
            Some(Directive::Ifndef) => token = self.cpp_ifdef(false),
            Some(Directive::Elif) => token = self.cpp_elif(token.loc),
            Some(Directive::Else) => token = self.cpp_else(token.loc),
            Some(Directive::Endif) => token = self.cpp_endif(token.loc),
            Some(Directive::Line) => token = self.cpp_line(token.loc),
            Some(Directive::Error) => token = self.cpp_error(token.loc),
            Some(Directive::Pragma) => token = self.cpp_pragma(token.loc),
            Some(Directive::Version) => token = self.cpp_version(token.loc),
            Some(Directive::Extension) => token = self.cpp_extension(token.loc),
            None => match &token.tok {
                // a bare '#' line is legal and ignored
                Tok::Newline | Tok::EndOfInput => {}
                Tok::Ident(atom) => {
                    let name = self.atoms.spelling(*atom).to_string();
                    self.error(token.loc, "invalid directive:", "#", &name);
                }
                _ => self.error(token.loc, "invalid directive", "#", ""),
            },
        }
        while !token.ends_line() {
            token = self.scan_token();
        }
        token
    }

    /// Trailing tokens on a directive line: a warning in relaxed mode,
    /// otherwise an error. Either way the rest of the line is consumed.
    pub(crate) fn extra_token_check(&mut self, label: &str, mut token: Token) -> Token {
        if !token.ends_line() {
            if self.options.relaxed_errors {
                self.warn(token.loc, "unexpected tokens following directive", label, "");
            } else {
                self.error(token.loc, "unexpected tokens following directive", label, "");
            }
            while !token.ends_line() {
                token = self.scan_token();
            }
        }
        token
    }

    // ========================================================================
    // Macro definition directives
    // ========================================================================

    fn cpp_define(&mut self) -> Token {
        let mut token = self.scan_token();
        let Some(atom) = token.ident() else {
            self.error(token.loc, "must be followed by macro name", "#define", "");
            return token;
        };
        let define_loc = token.loc;
        if atom == self.known.defined {
            self.error(token.loc, "\"defined\" cannot be (un)defined", "#define", "");
            return token;
        }
        self.reserved_pp_check(token.loc, atom, "#define");

        let mut function_like = false;
        let mut params: Vec<Atom> = Vec::new();
        token = self.scan_token();
        // a '(' only introduces parameters when it hugs the name
        if token.is_char(b'(') && !token.space {
            function_like = true;
            loop {
                token = self.scan_token();
                if params.is_empty() && token.is_char(b')') {
                    break;
                }
                let Some(param) = token.ident() else {
                    self.error(token.loc, "bad argument", "#define", "");
                    return token;
                };
                if params.contains(&param) {
                    self.error(token.loc, "duplicate macro parameter", "#define", "");
                } else if params.len() >= MAX_MACRO_ARGS {
                    self.error(token.loc, "too many macro parameters", "#define", "");
                } else {
                    params.push(param);
                }
                token = self.scan_token();
                if !token.is_char(b',') {
                    break;
                }
            }
            if !token.is_char(b')') {
                self.error(token.loc, "missing parenthesis", "#define", "");
                return token;
            }
            token = self.scan_token();
        }

        // record the replacement list, with interior whitespace markers so
        // redefinition comparison sees "was there a separation here"
        let mut body = TokenStream::new();
        while !token.ends_line() {
            body.record(token.clone());
            token = self.scan_token();
            if !token.ends_line() && token.space {
                body.record(Token::new(Tok::Space, token.loc, false));
            }
        }

        let name = self.atoms.spelling(atom).to_string();
        let conflict = match self.macros.get(&atom) {
            Some(existing) if !existing.undefined => {
                if existing.function_like != function_like
                    || existing.params.len() != params.len()
                {
                    Some("macro redefined; different number of arguments:")
                } else if existing.params != params {
                    Some("macro redefined; different argument names:")
                } else if !existing.body.same_tokens(&body) {
                    Some("macro redefined; different substitutions:")
                } else {
                    None
                }
            }
            _ => None,
        };
        if let Some(message) = conflict {
            self.error(define_loc, message, "#define", &name);
        }
        debug!("#define {} with {} parameter(s)", name, params.len());
        self.macros.insert(
            atom,
            MacroDef {
                params,
                function_like,
                body: Rc::new(body),
                undefined: false,
                busy: false,
            },
        );
        token
    }

    fn cpp_undef(&mut self) -> Token {
        let token = self.scan_token();
        let Some(atom) = token.ident() else {
            self.error(token.loc, "must be followed by macro name", "#undef", "");
            return token;
        };
        if atom == self.known.defined {
            self.error(token.loc, "\"defined\" cannot be (un)defined", "#undef", "");
            return token;
        }
        self.reserved_pp_check(token.loc, atom, "#undef");
        if let Some(def) = self.macros.get_mut(&atom) {
            def.undefined = true;
        }
        let token = self.scan_token();
        if !token.ends_line() {
            self.error(
                token.loc,
                "can only be followed by a single macro name",
                "#undef",
                "",
            );
        }
        token
    }

    // ========================================================================
    // Conditional directives
    // ========================================================================

    pub(crate) fn cpp_if(&mut self, loc: SourceLoc) -> Token {
        let mut token = self.scan_token();
        if self.else_seen.len() >= MAX_IF_NESTING {
            self.error(loc, "maximum nesting depth exceeded", "#if", "");
            return Token::new(Tok::EndOfInput, loc, false);
        }
        self.else_seen.push(false);
        let mut res: i32 = 0;
        let mut err = false;
        token = self.eval(token, Prec::Min, false, &mut res, &mut err);
        token = self.extra_token_check("#if", token);
        // only a cleanly false condition skips; an errored one has already
        // been reported and its branch stays live
        if res == 0 && !err {
            token = self.skip_conditional(SkipTarget::ElseOrEndif);
        }
        token
    }

    fn cpp_ifdef(&mut self, defined: bool) -> Token {
        let label = if defined { "#ifdef" } else { "#ifndef" };
        let mut token = self.scan_token();
        if self.else_seen.len() >= MAX_IF_NESTING {
            self.error(token.loc, "maximum nesting depth exceeded", label, "");
            return Token::new(Tok::EndOfInput, token.loc, false);
        }
        self.else_seen.push(false);
        let Some(atom) = token.ident() else {
            self.error(token.loc, "must be followed by macro name", label, "");
            return token;
        };
        let live = self.macros.get(&atom).map_or(false, |d| !d.undefined);
        token = self.scan_token();
        token = self.extra_token_check(label, token);
        if live != defined {
            token = self.skip_conditional(SkipTarget::ElseOrEndif);
        }
        token
    }

    /// `#elif` reached while its group's earlier branch was taken: the
    /// condition is dead and is consumed without evaluation, then the
    /// rest of the group is skipped.
    fn cpp_elif(&mut self, loc: SourceLoc) -> Token {
        if self.else_seen.is_empty() {
            self.error(loc, "mismatched statements", "#elif", "");
            return self.scan_token();
        }
        if self.else_seen.last() == Some(&true) {
            self.error(loc, "#elif after #else", "#elif", "");
        }
        let mut token = self.scan_token();
        while !token.ends_line() {
            token = self.scan_token();
        }
        if token.is_end() {
            return token;
        }
        self.skip_conditional(SkipTarget::Endif)
    }

    fn cpp_else(&mut self, loc: SourceLoc) -> Token {
        if self.else_seen.is_empty() {
            self.error(loc, "mismatched statements", "#else", "");
            return self.scan_token();
        }
        if self.else_seen.last() == Some(&true) {
            self.error(loc, "#else after #else", "#else", "");
        }
        if let Some(last) = self.else_seen.last_mut() {
            *last = true;
        }
        let next = self.scan_token();
        let token = self.extra_token_check("#else", next);
        if token.is_end() {
            return token;
        }
        self.skip_conditional(SkipTarget::Endif)
    }

    fn cpp_endif(&mut self, loc: SourceLoc) -> Token {
        if self.else_seen.pop().is_none() {
            self.error(loc, "mismatched statements", "#endif", "");
        }
        let next = self.scan_token();
        self.extra_token_check("#endif", next)
    }

    /// Skip lines until the directive that resumes processing for this
    /// group. Tracks nested groups opened inside the skipped region;
    /// macro expansion is off throughout. A same-depth `#elif` met while
    /// looking for `ElseOrEndif` re-enters condition evaluation, so each
    /// `#elif` reached in document order is evaluated exactly once.
    pub(crate) fn skip_conditional(&mut self, target: SkipTarget) -> Token {
        let mut depth = 0usize;
        let mut token = self.scan_token();
        loop {
            if token.is_end() {
                return token;
            }
            if !token.is_char(b'#') {
                // not a directive line: drain it unexamined
                while !token.ends_line() {
                    token = self.scan_token();
                }
                if token.is_end() {
                    return token;
                }
                token = self.scan_token();
                continue;
            }
            token = self.scan_token();
            let Some(directive) = token
                .ident()
                .and_then(|a| self.known.directives.get(&a).copied())
            else {
                continue;
            };
            match directive {
                Directive::If | Directive::Ifdef | Directive::Ifndef => {
                    depth += 1;
                    if self.else_seen.len() >= MAX_IF_NESTING {
                        self.error(token.loc, "maximum nesting depth exceeded", "#if", "");
                        return Token::new(Tok::EndOfInput, token.loc, false);
                    }
                    self.else_seen.push(false);
                }
                Directive::Endif => {
                    let next = self.scan_token();
                    token = self.extra_token_check("#endif", next);
                    self.else_seen.pop();
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Directive::Else if target == SkipTarget::ElseOrEndif && depth == 0 => {
                    if let Some(last) = self.else_seen.last_mut() {
                        *last = true;
                    }
                    let next = self.scan_token();
                    token = self.extra_token_check("#else", next);
                    break;
                }
                Directive::Elif if target == SkipTarget::ElseOrEndif && depth == 0 => {
                    if self.else_seen.last() == Some(&true) {
                        self.error(token.loc, "#elif after #else", "#elif", "");
                    }
                    // re-entering condition evaluation re-pushes the group
                    self.else_seen.pop();
                    return self.cpp_if(token.loc);
                }
                Directive::Else => {
                    if self.else_seen.last() == Some(&true) {
                        self.error(token.loc, "#else after #else", "#else", "");
                    } else if let Some(last) = self.else_seen.last_mut() {
                        *last = true;
                    }
                }
                Directive::Elif => {
                    if self.else_seen.last() == Some(&true) {
                        self.error(token.loc, "#elif after #else", "#elif", "");
                    }
                }
                // other directives are inert inside a skipped region
                _ => {}
            }
        }
        token
    }

    // ========================================================================
    // Line control and collaborator-facing directives
    // ========================================================================

    fn cpp_line(&mut self, directive_loc: SourceLoc) -> Token {
        let mut token = self.scan_token();
        if token.is_newline() {
            self.error(directive_loc, "must be followed by an integer literal", "#line", "");
            return token;
        }

        let mut line_res: i32 = 0;
        let mut line_err = false;
        token = self.eval(token, Prec::Min, false, &mut line_res, &mut line_err);
        let literal_line = line_res;

        let mut file_res: i32 = 0;
        let mut file_err = false;
        let mut has_file = false;
        if !line_err {
            // the directive's own newline has already advanced the
            // physical line when it terminated the expression, so the
            // literal is adjusted before renumbering
            if token.is_newline() {
                line_res += 1;
            }
            if !self.options.line_directive_numbers_own_line() {
                line_res -= 1;
            }
            self.src.set_line(line_res);

            // the source-string field is a full constant expression too
            if !token.ends_line() {
                token = self.eval(token, Prec::Min, false, &mut file_res, &mut file_err);
                if !file_err {
                    self.src.set_string(file_res);
                    has_file = true;
                }
            }
        }
        if !line_err && !file_err {
            self.callbacks
                .notify_line_directive(literal_line, has_file, file_res);
            token = self.extra_token_check("#line", token);
        }
        token
    }

    fn cpp_error(&mut self, loc: SourceLoc) -> Token {
        let mut token = self.scan_token();
        let mut message = String::new();
        while !token.ends_line() {
            if let Some(spelling) = self.token_spelling(&token) {
                if !message.is_empty() {
                    message.push(' ');
                }
                message.push_str(&spelling);
            }
            token = self.scan_token();
        }
        self.callbacks.notify_error_directive(loc.line, &message);
        self.error(loc, &message, "#error", "");
        token
    }

    fn cpp_pragma(&mut self, loc: SourceLoc) -> Token {
        let mut tokens: Vec<String> = Vec::new();
        let mut token = self.scan_token();
        while !token.ends_line() {
            if let Some(spelling) = self.token_spelling(&token) {
                tokens.push(spelling);
            }
            token = self.scan_token();
        }
        if token.is_end() {
            self.error(loc, "directive must end with a newline", "#pragma", "");
        } else {
            self.callbacks.handle_pragma(loc, &tokens);
        }
        token
    }

    fn cpp_version(&mut self, loc: SourceLoc) -> Token {
        let mut token = self.scan_token();
        if self.options.error_on_version || self.version_seen {
            self.error(loc, "must occur first in shader", "#version", "");
        }
        self.version_seen = true;

        if token.is_newline() {
            self.error(loc, "must be followed by version number", "#version", "");
            return token;
        }
        let version = match token.tok {
            Tok::Int {
                value,
                unsigned: false,
                ..
            } => value as i32,
            _ => {
                self.error(token.loc, "must be followed by version number", "#version", "");
                0
            }
        };

        token = self.scan_token();
        if token.is_newline() {
            self.callbacks.notify_version(loc.line, version, None);
            return token;
        }

        let profile_atom = token.ident();
        let recognized = matches!(profile_atom, Some(a) if a == self.known.core
            || a == self.known.compatibility
            || a == self.known.es);
        if !recognized {
            self.error(
                token.loc,
                "bad profile name; use es, core, or compatibility",
                "#version",
                "",
            );
        }
        let profile = profile_atom.map(|a| self.atoms.spelling(a).to_string());
        self.callbacks
            .notify_version(loc.line, version, profile.as_deref());

        token = self.scan_token();
        if !token.is_newline() {
            self.error(
                token.loc,
                "bad tokens following profile -- expected newline",
                "#version",
                "",
            );
        }
        token
    }

    fn cpp_extension(&mut self, loc: SourceLoc) -> Token {
        let mut token = self.scan_token();
        if token.is_newline() {
            self.error(loc, "extension name not specified", "#extension", "");
            return token;
        }
        if token.ident().is_none() {
            self.error(token.loc, "extension name expected", "#extension", "");
        }
        let name = self.token_spelling(&token).unwrap_or_default();

        token = self.scan_token();
        if !token.is_char(b':') {
            self.error(token.loc, "':' missing after extension name", "#extension", "");
            return token;
        }
        token = self.scan_token();
        let Some(behavior_atom) = token.ident() else {
            self.error(token.loc, "behavior for extension not specified", "#extension", "");
            return token;
        };
        let behavior = self.atoms.spelling(behavior_atom).to_string();
        self.callbacks.notify_extension(loc.line, &name, &behavior);

        token = self.scan_token();
        if !token.is_newline() {
            self.error(token.loc, "extra tokens -- expected newline", "#extension", "");
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{run, run_with, tokens, tokens_and_sink, Options, Profile};

    #[test]
    fn if_selects_then_branch() {
        assert_eq!(tokens("#define X 1\n#if X\nA\n#else\nB\n#endif\n"), ["A"]);
    }

    #[test]
    fn if_selects_else_branch_after_undef() {
        assert_eq!(
            tokens("#define X 1\n#undef X\n#if X\nA\n#else\nB\n#endif\n"),
            ["B"]
        );
    }

    #[test]
    fn ifdef_and_ifndef() {
        assert_eq!(tokens("#define M\n#ifdef M\nyes\n#endif\n"), ["yes"]);
        assert_eq!(tokens("#ifdef M\nyes\n#endif\nafter"), ["after"]);
        assert_eq!(tokens("#ifndef M\nyes\n#endif\n"), ["yes"]);
    }

    #[test]
    fn elif_chain_takes_first_true_branch() {
        let src = "#define V 2\n#if V == 1\nA\n#elif V == 2\nB\n#elif V == 3\nC\n#else\nD\n#endif\n";
        assert_eq!(tokens(src), ["B"]);
    }

    #[test]
    fn elif_after_taken_branch_is_not_evaluated() {
        // the dead #elif divides by zero; no diagnostic may fire
        let (toks, sink) = tokens_and_sink("#if 1\nA\n#elif 1/0\nB\n#endif\n");
        assert_eq!(toks, ["A"]);
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn nested_groups_inside_skipped_region() {
        let src = "#if 0\n#if 1\nX\n#endif\nY\n#else\nZ\n#endif\n";
        assert_eq!(tokens(src), ["Z"]);
    }

    #[test]
    fn directives_inert_in_skipped_region() {
        let src = "#if 0\n#define HIDDEN 1\n#error nope\n#endif\n#ifdef HIDDEN\nbad\n#endif\nok";
        let (toks, sink) = tokens_and_sink(src);
        assert_eq!(toks, ["ok"]);
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn missing_endif_reported() {
        let (_, sink) = tokens_and_sink("#if 1\nA\n");
        assert!(sink.diagnostics.iter().any(|d| d.message == "missing #endif"));
    }

    #[test]
    fn mismatched_endif_reported() {
        let (_, sink) = tokens_and_sink("#endif\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "mismatched statements" && d.label == "#endif"));
    }

    #[test]
    fn else_after_else_reported() {
        let (_, sink) = tokens_and_sink("#if 0\n#else\n#else\n#endif\n");
        assert!(sink.diagnostics.iter().any(|d| d.message == "#else after #else"));
    }

    #[test]
    fn elif_after_else_reported() {
        let (_, sink) = tokens_and_sink("#if 0\n#else\n#elif 1\n#endif\n");
        assert!(sink.diagnostics.iter().any(|d| d.message == "#elif after #else"));
    }

    #[test]
    fn extra_tokens_after_endif() {
        let (_, sink) = tokens_and_sink("#if 1\n#endif junk\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "unexpected tokens following directive" && d.label == "#endif"));
    }

    #[test]
    fn extra_tokens_warn_in_relaxed_mode() {
        let opts = Options {
            relaxed_errors: true,
            ..Options::default()
        };
        let (_, sink) = run_with("#if 1\n#endif junk\n", opts);
        assert_eq!(sink.error_count(), 0);
        assert_eq!(sink.diagnostics.len(), 1);
    }

    #[test]
    fn redefinition_identical_is_silent() {
        let (_, sink) = tokens_and_sink("#define A (1)\n#define A (1)\n");
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn redefinition_spacing_amount_is_insignificant() {
        let (_, sink) = tokens_and_sink("#define A x + y\n#define A x  +   y\n");
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn redefinition_spacing_presence_is_significant() {
        let (_, sink) = tokens_and_sink("#define A x+y\n#define A x + y\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "macro redefined; different substitutions:"));
    }

    #[test]
    fn redefinition_different_body_still_takes_effect() {
        let (toks, sink) = tokens_and_sink("#define A 1\n#define A 2\nA");
        assert_eq!(toks, ["2"]);
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "macro redefined; different substitutions:"));
    }

    #[test]
    fn redefinition_different_parameter_names() {
        let (_, sink) = tokens_and_sink("#define F(a) a\n#define F(b) b\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "macro redefined; different argument names:"));
    }

    #[test]
    fn redefinition_different_arity() {
        let (_, sink) = tokens_and_sink("#define F(a) a\n#define F(a, b) a\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "macro redefined; different number of arguments:"));
    }

    #[test]
    fn undef_trailing_tokens_rejected() {
        let (_, sink) = tokens_and_sink("#define A 1\n#undef A B\n");
        assert!(sink.diagnostics.iter().any(
            |d| d.message == "can only be followed by a single macro name" && d.label == "#undef"
        ));
    }

    #[test]
    fn reserved_names_rejected() {
        let (_, sink) = tokens_and_sink("#define GL_FOO 1\n#define __bar 2\n");
        assert_eq!(sink.error_count(), 2);
    }

    #[test]
    fn defining_defined_rejected() {
        let (_, sink) = tokens_and_sink("#define defined 1\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "\"defined\" cannot be (un)defined"));
    }

    #[test]
    fn directive_must_start_line() {
        let (_, sink) = tokens_and_sink("x #define A 1\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "preprocessor directive cannot be preceded by another token"));
    }

    #[test]
    fn unknown_directive_reported() {
        let (_, sink) = tokens_and_sink("#include \"foo.h\"\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "invalid directive:" && d.context == "include"));
    }

    #[test]
    fn line_directive_es_sets_literal_line() {
        let opts = Options {
            version: 300,
            profile: Profile::Es,
            ..Options::default()
        };
        let (toks, _) = run_with("#line 100\n__LINE__", opts);
        assert_eq!(toks, ["100"]);
    }

    #[test]
    fn line_directive_old_desktop_sets_next_line() {
        let opts = Options {
            version: 120,
            ..Options::default()
        };
        let (toks, _) = run_with("#line 100\n__LINE__", opts);
        assert_eq!(toks, ["101"]);
    }

    #[test]
    fn line_directive_consistent_across_repeats() {
        let opts = Options {
            version: 330,
            ..Options::default()
        };
        let (toks, _) = run_with("#line 10\n__LINE__\n#line 10\n__LINE__", opts);
        assert_eq!(toks[0], toks[1]);
    }

    #[test]
    fn line_directive_with_source_string() {
        let opts = Options {
            version: 300,
            profile: Profile::Es,
            ..Options::default()
        };
        let (toks, sink) = run_with("#line 7 3\n__FILE__ __LINE__", opts);
        assert_eq!(toks, ["3", "7"]);
        assert_eq!(sink.line_directives, vec![(7, true, 3)]);
    }

    #[test]
    fn line_directive_source_string_is_an_expression() {
        let opts = Options {
            version: 300,
            profile: Profile::Es,
            ..Options::default()
        };
        let (toks, sink) = run_with("#line 7 (3)\n__FILE__ __LINE__", opts);
        assert_eq!(toks, ["3", "7"]);
        assert!(sink.diagnostics.is_empty());
        assert_eq!(sink.line_directives, vec![(7, true, 3)]);
    }

    #[test]
    fn error_directive_reconstructs_message() {
        let (_, sink) = tokens_and_sink("#error bad thing 42\n");
        assert_eq!(sink.error_directives, vec![(1, "bad thing 42".to_string())]);
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.label == "#error" && d.message == "bad thing 42"));
    }

    #[test]
    fn pragma_forwards_spellings() {
        let (_, sink) = tokens_and_sink("#pragma optimize ( off )\nx");
        assert_eq!(sink.pragmas.len(), 1);
        assert_eq!(sink.pragmas[0].1, ["optimize", "(", "off", ")"]);
    }

    #[test]
    fn pragma_without_newline_is_error() {
        let (_, sink) = tokens_and_sink("#pragma foo");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "directive must end with a newline"));
    }

    #[test]
    fn version_notifies_with_profile() {
        let (_, sink) = tokens_and_sink("#version 310 es\n");
        assert_eq!(sink.versions, vec![(1, 310, Some("es".to_string()))]);
    }

    #[test]
    fn version_must_be_first() {
        let (_, sink) = tokens_and_sink("x\n#version 110\n");
        // the flag tracks directives, not arbitrary text, so only a second
        // #version trips it
        assert!(sink.diagnostics.is_empty());
        let (_, sink) = tokens_and_sink("#version 110\n#version 110\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "must occur first in shader"));
    }

    #[test]
    fn version_bad_profile_name() {
        let (_, sink) = tokens_and_sink("#version 450 corey\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "bad profile name; use es, core, or compatibility"));
    }

    #[test]
    fn extension_notifies_name_and_behavior() {
        let (_, sink) = tokens_and_sink("#extension GL_OES_standard_derivatives : enable\n");
        assert_eq!(
            sink.extensions,
            vec![(
                1,
                "GL_OES_standard_derivatives".to_string(),
                "enable".to_string()
            )]
        );
    }

    #[test]
    fn extension_missing_colon() {
        let (_, sink) = tokens_and_sink("#extension foo enable\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "':' missing after extension name"));
    }

    #[test]
    fn nesting_limit_enforced() {
        let mut src = String::new();
        for _ in 0..70 {
            src.push_str("#if 1\n");
        }
        let (_, sink) = run(&src);
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "maximum nesting depth exceeded"));
    }
}
