//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Macro definitions and the expansion engine
//

use std::rc::Rc;

use log::debug;

use crate::atom::Atom;
use crate::diag::SourceLoc;
use crate::input::{Input, MacroInput, StreamInput};
use crate::token::{Tok, Token, TokenStream};
use crate::Preprocessor;

/// A macro may declare at most this many parameters.
pub const MAX_MACRO_ARGS: usize = 64;

/// One entry in the macro table.
///
/// Entries are never removed: `#undef` marks the entry `undefined` but
/// keeps it, so a later `#define` of the same name is not treated as a
/// redefinition, and so expansion lookups stay cheap.
#[derive(Debug)]
pub(crate) struct MacroDef {
    /// Parameter names, in declaration order. Empty for object-like
    /// macros and for function-like macros with an empty parameter list.
    pub(crate) params: Vec<Atom>,
    /// Distinguishes `#define F() ...` from `#define F ...`.
    pub(crate) function_like: bool,
    pub(crate) body: Rc<TokenStream>,
    pub(crate) undefined: bool,
    /// Set while this macro's body is being replayed; suppresses
    /// recursive self-expansion.
    pub(crate) busy: bool,
}

/// Outcome of an expansion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Expansion {
    /// The name is not an expandable macro here; the caller keeps the
    /// identifier token as-is.
    NotExpanded,
    /// Input was pushed (macro body, builtin constant); rescan.
    Expanded,
    /// Undefined macro in a context that treats those as `0`; a zero
    /// constant was pushed.
    ExpandedAsZero,
    /// Malformed call; a diagnostic was reported and the caller resumes
    /// scanning from wherever collection stopped.
    Error,
}

impl Preprocessor<'_> {
    /// Attempt to expand `atom` at `loc`. On success pushes the
    /// replacement input and returns `Expanded`; the caller rescans.
    ///
    /// `expand_undef` is set inside `#if` expressions, where undefined
    /// macros evaluate to `0`. `newline_okay` allows a function-like
    /// macro call to span lines, which is valid everywhere except inside
    /// a directive.
    pub(crate) fn macro_expand(
        &mut self,
        atom: Atom,
        loc: SourceLoc,
        expand_undef: bool,
        newline_okay: bool,
    ) -> Expansion {
        if atom == self.known.line_macro {
            self.unget_int_constant(loc.line, loc);
            return Expansion::Expanded;
        }
        if atom == self.known.file_macro {
            self.unget_int_constant(loc.string, loc);
            return Expansion::Expanded;
        }
        if atom == self.known.version_macro {
            self.unget_int_constant(self.options.version, loc);
            return Expansion::Expanded;
        }

        let def = self.macros.get(&atom);
        // no recursive expansion
        if def.map_or(false, |d| d.busy) {
            return Expansion::NotExpanded;
        }
        let live = def.map_or(false, |d| !d.undefined);
        if !live {
            if !expand_undef {
                return Expansion::NotExpanded;
            }
            // 0 is the value of an undefined macro in an expression
            self.inputs.push(Input::Zero { done: false, loc });
            return Expansion::ExpandedAsZero;
        }

        let Some(def) = self.macros.get(&atom) else {
            return Expansion::NotExpanded;
        };
        let function_like = def.function_like;
        let params = def.params.clone();
        let body = def.body.clone();

        let mut args: Vec<Rc<TokenStream>> = Vec::new();
        if function_like {
            match self.collect_macro_args(atom, &params, loc, newline_okay) {
                Ok(Some(collected)) => args = collected,
                // name not followed by a call; leave the identifier alone
                Ok(None) => return Expansion::NotExpanded,
                Err(()) => return Expansion::Error,
            }
        }

        debug!(
            "expanding {} with {} argument(s)",
            self.atoms.spelling(atom),
            args.len()
        );
        self.inputs
            .push(Input::Macro(MacroInput::new(atom, params, body, args)));
        if let Some(def) = self.macros.get_mut(&atom) {
            def.busy = true;
        }
        Expansion::Expanded
    }

    /// Collect the parenthesized argument list of a function-like call.
    /// Returns `Ok(None)` when the name is not followed by `(` at all.
    fn collect_macro_args(
        &mut self,
        atom: Atom,
        params: &[Atom],
        loc: SourceLoc,
        newline_okay: bool,
    ) -> Result<Option<Vec<Rc<TokenStream>>>, ()> {
        let mut token = self.scan_token();
        if newline_okay {
            while token.is_newline() {
                token = self.scan_token();
            }
        }
        if !token.is_char(b'(') {
            // the name still passes through as a plain identifier
            let name = self.atoms.spelling(atom).to_string();
            self.error(loc, "expected '(' following", "macro expansion", &name);
            self.unget_token(token);
            return Ok(None);
        }

        let name = self.atoms.spelling(atom).to_string();
        let mut raw: Vec<TokenStream> = params.iter().map(|_| TokenStream::new()).collect();
        let mut arg = 0usize;
        let mut recorded = false;
        loop {
            // one argument, tracking nested parentheses
            let mut nesting = 0usize;
            loop {
                token = self.scan_token();
                if token.is_end() || token.tok == Tok::Marker {
                    self.error(loc, "end of input in macro call", "macro expansion", &name);
                    return Err(());
                }
                if token.is_newline() {
                    if !newline_okay {
                        self.error(
                            loc,
                            "end of line in macro substitution",
                            "macro expansion",
                            &name,
                        );
                        return Err(());
                    }
                    continue;
                }
                if token.is_char(b'#') {
                    self.error(token.loc, "unexpected '#'", "macro expansion", &name);
                    return Err(());
                }
                if params.is_empty() && !token.is_char(b')') {
                    break;
                }
                if nesting == 0 && (token.is_char(b',') || token.is_char(b')')) {
                    break;
                }
                if token.is_char(b'(') {
                    nesting += 1;
                } else if nesting > 0 && token.is_char(b')') {
                    nesting -= 1;
                }
                raw[arg].record(token.clone());
                recorded = true;
            }
            if token.is_char(b')') {
                // a bare `()` call of a one-parameter macro passes no
                // argument at all rather than one empty argument
                if params.len() == 1 && !recorded {
                    break;
                }
                arg += 1;
                break;
            }
            arg += 1;
            if arg >= params.len() {
                break;
            }
        }

        if arg < params.len() {
            self.error(loc, "too few arguments in macro call", "macro expansion", &name);
        } else if !token.is_char(b')') {
            // overfull call: scan ahead to the unnested close of the call
            // so the caller can continue, then complain
            let mut depth: i32 = 0;
            while !token.is_end() && (depth > 0 || !token.is_char(b')')) {
                if token.is_char(b')') {
                    depth -= 1;
                }
                token = self.scan_token();
                if token.is_char(b'(') {
                    depth += 1;
                }
            }
            if token.is_end() {
                self.error(loc, "end of input in macro call", "macro expansion", &name);
                return Err(());
            }
            self.error(loc, "too many arguments in macro call", "macro expansion", &name);
        }

        let mut args: Vec<Rc<TokenStream>> = raw.into_iter().map(Rc::new).collect();
        for i in 0..args.len() {
            if let Some(expanded) = self.prescan_macro_arg(args[i].clone(), newline_okay) {
                args[i] = expanded;
            }
        }
        Ok(Some(args))
    }

    /// Fully expand one collected argument before substitution, so each
    /// argument is expanded exactly once no matter how many times the
    /// parameter occurs in the body.
    ///
    /// Returns `None` when the argument needs no expansion (or when
    /// expansion failed and the raw argument should be substituted).
    fn prescan_macro_arg(
        &mut self,
        arg: Rc<TokenStream>,
        newline_okay: bool,
    ) -> Option<Rc<TokenStream>> {
        let mentions_macro = arg.iter().any(|t| match t.tok {
            Tok::Ident(a) => self.macros.contains_key(&a) || self.known.is_builtin_macro(a),
            _ => false,
        });
        if !mentions_macro {
            return None;
        }

        let loc = self.src.loc();
        self.inputs.push(Input::Marker { done: false, loc });
        self.inputs.push(Input::Stream(StreamInput::new(arg)));
        let mut expanded = TokenStream::new();
        loop {
            let token = self.scan_token();
            if token.is_end() {
                // something inside the argument consumed the bounding
                // marker; substitute the raw argument instead
                return None;
            }
            if token.tok == Tok::Marker {
                break;
            }
            if let Some(a) = token.ident() {
                match self.macro_expand(a, token.loc, false, newline_okay) {
                    // a failed expansion was reported; the name is kept
                    // and scanning continues toward the marker
                    Expansion::NotExpanded | Expansion::Error => {}
                    Expansion::Expanded | Expansion::ExpandedAsZero => continue,
                }
            }
            expanded.record(token);
        }
        Some(Rc::new(expanded))
    }

    /// Is `name` a live entry in the macro table? Builtin pseudo-macros
    /// are not entries and report false, matching the `defined` operator.
    pub fn is_defined(&self, name: &str) -> bool {
        match self.atoms.lookup(name) {
            Some(atom) => self.macros.get(&atom).map_or(false, |d| !d.undefined),
            None => false,
        }
    }

    fn unget_int_constant(&mut self, value: i32, loc: SourceLoc) {
        let value = value.max(0) as u32;
        self.unget_token(Token::new(
            Tok::Int {
                value,
                text: value.to_string(),
                unsigned: false,
            },
            loc,
            false,
        ));
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{tokens, tokens_and_sink};

    #[test]
    fn object_macro_expands() {
        assert_eq!(tokens("#define N 4\nvec N x"), ["vec", "4", "x"]);
    }

    #[test]
    fn self_reference_does_not_recurse() {
        assert_eq!(tokens("#define A A\nA"), ["A"]);
        assert_eq!(tokens("#define A B\n#define B A\nA B"), ["A", "B"]);
    }

    #[test]
    fn function_macro_substitutes_arguments() {
        assert_eq!(
            tokens("#define ADD(a, b) ((a) + (b))\nADD(x, 2)"),
            ["(", "(", "x", ")", "+", "(", "2", ")", ")"]
        );
    }

    #[test]
    fn function_macro_without_parens_diagnosed_and_passed_through() {
        let (toks, sink) = tokens_and_sink("#define F(x) x\nF + 1");
        assert_eq!(toks, ["F", "+", "1"]);
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "expected '(' following" && d.context == "F"));
    }

    #[test]
    fn call_spans_lines_outside_directives() {
        assert_eq!(tokens("#define F(x) x\nF\n(\n7\n)"), ["7"]);
    }

    #[test]
    fn nested_parens_stay_in_one_argument() {
        assert_eq!(tokens("#define ID(x) x\nID(f(a, b))"), ["f", "(", "a", ",", "b", ")"]);
    }

    #[test]
    fn zero_parameter_macro() {
        assert_eq!(tokens("#define Z() 9\nZ()"), ["9"]);
    }

    #[test]
    fn empty_call_of_one_parameter_macro_is_too_few() {
        let (_, sink) = tokens_and_sink("#define F(x) x\nF()\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "too few arguments in macro call"));
    }

    #[test]
    fn too_few_arguments_reported() {
        let (_, sink) = tokens_and_sink("#define F(a, b) a b\nF(1)\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "too few arguments in macro call"));
    }

    #[test]
    fn too_many_arguments_reported_and_call_consumed() {
        let (toks, sink) = tokens_and_sink("#define F(a) a\nF(1, 2) tail\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "too many arguments in macro call"));
        assert!(toks.contains(&"tail".to_string()));
    }

    #[test]
    fn hash_in_call_reports_and_resumes() {
        let (toks, sink) = tokens_and_sink("#define F(a) a\nF(1 # 2) tail\n");
        assert!(sink.diagnostics.iter().any(|d| d.message == "unexpected '#'"));
        // scanning picks back up where collection stopped
        assert!(toks.contains(&"tail".to_string()));
    }

    #[test]
    fn overfull_call_resync_ignores_braces() {
        let (toks, sink) = tokens_and_sink("#define F(a) a\nF(1, { ) x\n");
        assert!(sink
            .diagnostics
            .iter()
            .any(|d| d.message == "too many arguments in macro call"));
        // the resync stops at the first unnested ')'; braces do not nest
        assert_eq!(toks, ["1", "x"]);
    }

    #[test]
    fn arguments_are_prescanned_once() {
        assert_eq!(
            tokens("#define ONE 1\n#define TWICE(x) x x\nTWICE(ONE)"),
            ["1", "1"]
        );
    }

    #[test]
    fn undefined_name_in_argument_survives() {
        assert_eq!(tokens("#define ID(x) x\nID(undef_name)"), ["undef_name"]);
    }

    #[test]
    fn builtin_line_macro() {
        assert_eq!(tokens("a\n__LINE__"), ["a", "2"]);
    }

    #[test]
    fn builtin_file_macro_counts_strings() {
        use crate::test_utils::tokens_of_strings;
        assert_eq!(tokens_of_strings(&["x ", "__FILE__"]), ["x", "1"]);
    }

    #[test]
    fn builtin_version_macro() {
        use crate::test_utils::{run_with, Options};
        let opts = Options {
            version: 310,
            ..Options::default()
        };
        let (toks, _) = run_with("__VERSION__", opts);
        assert_eq!(toks, ["310"]);
    }

    #[test]
    fn undef_then_use_leaves_name() {
        assert_eq!(tokens("#define A 1\n#undef A\nA"), ["A"]);
    }
}
