//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Token input stack - pluggable token sources layered over the scanner
//

use std::rc::Rc;

use crate::atom::Atom;
use crate::diag::SourceLoc;
use crate::token::{Tok, Token, TokenStream};
use crate::Preprocessor;

/// One pushed token source. The stack is LIFO: the top source is scanned
/// until exhausted, then popped, falling through to the source beneath and
/// ultimately to the raw character scanner.
#[derive(Debug)]
pub(crate) enum Input {
    /// Replay of a recorded stream (a collected macro argument, or the
    /// rewritten stream produced by argument prescan).
    Stream(StreamInput),
    /// Replay of a macro body, substituting parameter occurrences with the
    /// corresponding argument streams.
    Macro(MacroInput),
    /// Synthesizes a single `0` constant: the value of an undefined macro
    /// expanded inside a constant expression.
    Zero { done: bool, loc: SourceLoc },
    /// Yields one marker sentinel, bounding an argument prescan.
    Marker { done: bool, loc: SourceLoc },
}

/// What the top-of-stack source wants the scan loop to do next.
pub(crate) enum InputAction {
    Token(Token),
    /// A macro parameter was hit in the body: push this argument stream
    /// and keep scanning from it.
    PushArg(Rc<TokenStream>),
    Exhausted,
}

#[derive(Debug)]
pub(crate) struct StreamInput {
    stream: Rc<TokenStream>,
    pos: usize,
}

impl StreamInput {
    pub(crate) fn new(stream: Rc<TokenStream>) -> Self {
        Self { stream, pos: 0 }
    }

    fn next(&mut self) -> InputAction {
        match self.stream.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                InputAction::Token(token.clone())
            }
            None => InputAction::Exhausted,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MacroInput {
    pub(crate) name: Atom,
    params: Vec<Atom>,
    body: Rc<TokenStream>,
    pos: usize,
    args: Vec<Rc<TokenStream>>,
}

impl MacroInput {
    pub(crate) fn new(
        name: Atom,
        params: Vec<Atom>,
        body: Rc<TokenStream>,
        args: Vec<Rc<TokenStream>>,
    ) -> Self {
        Self {
            name,
            params,
            body,
            pos: 0,
            args,
        }
    }

    fn next(&mut self) -> InputAction {
        loop {
            let Some(token) = self.body.get(self.pos) else {
                return InputAction::Exhausted;
            };
            self.pos += 1;
            if token.tok == Tok::Space {
                continue;
            }
            if let Tok::Ident(atom) = token.tok {
                if let Some(i) = self.params.iter().position(|&p| p == atom) {
                    return InputAction::PushArg(self.args[i].clone());
                }
            }
            return InputAction::Token(token.clone());
        }
    }
}

impl Input {
    fn next(&mut self) -> InputAction {
        match self {
            Input::Stream(s) => s.next(),
            Input::Macro(m) => m.next(),
            Input::Zero { done, loc } => {
                if *done {
                    InputAction::Exhausted
                } else {
                    *done = true;
                    InputAction::Token(Token::new(
                        Tok::Int {
                            value: 0,
                            text: "0".to_string(),
                            unsigned: false,
                        },
                        *loc,
                        false,
                    ))
                }
            }
            Input::Marker { done, loc } => {
                if *done {
                    InputAction::Exhausted
                } else {
                    *done = true;
                    InputAction::Token(Token::new(Tok::Marker, *loc, false))
                }
            }
        }
    }
}

impl Preprocessor<'_> {
    /// Next token from the input stack, falling through to the raw scanner
    /// when the stack is empty. Exhausted sources are popped transparently;
    /// popping a macro-body source clears that macro's recursion guard.
    pub(crate) fn scan_token(&mut self) -> Token {
        if let Some(token) = self.ungot.take() {
            return token;
        }
        loop {
            let action = match self.inputs.last_mut() {
                None => return self.lex_token(),
                Some(input) => input.next(),
            };
            match action {
                InputAction::Token(token) => return token,
                InputAction::PushArg(stream) => {
                    self.inputs.push(Input::Stream(StreamInput::new(stream)));
                }
                InputAction::Exhausted => {
                    if let Some(Input::Macro(mac)) = self.inputs.pop() {
                        if let Some(def) = self.macros.get_mut(&mac.name) {
                            def.busy = false;
                        }
                    }
                }
            }
        }
    }

    /// Single-token pushback, for directive handlers that over-read by one
    /// while checking for an unexpected trailing token.
    pub(crate) fn unget_token(&mut self, token: Token) {
        debug_assert!(self.ungot.is_none(), "double token pushback");
        self.ungot = Some(token);
    }
}
