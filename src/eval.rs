//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Constant-expression evaluation for #if / #elif / #line
//

use crate::macros::Expansion;
use crate::token::{Punct, Tok, Token};
use crate::{Preprocessor, Profile};

/// Binding strength, lowest to highest. A binary operator is consumed
/// only when its precedence exceeds the caller's floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Prec {
    Min,
    LogOr,
    LogAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
}

// Arithmetic wraps rather than trapping, matching two's-complement
// evaluation of preprocessor expressions. Shift counts are masked.

fn op_logor(a: i32, b: i32) -> i32 {
    (a != 0 || b != 0) as i32
}
fn op_logand(a: i32, b: i32) -> i32 {
    (a != 0 && b != 0) as i32
}
fn op_or(a: i32, b: i32) -> i32 {
    a | b
}
fn op_xor(a: i32, b: i32) -> i32 {
    a ^ b
}
fn op_and(a: i32, b: i32) -> i32 {
    a & b
}
fn op_eq(a: i32, b: i32) -> i32 {
    (a == b) as i32
}
fn op_ne(a: i32, b: i32) -> i32 {
    (a != b) as i32
}
fn op_gt(a: i32, b: i32) -> i32 {
    (a > b) as i32
}
fn op_lt(a: i32, b: i32) -> i32 {
    (a < b) as i32
}
fn op_ge(a: i32, b: i32) -> i32 {
    (a >= b) as i32
}
fn op_le(a: i32, b: i32) -> i32 {
    (a <= b) as i32
}
fn op_shl(a: i32, b: i32) -> i32 {
    a.wrapping_shl(b as u32)
}
fn op_shr(a: i32, b: i32) -> i32 {
    a.wrapping_shr(b as u32)
}
fn op_add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}
fn op_sub(a: i32, b: i32) -> i32 {
    a.wrapping_sub(b)
}
fn op_mul(a: i32, b: i32) -> i32 {
    a.wrapping_mul(b)
}
fn op_div(a: i32, b: i32) -> i32 {
    a.wrapping_div(b)
}
fn op_mod(a: i32, b: i32) -> i32 {
    a.wrapping_rem(b)
}

fn op_pos(a: i32) -> i32 {
    a
}
fn op_neg(a: i32) -> i32 {
    a.wrapping_neg()
}
fn op_cmpl(a: i32) -> i32 {
    !a
}
fn op_not(a: i32) -> i32 {
    (a == 0) as i32
}

struct BinOp {
    token: Punct,
    prec: Prec,
    op: fn(i32, i32) -> i32,
}

struct UnOp {
    token: Punct,
    op: fn(i32) -> i32,
}

static BINOPS: [BinOp; 18] = [
    BinOp { token: Punct::OrOp, prec: Prec::LogOr, op: op_logor },
    BinOp { token: Punct::AndOp, prec: Prec::LogAnd, op: op_logand },
    BinOp { token: Punct::Char(b'|'), prec: Prec::BitOr, op: op_or },
    BinOp { token: Punct::Char(b'^'), prec: Prec::BitXor, op: op_xor },
    BinOp { token: Punct::Char(b'&'), prec: Prec::BitAnd, op: op_and },
    BinOp { token: Punct::EqOp, prec: Prec::Equality, op: op_eq },
    BinOp { token: Punct::NeOp, prec: Prec::Equality, op: op_ne },
    BinOp { token: Punct::Char(b'>'), prec: Prec::Relational, op: op_gt },
    BinOp { token: Punct::Char(b'<'), prec: Prec::Relational, op: op_lt },
    BinOp { token: Punct::GeOp, prec: Prec::Relational, op: op_ge },
    BinOp { token: Punct::LeOp, prec: Prec::Relational, op: op_le },
    BinOp { token: Punct::LeftOp, prec: Prec::Shift, op: op_shl },
    BinOp { token: Punct::RightOp, prec: Prec::Shift, op: op_shr },
    BinOp { token: Punct::Char(b'+'), prec: Prec::Additive, op: op_add },
    BinOp { token: Punct::Char(b'-'), prec: Prec::Additive, op: op_sub },
    BinOp { token: Punct::Char(b'*'), prec: Prec::Multiplicative, op: op_mul },
    BinOp { token: Punct::Char(b'/'), prec: Prec::Multiplicative, op: op_div },
    BinOp { token: Punct::Char(b'%'), prec: Prec::Multiplicative, op: op_mod },
];

static UNOPS: [UnOp; 4] = [
    UnOp { token: Punct::Char(b'+'), op: op_pos },
    UnOp { token: Punct::Char(b'-'), op: op_neg },
    UnOp { token: Punct::Char(b'~'), op: op_cmpl },
    UnOp { token: Punct::Char(b'!'), op: op_not },
];

impl Preprocessor<'_> {
    /// Evaluate one (sub)expression starting at `token`, with `precedence`
    /// as the floor below which binary operators are left for the caller.
    /// Returns the first token past the expression.
    ///
    /// `short_circuit` is armed once the value of the remaining operand
    /// can no longer matter; it suppresses value-dependent diagnostics
    /// (the ES undefined-macro restriction, division by zero) without
    /// stopping the scan, since the expression's extent must still be
    /// found. Structural errors set `err` and force the result to 0.
    pub(crate) fn eval(
        &mut self,
        mut token: Token,
        precedence: Prec,
        mut short_circuit: bool,
        res: &mut i32,
        err: &mut bool,
    ) -> Token {
        let loc = token.loc;
        if let Some(atom) = token.ident() {
            if atom == self.known.defined {
                if self.in_macro_input() {
                    if self.options.relaxed_errors {
                        self.warn(loc, "nonportable when expanded from macros", "defined", "");
                    } else {
                        self.error(
                            loc,
                            "cannot use in preprocessor expression when expanded from macros",
                            "defined",
                            "",
                        );
                    }
                }
                let mut needclose = false;
                token = self.scan_token();
                if token.is_char(b'(') {
                    needclose = true;
                    token = self.scan_token();
                }
                let Some(name) = token.ident() else {
                    self.error(
                        loc,
                        "incorrect directive, expected identifier",
                        "preprocessor evaluation",
                        "",
                    );
                    *err = true;
                    *res = 0;
                    return token;
                };
                *res = self.macros.get(&name).map_or(false, |d| !d.undefined) as i32;
                token = self.scan_token();
                if needclose {
                    if !token.is_char(b')') {
                        self.error(loc, "expected ')'", "preprocessor evaluation", "");
                        *err = true;
                        *res = 0;
                        return token;
                    }
                    token = self.scan_token();
                }
            } else {
                // an identifier in an expression is a macro use; expand it
                // (undefined names become 0) and restart on the result
                token = self.eval_to_token(token, short_circuit, res, err);
                return self.eval(token, precedence, short_circuit, res, err);
            }
        } else if let Tok::Int {
            value,
            unsigned: false,
            ..
        } = token.tok
        {
            *res = value as i32;
            token = self.scan_token();
        } else if token.is_char(b'(') {
            token = self.scan_token();
            token = self.eval(token, Prec::Min, short_circuit, res, err);
            if !*err {
                if !token.is_char(b')') {
                    self.error(loc, "expected ')'", "preprocessor evaluation", "");
                    *err = true;
                    *res = 0;
                    return token;
                }
                token = self.scan_token();
            }
        } else if let Some(unop) = UNOPS.iter().find(|u| token.is_punct(u.token)) {
            let op = unop.op;
            token = self.scan_token();
            token = self.eval(token, Prec::Unary, short_circuit, res, err);
            *res = op(*res);
        } else {
            self.error(loc, "bad expression", "preprocessor evaluation", "");
            *err = true;
            *res = 0;
            return token;
        }

        token = self.eval_to_token(token, short_circuit, res, err);

        while !*err {
            if token.is_char(b')') || token.is_newline() {
                break;
            }
            let Some(binop) = BINOPS.iter().find(|b| token.is_punct(b.token)) else {
                break;
            };
            if binop.prec <= precedence {
                break;
            }
            let left = *res;

            // Arm short-circuiting once the left side decides the answer,
            // unless already inside a short circuit (it stays on until the
            // whole subexpression is done).
            if !short_circuit
                && ((binop.token == Punct::OrOp && left == 1)
                    || (binop.token == Punct::AndOp && left == 0))
            {
                short_circuit = true;
            }

            let op = binop.op;
            let prec = binop.prec;
            let divides = matches!(binop.token, Punct::Char(b'/') | Punct::Char(b'%'));
            token = self.scan_token();
            token = self.eval(token, prec, short_circuit, res, err);

            if divides && *res == 0 {
                if !short_circuit {
                    self.error(loc, "division by 0", "preprocessor evaluation", "");
                }
                *res = 1;
            }
            *res = op(left, *res);
        }
        token
    }

    /// Expand macros until the current token is something the evaluator
    /// can act on. Undefined macros become `0`; in the ES profile that is
    /// additionally diagnosed unless short-circuited.
    fn eval_to_token(
        &mut self,
        mut token: Token,
        short_circuit: bool,
        res: &mut i32,
        err: &mut bool,
    ) -> Token {
        loop {
            let Some(atom) = token.ident() else {
                break;
            };
            if atom == self.known.defined {
                break;
            }
            match self.macro_expand(atom, token.loc, true, false) {
                Expansion::NotExpanded | Expansion::Error => {
                    self.error(
                        token.loc,
                        "can't evaluate expression",
                        "preprocessor evaluation",
                        "",
                    );
                    *err = true;
                    *res = 0;
                }
                Expansion::Expanded => {}
                Expansion::ExpandedAsZero => {
                    if !short_circuit && self.options.profile == Profile::Es {
                        let name = self.atoms.spelling(atom).to_string();
                        if self.options.relaxed_errors {
                            self.warn(
                                token.loc,
                                "undefined macro in expression not allowed in es profile",
                                "preprocessor evaluation",
                                &name,
                            );
                        } else {
                            self.error(
                                token.loc,
                                "undefined macro in expression not allowed in es profile",
                                "preprocessor evaluation",
                                &name,
                            );
                        }
                    }
                }
            }
            token = self.scan_token();
        }
        token
    }
}
