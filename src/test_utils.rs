//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Shared helpers for unit tests
//

use crate::diag::CollectingCallbacks;
use crate::Preprocessor;

pub(crate) use crate::{Options, Profile};

/// Run one source string through the preprocessor, returning the output
/// spellings and everything the callbacks collected.
pub(crate) fn run(src: &str) -> (Vec<String>, CollectingCallbacks) {
    run_strings(&[src], Options::default())
}

pub(crate) fn run_with(src: &str, options: Options) -> (Vec<String>, CollectingCallbacks) {
    run_strings(&[src], options)
}

pub(crate) fn run_strings(
    sources: &[&str],
    options: Options,
) -> (Vec<String>, CollectingCallbacks) {
    let mut sink = CollectingCallbacks::default();
    let mut pp = Preprocessor::new(sources, options, &mut sink);
    let mut out = Vec::new();
    while let Some(spelling) = pp.tokenize() {
        out.push(spelling);
    }
    drop(pp);
    (out, sink)
}

/// Output spellings only, for tests that do not care about diagnostics.
pub(crate) fn tokens(src: &str) -> Vec<String> {
    run(src).0
}

pub(crate) fn tokens_and_sink(src: &str) -> (Vec<String>, CollectingCallbacks) {
    run(src)
}

pub(crate) fn tokens_of_strings(sources: &[&str]) -> Vec<String> {
    run_strings(sources, Options::default()).0
}
