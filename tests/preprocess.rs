//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// End-to-end tests over the public API
//

use similar_asserts::assert_eq;

use glsl_pp::{
    preprocess, CollectingCallbacks, Diagnostic, Options, PpCallbacks, Preprocessor, Profile,
    Severity,
};

fn pp_with(sources: &[&str], options: Options) -> (Vec<String>, CollectingCallbacks) {
    let mut sink = CollectingCallbacks::default();
    let mut pp = Preprocessor::new(sources, options, &mut sink);
    let mut out = Vec::new();
    while let Some(spelling) = pp.tokenize() {
        out.push(spelling);
    }
    drop(pp);
    (out, sink)
}

fn pp(src: &str) -> (Vec<String>, CollectingCallbacks) {
    pp_with(&[src], Options::default())
}

fn es300() -> Options {
    Options {
        version: 300,
        profile: Profile::Es,
        ..Options::default()
    }
}

#[test_log::test]
fn passthrough_of_plain_source() {
    let (out, sink) = pp("void main() { gl_Position = vec4(0.0); }\n");
    assert_eq!(
        out,
        [
            "void", "main", "(", ")", "{", "gl_Position", "=", "vec4", "(", "0.0", ")", ";", "}"
        ]
    );
    assert!(sink.diagnostics.is_empty());
}

#[test_log::test]
fn nesting_balance() {
    let src = "#if 1\n#if 0\nX\n#endif\nA\n#endif\n";
    let (out, sink) = pp(src);
    assert_eq!(out, ["A"]);
    assert!(sink.diagnostics.is_empty());

    let (_, sink) = pp("#if 1\n#if 0\n#endif\n");
    assert_eq!(
        sink.errors().map(|d| d.message.as_str()).collect::<Vec<_>>(),
        ["missing #endif"]
    );
}

#[test_log::test]
fn object_macro_expansion_is_stable() {
    let src = "#define FOUR 4\nFOUR FOUR FOUR\n";
    let (out, _) = pp(src);
    assert_eq!(out, ["4", "4", "4"]);
}

#[test_log::test]
fn recursive_macro_does_not_hang() {
    let (out, sink) = pp("#define A A\nA A\n");
    assert_eq!(out, ["A", "A"]);
    assert!(sink.diagnostics.is_empty());

    // mutual recursion stops at the second level
    let (out, _) = pp("#define X Y\n#define Y X\nX\n");
    assert_eq!(out, ["X"]);
}

#[test_log::test]
fn function_macro_arity() {
    let (out, sink) = pp("#define ADD(a,b) a+b\nADD(1,2)\n");
    assert_eq!(out, ["1", "+", "2"]);
    assert!(sink.diagnostics.is_empty());

    let (_, sink) = pp("#define ADD(a,b) a+b\nADD(1)\n");
    assert!(sink
        .errors()
        .any(|d| d.message == "too few arguments in macro call"));

    let (_, sink) = pp("#define ADD(a,b) a+b\nADD(1,2,3)\n");
    assert!(sink
        .errors()
        .any(|d| d.message == "too many arguments in macro call"));
}

#[test_log::test]
fn conditional_selection_flips_with_undef() {
    let block = "#if X\nA\n#else\nB\n#endif\n";
    let (out, _) = pp(&format!("#define X 1\n{block}"));
    assert_eq!(out, ["A"]);
    let (out, _) = pp(&format!("#define X 1\n#undef X\n{block}"));
    assert_eq!(out, ["B"]);
}

#[test_log::test]
fn redefinition_equivalence() {
    let (_, sink) = pp("#define A 1\n#define A 1\n");
    assert!(sink.diagnostics.is_empty());

    let (out, sink) = pp("#define A 1\n#define A 2\nA\n");
    assert!(sink
        .errors()
        .any(|d| d.message == "macro redefined; different substitutions:" && d.context == "A"));
    // the new definition wins despite the conflict
    assert_eq!(out, ["2"]);
}

#[test_log::test]
fn whitespace_insensitive_redefinition() {
    // differing amounts of spacing, identical tokens and separations
    let (_, sink) = pp("#define EXPR ( a + b )\n#define EXPR (  a  +  b  )\n");
    assert!(sink.diagnostics.is_empty());
}

#[test_log::test]
fn defined_operator_does_not_expand() {
    let src = "#define FOO\n#if defined(FOO)\nA\n#endif\n#if defined(BAR)\nB\n#endif\nend\n";
    let (out, sink) = pp(src);
    assert_eq!(out, ["A", "end"]);
    assert!(sink.diagnostics.is_empty());
}

#[test_log::test]
fn expression_short_circuit() {
    let (out, sink) = pp("#if 0 && (1/0)\nA\n#else\nB\n#endif\n");
    assert_eq!(out, ["B"]);
    assert!(sink.diagnostics.is_empty());

    let (out, sink) = pp_with(&["#if 1 || UNDEFINED_MACRO\nA\n#endif\n"], es300());
    assert_eq!(out, ["A"]);
    assert!(sink.diagnostics.is_empty());
}

#[test_log::test]
fn line_remap_round_trip() {
    // ES: the line after `#line 100` reports 100
    let (out, _) = pp_with(&["#line 100\n__LINE__\n"], es300());
    assert_eq!(out, ["100"]);

    // pre-3.30 desktop: the directive line itself is 100, the next is 101
    let opts = Options {
        version: 150,
        ..Options::default()
    };
    let (out, _) = pp_with(&["#line 100\n__LINE__\n"], opts);
    assert_eq!(out, ["101"]);

    // self-consistency across repeated directives within one dialect
    let (out, _) = pp_with(&["#line 50\n__LINE__\n#line 50\n__LINE__\n"], es300());
    assert_eq!(out[0], out[1]);
}

#[test_log::test]
fn multiple_source_strings_form_one_unit() {
    let sources = ["#define W 800\n", "width = W;\n"];
    let (out, sink) = pp_with(&sources, Options::default());
    assert_eq!(out, ["width", "=", "800", ";"]);
    assert!(sink.diagnostics.is_empty());

    // a conditional may span the string boundary
    let sources = ["#if 1\n", "A\n#endif\n"];
    let (out, sink) = pp_with(&sources, Options::default());
    assert_eq!(out, ["A"]);
    assert!(sink.diagnostics.is_empty());
}

#[test_log::test]
fn version_extension_pragma_flow_to_callbacks() {
    let src = "#version 310 es\n#extension GL_EXT_shader_io_blocks : require\n#pragma STDGL invariant ( all )\nx\n";
    let (out, sink) = pp(src);
    assert_eq!(out, ["x"]);
    assert_eq!(sink.versions, vec![(1, 310, Some("es".to_string()))]);
    assert_eq!(
        sink.extensions,
        vec![(2, "GL_EXT_shader_io_blocks".to_string(), "require".to_string())]
    );
    assert_eq!(sink.pragmas.len(), 1);
    assert_eq!(sink.pragmas[0].1, ["STDGL", "invariant", "(", "all", ")"]);
}

#[test_log::test]
fn error_directive_fails_the_unit() {
    let err = preprocess(
        &["#ifndef HAS_FEATURE\n#error feature missing\n#endif\n"],
        Options::default(),
    )
    .unwrap_err();
    let glsl_pp::Error::Diagnostics(diags) = err;
    assert!(diags
        .iter()
        .any(|d| d.severity == Severity::Error && d.message == "feature missing"));
}

#[test_log::test]
fn preprocess_succeeds_with_warnings_only() {
    let opts = Options {
        relaxed_errors: true,
        ..Options::default()
    };
    let out = preprocess(&["#if 1\n#endif junk\nok\n"], opts).unwrap();
    assert_eq!(out, ["ok"]);
}

#[test_log::test]
fn embedder_can_override_reserved_names() {
    struct Permissive(Vec<Diagnostic>);
    impl PpCallbacks for Permissive {
        fn report(&mut self, diag: Diagnostic) {
            self.0.push(diag);
        }
        fn reserved_name(&mut self, _name: &str) -> Option<&'static str> {
            None
        }
    }

    let sources = ["#define GL_CUSTOM 1\nGL_CUSTOM\n"];
    let mut cb = Permissive(Vec::new());
    let mut pp = Preprocessor::new(&sources, Options::default(), &mut cb);
    let mut out = Vec::new();
    while let Some(s) = pp.tokenize() {
        out.push(s);
    }
    drop(pp);
    assert_eq!(out, ["1"]);
    assert!(cb.0.is_empty());
}

#[test_log::test]
fn shader_with_everything() {
    let src = "\
#version 300 es
#define SCALE 2.0
#define MUL(a, b) ((a) * (b))
#ifdef SCALE
uniform float u_scale;
#else
const float u_scale = 1.0;
#endif
void main() {
    gl_FragDepth = MUL(u_scale, SCALE); // comment
}
";
    let (out, sink) = pp_with(&[src], es300());
    assert!(sink.diagnostics.is_empty());
    assert_eq!(
        out,
        [
            "uniform", "float", "u_scale", ";", "void", "main", "(", ")", "{", "gl_FragDepth",
            "=", "(", "(", "u_scale", ")", "*", "(", "2.0", ")", ")", ";", "}"
        ]
    );
}

#[test_log::test]
fn token_locations_follow_line_directives() {
    let sources = ["#line 20 5\nfoo\n"];
    let mut sink = CollectingCallbacks::default();
    let mut pp = Preprocessor::new(&sources, es300(), &mut sink);
    while pp.tokenize().is_some() {}
    let loc = pp.current_loc();
    assert_eq!(loc.string, 5);
    assert!(loc.line >= 20);
}
