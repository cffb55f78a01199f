//
// Copyright (c) 2026 the glsl-pp authors
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// Diagnostics and collaborator notification hooks
//

use std::fmt;

// ============================================================================
// Source Location
// ============================================================================

/// Origin of a token: source-string index plus 1-based line number.
///
/// Advances as the scanner consumes newlines; mutated by `#line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLoc {
    pub string: i32,
    pub line: i32,
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.string, self.line)
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One reported problem. `label` identifies the construct being processed
/// (for example `#define` or `macro expansion`); `context` carries the
/// offending name where one exists.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub loc: SourceLoc,
    pub message: String,
    pub label: String,
    pub context: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}: ", self.loc, sev)?;
        if !self.label.is_empty() {
            write!(f, "{}: ", self.label)?;
        }
        f.write_str(&self.message)?;
        if !self.context.is_empty() {
            write!(f, " {}", self.context)?;
        }
        Ok(())
    }
}

// ============================================================================
// Collaborator Hooks
// ============================================================================

/// The surface the embedding parser/front end provides: a diagnostic sink
/// plus notification hooks fired by specific directives.
///
/// All notifications default to no-ops; only [`report`](Self::report) must
/// be supplied. `reserved_name` may be overridden to change which macro
/// names `#define`/`#undef` reject.
pub trait PpCallbacks {
    /// Receive an error or warning.
    fn report(&mut self, diag: Diagnostic);

    /// `#version line version profile` was parsed (fires even on
    /// recoverably-malformed forms).
    fn notify_version(&mut self, _line: i32, _version: i32, _profile: Option<&str>) {}

    /// `#line` remapped the current location.
    fn notify_line_directive(&mut self, _line: i32, _has_source: bool, _source: i32) {}

    /// `#error` fired with the reconstructed message text.
    fn notify_error_directive(&mut self, _line: i32, _message: &str) {}

    /// `#extension name : behavior` was parsed.
    fn notify_extension(&mut self, _line: i32, _name: &str, _behavior: &str) {}

    /// `#pragma` payload, one literal spelling per token.
    fn handle_pragma(&mut self, _loc: SourceLoc, _tokens: &[String]) {}

    /// Reserved-name check for `#define`/`#undef` targets. Returns the
    /// rejection message, or `None` to accept the name.
    fn reserved_name(&mut self, name: &str) -> Option<&'static str> {
        if name.starts_with("__") {
            Some("names beginning with \"__\" are reserved")
        } else if name.starts_with("GL_") {
            Some("names beginning with \"GL_\" are reserved")
        } else {
            None
        }
    }
}

/// A [`PpCallbacks`] implementation that records everything it is handed.
/// Suitable for embedders that post-process diagnostics, and for tests.
#[derive(Debug, Default)]
pub struct CollectingCallbacks {
    pub diagnostics: Vec<Diagnostic>,
    pub versions: Vec<(i32, i32, Option<String>)>,
    pub line_directives: Vec<(i32, bool, i32)>,
    pub error_directives: Vec<(i32, String)>,
    pub extensions: Vec<(i32, String, String)>,
    pub pragmas: Vec<(SourceLoc, Vec<String>)>,
}

impl CollectingCallbacks {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

impl PpCallbacks for CollectingCallbacks {
    fn report(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    fn notify_version(&mut self, line: i32, version: i32, profile: Option<&str>) {
        self.versions
            .push((line, version, profile.map(str::to_string)));
    }

    fn notify_line_directive(&mut self, line: i32, has_source: bool, source: i32) {
        self.line_directives.push((line, has_source, source));
    }

    fn notify_error_directive(&mut self, line: i32, message: &str) {
        self.error_directives.push((line, message.to_string()));
    }

    fn notify_extension(&mut self, line: i32, name: &str, behavior: &str) {
        self.extensions
            .push((line, name.to_string(), behavior.to_string()));
    }

    fn handle_pragma(&mut self, loc: SourceLoc, tokens: &[String]) {
        self.pragmas.push((loc, tokens.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic {
            severity: Severity::Error,
            loc: SourceLoc { string: 0, line: 4 },
            message: "unexpected tokens following directive".to_string(),
            label: "#endif".to_string(),
            context: String::new(),
        };
        assert_eq!(
            d.to_string(),
            "0:4: error: #endif: unexpected tokens following directive"
        );
    }

    #[test]
    fn default_reserved_names() {
        let mut sink = CollectingCallbacks::default();
        assert!(sink.reserved_name("__x").is_some());
        assert!(sink.reserved_name("GL_x").is_some());
        assert!(sink.reserved_name("ordinary").is_none());
    }
}
