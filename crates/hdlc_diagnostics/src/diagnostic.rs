//! The structured diagnostic type shared by parsers, the DB, builders, and
//! the static checker.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single diagnostic message anchored at a file and an optional position.
///
/// `line` is always present (line 0 is used for file-level diagnostics such
/// as "library could not be inferred" or "file not found"); `col` is absent
/// when the diagnostic is not anchored to a specific column.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The file this diagnostic refers to.
    pub path: PathBuf,
    /// The 0-based line number.
    pub line: u32,
    /// The 0-based column number, if known.
    pub col: Option<u32>,
    /// The severity level.
    pub severity: Severity,
    /// An optional short code (e.g. a builder's diagnostic code, or a tag
    /// like `TODO`/`FIXME`/`XXX`, or `unused` for the static checker).
    pub code: Option<String>,
    /// The human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a new diagnostic with all fields explicit.
    pub fn new(
        path: impl Into<PathBuf>,
        line: u32,
        col: Option<u32>,
        severity: Severity,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            col,
            severity,
            code,
            message: message.into(),
        }
    }

    /// Creates an `Error`-severity diagnostic.
    pub fn error(path: impl Into<PathBuf>, line: u32, message: impl Into<String>) -> Self {
        Self::new(path, line, None, Severity::Error, None, message)
    }

    /// Creates a `Warning`-severity diagnostic.
    pub fn warning(path: impl Into<PathBuf>, line: u32, message: impl Into<String>) -> Self {
        Self::new(path, line, None, Severity::Warning, None, message)
    }

    /// Creates a `Note`-severity diagnostic.
    pub fn note(path: impl Into<PathBuf>, line: u32, message: impl Into<String>) -> Self {
        Self::new(path, line, None, Severity::Note, None, message)
    }

    /// Sets the column.
    pub fn with_col(mut self, col: u32) -> Self {
        self.col = Some(col);
        self
    }

    /// Sets the diagnostic code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// The `(path, line, col, code, message)` dedup key used by the engine
    /// to merge diagnostics from multiple sources without repeats.
    fn dedup_key(&self) -> (PathBuf, u32, Option<u32>, Option<String>, String) {
        (
            self.path.clone(),
            self.line,
            self.col,
            self.code.clone(),
            self.message.clone(),
        )
    }

    /// The `(path, line, col, severity, code, message)` sort key the engine
    /// uses to return diagnostics in a stable, idempotent order (§5).
    fn sort_key(&self) -> (PathBuf, u32, Option<u32>, Severity, Option<String>, String) {
        (
            self.path.clone(),
            self.line,
            self.col,
            self.severity,
            self.code.clone(),
            self.message.clone(),
        )
    }
}

/// Sorts diagnostics by `(path, line, col, severity, code, message)` and
/// removes exact `(path, line, col, code, message)` duplicates, keeping the
/// first occurrence. This is the merge step `get_diagnostics` (C7) performs
/// over tool diagnostics, static checks, library-inference diagnostics, and
/// dependency-resolution diagnostics.
pub fn dedup_and_sort(mut diags: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diags.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    let mut seen = std::collections::HashSet::new();
    diags.retain(|d| seen.insert(d.dedup_key()));
    diags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods() {
        let d = Diagnostic::warning("foo.vhd", 3, "unused signal")
            .with_col(5)
            .with_code("unused");
        assert_eq!(d.line, 3);
        assert_eq!(d.col, Some(5));
        assert_eq!(d.code.as_deref(), Some("unused"));
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn dedup_removes_exact_duplicates() {
        let a = Diagnostic::error("a.vhd", 1, "boom");
        let b = a.clone();
        let c = Diagnostic::error("a.vhd", 2, "boom");
        let out = dedup_and_sort(vec![a, b, c]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn sort_is_stable_by_path_then_line() {
        let a = Diagnostic::error("b.vhd", 1, "x");
        let b = Diagnostic::error("a.vhd", 5, "y");
        let c = Diagnostic::error("a.vhd", 1, "z");
        let out = dedup_and_sort(vec![a, b, c]);
        assert_eq!(out[0].path, PathBuf::from("a.vhd"));
        assert_eq!(out[0].line, 1);
        assert_eq!(out[1].line, 5);
        assert_eq!(out[2].path, PathBuf::from("b.vhd"));
    }

    #[test]
    fn idempotent_across_two_merges() {
        let diags = vec![
            Diagnostic::warning("a.vhd", 2, "m1"),
            Diagnostic::error("a.vhd", 1, "m2"),
        ];
        let first = dedup_and_sort(diags.clone());
        let second = dedup_and_sort(dedup_and_sort(diags));
        assert_eq!(first, second);
    }
}
