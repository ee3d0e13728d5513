//! Lightweight VHDL design-unit and dependency scanner.
//!
//! This is the VHDL half of C2. It never builds an AST and never fails:
//! malformed or partially-typed source is scanned best-effort and anything
//! unrecognized is silently skipped, so editor round-trips stay responsive
//! even on code the user is actively editing.

#![warn(missing_docs)]

pub mod lexer;
pub mod parser;
pub mod token;

use hdlc_common::{Interner, SourcePath};
use hdlc_model::{Dependency, DesignUnit};
use std::path::PathBuf;

/// Scans `source` (the contents of the file at `path`) and returns its
/// design units and dependencies. VHDL has no include directive, so the
/// third element of C2's output contract is always empty here.
pub fn parse_file(
    path: &SourcePath,
    source: &str,
    interner: &Interner,
) -> (Vec<DesignUnit>, Vec<Dependency>, Vec<PathBuf>) {
    let tokens = lexer::lex(source);
    let result = parser::scan(&tokens, source, path, interner);
    (result.design_units, result.dependencies, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_file_combines_lexer_and_scanner() {
        let interner = Interner::new();
        let path = SourcePath::missing("/tmp/top.vhd");
        let src = "library lib_a;\nuse lib_a.pkg.all;\nentity top is\nend entity top;";
        let (units, deps, includes) = parse_file(&path, src, &interner);
        assert_eq!(units.len(), 1);
        assert_eq!(deps.len(), 1);
        assert!(includes.is_empty());
    }
}
