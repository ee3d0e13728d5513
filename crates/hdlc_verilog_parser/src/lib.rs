//! Lightweight Verilog and SystemVerilog design-unit and dependency scanner.
//!
//! Both dialects share one scanner parameterized by [`parser::Dialect`],
//! since §4.1 treats their declaration shapes as one rule set and the two
//! differ only in which constructs are reserved (`import`, `interface`,
//! `program` are SystemVerilog-only). Like [`hdlc_vhdl_parser`], this never
//! builds an AST and never fails.

#![warn(missing_docs)]

pub mod lexer;
pub mod parser;
pub mod token;

pub use parser::Dialect;

use hdlc_common::{Interner, SourcePath};
use hdlc_model::{Dependency, DesignUnit, SourceKind};
use std::path::PathBuf;

/// Maps a [`SourceKind`] to the [`Dialect`] this crate understands, or
/// `None` for VHDL.
pub fn dialect_for(kind: SourceKind) -> Option<Dialect> {
    match kind {
        SourceKind::Verilog => Some(Dialect::Verilog),
        SourceKind::SystemVerilog => Some(Dialect::SystemVerilog),
        SourceKind::Vhdl => None,
    }
}

/// Scans `source` (the contents of the file at `path`) and returns its
/// design units, dependencies, and `` `include `` targets.
pub fn parse_file(
    path: &SourcePath,
    source: &str,
    interner: &Interner,
    dialect: Dialect,
) -> (Vec<DesignUnit>, Vec<Dependency>, Vec<PathBuf>) {
    let tokens = lexer::lex(source);
    let result = parser::scan(&tokens, source, path, interner, dialect);
    (result.design_units, result.dependencies, result.includes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_file_combines_lexer_and_scanner() {
        let interner = Interner::new();
        let path = SourcePath::missing("/tmp/top.sv");
        let src = "`include \"defs.svh\"\nimport my_pkg::*;\nmodule top;\n  sub u1 (.clk(clk));\nendmodule";
        let (units, deps, includes) = parse_file(&path, src, &interner, Dialect::SystemVerilog);
        assert_eq!(units.len(), 1);
        assert_eq!(deps.len(), 2);
        assert_eq!(includes.len(), 1);
    }

    #[test]
    fn dialect_mapping() {
        assert_eq!(dialect_for(SourceKind::Verilog), Some(Dialect::Verilog));
        assert_eq!(dialect_for(SourceKind::SystemVerilog), Some(Dialect::SystemVerilog));
        assert_eq!(dialect_for(SourceKind::Vhdl), None);
    }
}
