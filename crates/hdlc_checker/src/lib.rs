//! The static checker (C6): language-agnostic style checks over parsed
//! sources, no external tool required.
//!
//! Two checks, both described in §4.5: unused VHDL declarations and
//! `TODO`/`FIXME`/`XXX` comment tags (every dialect). Both build on the
//! shared [`scan`] byte scanner rather than re-deriving comment/string
//! handling twice.

#![warn(missing_docs)]

pub mod scan;
pub mod tags;
pub mod unused;

use hdlc_diagnostics::Diagnostic;
use hdlc_model::SourceKind;
use std::path::Path;

/// Runs every static check over `source` and returns the combined,
/// unsorted diagnostic list. The caller (`hdlc_engine`) merges this with
/// tool and library-inference diagnostics and sorts/dedups the result.
pub fn check_file(path: &Path, kind: SourceKind, source: &str) -> Vec<Diagnostic> {
    let mut diags = unused::check(path, kind, source);
    diags.extend(tags::check(path, kind, source));
    diags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combines_both_checks() {
        let src = "architecture rtl of foo is\nsignal neat_signal : std_logic; -- TODO: widen\nbegin\nend architecture;";
        let diags = check_file(Path::new("foo.vhd"), SourceKind::Vhdl, src);
        assert_eq!(diags.len(), 2);
        let codes: Vec<_> = diags.iter().filter_map(|d| d.code.as_deref()).collect();
        assert!(codes.contains(&"unused"));
        assert!(codes.contains(&"TODO"));
    }

    #[test]
    fn verilog_only_gets_tags() {
        let src = "module foo;\nwire unused_wire; // FIXME: remove\nendmodule";
        let diags = check_file(Path::new("foo.v"), SourceKind::Verilog, src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("FIXME"));
    }
}
