//! The per-path record the database indexes: one [`SourceFile`] per known
//! path, holding its parsed design units and dependencies.

use crate::dependency::Dependency;
use crate::design_unit::DesignUnit;
use hdlc_common::{Identifier, SourcePath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The HDL dialect a [`SourceFile`] is written in.
///
/// Equality/hashing rules for identifiers declared in a file follow its
/// kind: VHDL folds case, Verilog and SystemVerilog preserve it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SourceKind {
    /// VHDL-2008.
    Vhdl,
    /// Verilog-2005.
    Verilog,
    /// SystemVerilog-2017.
    SystemVerilog,
}

impl SourceKind {
    /// `true` for VHDL, where identifier equality folds case.
    pub fn is_case_insensitive(self) -> bool {
        matches!(self, SourceKind::Vhdl)
    }

    /// Detects a dialect from a file extension (`.vhd`/`.vhdl`, `.v`, `.sv`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "vhd" | "vhdl" => Some(SourceKind::Vhdl),
            "v" => Some(SourceKind::Verilog),
            "sv" => Some(SourceKind::SystemVerilog),
            _ => None,
        }
    }
}

/// One known source path and everything the database has learned about it.
///
/// `library` is `None` until library inference (run by `hdlc_db`) assigns
/// one — either explicitly from configuration, inferred per §3's three
/// rules, or the `!!hdl_checker_unresolved_library!!` sentinel if inference
/// cannot place it. `path` carries its own captured mtime (see
/// [`SourcePath`]), which doubles as the `mtime_at_parse` invalidation key
/// the spec calls out separately: `path.is_stale()` is invariant I3's check.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceFile {
    /// The file's path, with the mtime/size captured at last parse.
    pub path: SourcePath,
    /// The HDL dialect.
    pub kind: SourceKind,
    /// The assigned library, if any.
    pub library: Option<Identifier>,
    /// Flags applied when this file is the direct compilation target.
    pub flags_single: Vec<String>,
    /// Flags applied when this file is compiled only as a dependency.
    pub flags_dependencies: Vec<String>,
    /// Design units declared in this file.
    pub design_units: Vec<DesignUnit>,
    /// Dependencies this file references.
    pub dependencies: Vec<Dependency>,
    /// Verilog ``` `include ``` targets found in this file.
    pub include_list: Vec<PathBuf>,
}

impl SourceFile {
    /// Creates a freshly-discovered `SourceFile` with no parsed artifacts yet.
    pub fn new(path: SourcePath, kind: SourceKind) -> Self {
        Self {
            path,
            kind,
            library: None,
            flags_single: Vec::new(),
            flags_dependencies: Vec::new(),
            design_units: Vec::new(),
            dependencies: Vec::new(),
            include_list: Vec::new(),
        }
    }

    /// Replaces this file's parsed artifacts wholesale, as happens on
    /// every re-parse (design units and dependencies are owned by the file,
    /// never merged across versions).
    pub fn replace_parsed(
        &mut self,
        design_units: Vec<DesignUnit>,
        dependencies: Vec<Dependency>,
        include_list: Vec<PathBuf>,
    ) {
        self.design_units = design_units;
        self.dependencies = dependencies;
        self.include_list = include_list;
    }

    /// `true` if the on-disk file no longer matches what was captured at
    /// last parse — invariant I3.
    pub fn is_stale(&self) -> bool {
        self.path.is_stale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection() {
        assert_eq!(SourceKind::from_extension("vhd"), Some(SourceKind::Vhdl));
        assert_eq!(SourceKind::from_extension("VHDL"), Some(SourceKind::Vhdl));
        assert_eq!(SourceKind::from_extension("v"), Some(SourceKind::Verilog));
        assert_eq!(
            SourceKind::from_extension("sv"),
            Some(SourceKind::SystemVerilog)
        );
        assert_eq!(SourceKind::from_extension("txt"), None);
    }

    #[test]
    fn case_sensitivity_by_kind() {
        assert!(SourceKind::Vhdl.is_case_insensitive());
        assert!(!SourceKind::Verilog.is_case_insensitive());
        assert!(!SourceKind::SystemVerilog.is_case_insensitive());
    }

    #[test]
    fn fresh_file_has_no_library() {
        let path = SourcePath::missing("/tmp/foo.vhd");
        let file = SourceFile::new(path, SourceKind::Vhdl);
        assert!(file.library.is_none());
        assert!(file.design_units.is_empty());
    }
}
