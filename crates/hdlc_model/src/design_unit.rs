//! Design units — the top-level declarations a compiler treats as
//! compilation roots.

use hdlc_common::{Identifier, SourcePath};
use serde::{Deserialize, Serialize};

/// A 0-based `(line, col)` source position.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Location {
    /// The 0-based line number.
    pub line: u32,
    /// The 0-based column number.
    pub col: u32,
}

impl Location {
    /// Creates a new location.
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// The kind of top-level declaration a [`DesignUnit`] represents.
///
/// VHDL contributes the first six variants; Verilog and SystemVerilog share
/// the last four (§4.1 treats them as one rule set — a module, package,
/// interface, or program declaration looks identical in both dialects).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DesignUnitKind {
    /// VHDL `entity NAME is`.
    Entity,
    /// VHDL `architecture NAME of ENTITY is`.
    Architecture,
    /// VHDL `package NAME is`.
    Package,
    /// VHDL `package body NAME is`.
    PackageBody,
    /// VHDL `context NAME is`.
    Context,
    /// VHDL `configuration NAME of ...`.
    Configuration,
    /// Verilog/SystemVerilog `module NAME`.
    VerilogModule,
    /// Verilog/SystemVerilog `package NAME`.
    VerilogPackage,
    /// SystemVerilog `interface NAME`.
    VerilogInterface,
    /// SystemVerilog `program NAME`.
    VerilogProgram,
}

/// A top-level HDL declaration that a compiler treats as a compilation root.
///
/// A single file may declare several units (e.g. a package and its body).
/// `owner` is the declaring file; `locations` lists every position the name
/// is declared at within that file (normally one, but VHDL allows an entity
/// declared once and referenced again through multiple architectures, each
/// of which is itself a separate `DesignUnit`).
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DesignUnit {
    /// The declared name.
    pub name: Identifier,
    /// What kind of declaration this is.
    pub kind: DesignUnitKind,
    /// The file that declares this unit.
    pub owner: SourcePath,
    /// Source positions of the declaration (usually exactly one).
    pub locations: Vec<Location>,
}

impl DesignUnit {
    /// Creates a new design unit declared at a single location.
    pub fn new(name: Identifier, kind: DesignUnitKind, owner: SourcePath, at: Location) -> Self {
        Self {
            name,
            kind,
            owner,
            locations: vec![at],
        }
    }
}
