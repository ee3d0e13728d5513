//! Shared configuration types: the resolved, flattened project view every
//! loader (JSON or legacy) produces, and the builder-kind enum used both
//! for the `builder =` legacy key and for default-flag lookup.

use std::path::PathBuf;

/// Which external tool compiles this project. Selection order at runtime
/// is `Msim > Ghdl > Xvhdl > Fallback` (§4.6), but a config may also pin
/// one explicitly via the legacy `builder =` key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BuilderKind {
    /// ModelSim (`msim`).
    Msim,
    /// GHDL (`ghdl`).
    Ghdl,
    /// XVHDL (`xvhdl`).
    Xvhdl,
    /// The no-op fallback builder.
    Fallback,
}

impl BuilderKind {
    /// Parses a builder name as it appears in the legacy `builder =` key.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "msim" => Some(BuilderKind::Msim),
            "ghdl" => Some(BuilderKind::Ghdl),
            "xvhdl" => Some(BuilderKind::Xvhdl),
            "fallback" => Some(BuilderKind::Fallback),
            _ => None,
        }
    }
}

/// The three HDL dialects a config entry can target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ConfigLang {
    /// VHDL.
    Vhdl,
    /// Verilog.
    Verilog,
    /// SystemVerilog.
    SystemVerilog,
}

impl ConfigLang {
    /// Parses a language name as it appears in the legacy `<kind>` column
    /// or the JSON config's per-language block keys.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "vhdl" => Some(ConfigLang::Vhdl),
            "verilog" => Some(ConfigLang::Verilog),
            "systemverilog" => Some(ConfigLang::SystemVerilog),
            _ => None,
        }
    }
}

/// Per-scope compiler flags for one language: applied when the file is the
/// direct compilation target (`single`), when it is compiled only as a
/// dependency (`dependencies`), or in both cases (`global`, appended after
/// whichever of the above applies).
#[derive(Clone, Default, Debug)]
pub struct FlagsBlock {
    /// Flags applied only when this file is the direct build target.
    pub single: Vec<String>,
    /// Flags applied only when this file is compiled as a dependency.
    pub dependencies: Vec<String>,
    /// Flags applied in both cases.
    pub global: Vec<String>,
}

/// One resolved source file entry: an absolute path plus its explicit
/// library/flags overrides, if any were given.
#[derive(Clone, Debug)]
pub struct ResolvedSource {
    /// The absolute (or repository-relative, if unresolvable) path.
    pub path: PathBuf,
    /// The explicitly assigned library, if any.
    pub library: Option<String>,
    /// Per-file flag overrides from the config entry itself.
    pub flags: Vec<String>,
}

/// The fully flattened, include-expanded, glob-expanded project
/// configuration every loader produces, regardless of source format.
#[derive(Clone, Debug, Default)]
pub struct ResolvedConfig {
    /// Every resolved source file, in file-then-include-order.
    pub sources: Vec<ResolvedSource>,
    /// Per-language flag overrides, keyed by dialect.
    pub flags: std::collections::HashMap<ConfigLang, FlagsBlock>,
    /// The explicitly pinned builder, if the legacy `builder =` key (or an
    /// equivalent future JSON key) set one.
    pub builder: Option<BuilderKind>,
}
