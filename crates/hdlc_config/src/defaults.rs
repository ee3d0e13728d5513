//! Default compiler flags (§6), applied when a project's JSON config has no
//! per-language `flags` block for the builder/language/scope in question.

use crate::types::{BuilderKind, ConfigLang};

/// Returns the default flags for `(builder, lang)`, applied to both the
/// `single` and `dependencies` scopes alike — the defaults table in §6 does
/// not distinguish scopes, unlike an explicit config's `flags` block.
pub fn default_flags(builder: BuilderKind, lang: ConfigLang) -> &'static [&'static str] {
    match (builder, lang) {
        (BuilderKind::Msim, ConfigLang::Vhdl) => &[
            "-lint",
            "-pedanticerrors",
            "-check_synthesis",
            "-rangecheck",
            "-explicit",
        ],
        (BuilderKind::Msim, ConfigLang::Verilog) | (BuilderKind::Msim, ConfigLang::SystemVerilog) => {
            &["-lint", "-pedanticerrors", "-hazards"]
        }
        (BuilderKind::Ghdl, ConfigLang::Vhdl) => &["-fexplicit", "-frelaxed-rules"],
        (BuilderKind::Ghdl, ConfigLang::Verilog) | (BuilderKind::Ghdl, ConfigLang::SystemVerilog) => &[],
        (BuilderKind::Xvhdl, _) => &[],
        (BuilderKind::Fallback, _) => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msim_vhdl_defaults() {
        assert_eq!(
            default_flags(BuilderKind::Msim, ConfigLang::Vhdl),
            &["-lint", "-pedanticerrors", "-check_synthesis", "-rangecheck", "-explicit"]
        );
    }

    #[test]
    fn ghdl_verilog_has_no_defaults() {
        assert!(default_flags(BuilderKind::Ghdl, ConfigLang::Verilog).is_empty());
    }

    #[test]
    fn xvhdl_has_no_defaults_for_any_language() {
        for lang in [ConfigLang::Vhdl, ConfigLang::Verilog, ConfigLang::SystemVerilog] {
            assert!(default_flags(BuilderKind::Xvhdl, lang).is_empty());
        }
    }
}
