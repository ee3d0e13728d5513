//! Project configuration loading: the JSON format (§6) and the legacy
//! line-oriented format, both flattened into one [`ResolvedConfig`] the
//! project engine consumes without caring which format produced it.

#![warn(missing_docs)]

pub mod defaults;
pub mod error;
pub mod json;
pub mod legacy;
pub mod types;

pub use defaults::default_flags;
pub use error::ConfigError;
pub use json::load_json;
pub use legacy::load_legacy;
pub use types::{BuilderKind, ConfigLang, FlagsBlock, ResolvedConfig, ResolvedSource};

use std::path::Path;

/// Loads a project configuration, choosing the JSON or legacy format by the
/// file's extension (`.json` for JSON, anything else for legacy).
pub fn load(path: &Path) -> Result<(ResolvedConfig, Vec<hdlc_diagnostics::Diagnostic>), ConfigError> {
    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        load_json(path)
    } else {
        load_legacy(path).map(|cfg| (cfg, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn dispatches_by_extension() {
        let tmp = TempDir::new().unwrap();
        let json_path = tmp.path().join("proj.json");
        fs::write(&json_path, r#"{"sources": []}"#).unwrap();
        let (cfg, _) = load(&json_path).unwrap();
        assert!(cfg.sources.is_empty());

        let legacy_path = tmp.path().join("proj.cfg");
        fs::write(&legacy_path, "builder = ghdl\n").unwrap();
        let (cfg, _) = load(&legacy_path).unwrap();
        assert_eq!(cfg.builder, Some(BuilderKind::Ghdl));
    }
}
