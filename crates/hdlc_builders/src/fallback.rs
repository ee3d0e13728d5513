//! The no-op fallback adapter, selected when none of Msim/Ghdl/Xvhdl probe
//! as available. It performs no compilation and produces no diagnostics,
//! which is exactly what lets the static checker (C6) keep running when a
//! project has no HDL tool installed at all (property 10).

use crate::{AdapterError, BuildReport, BuilderAdapter, BuilderKind, ProbeResult};
use hdlc_diagnostics::Diagnostic;
use hdlc_model::SourceKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The fallback builder adapter.
pub struct Fallback;

impl BuilderAdapter for Fallback {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Fallback
    }

    fn tool_name(&self) -> &'static str {
        "(none)"
    }

    fn version_args(&self) -> &'static [&'static str] {
        &[]
    }

    fn command_for(&self, _library_dir: &Path, _path: &Path, _kind: SourceKind, _flags: &[String]) -> Command {
        unreachable!("Fallback overrides build() and never constructs a command")
    }

    fn parse_output(&self, _stdout: &str, _stderr: &str) -> Vec<Diagnostic> {
        Vec::new()
    }

    fn probe(&self) -> ProbeResult {
        ProbeResult::Available { version: None }
    }

    fn create_library(&self, root: &Path, library: &str) -> Result<PathBuf, AdapterError> {
        let dir = root.join(library);
        std::fs::create_dir_all(&dir).map_err(|source| AdapterError::CreateLibrary { path: dir.clone(), source })?;
        Ok(dir)
    }

    fn build(&self, root: &Path, _path: &Path, _kind: SourceKind, library: &str, _flags: &[String], _scratch: bool) -> BuildReport {
        let _ = self.create_library(root, library);
        BuildReport::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn never_spawns_a_process() {
        let tmp = TempDir::new().unwrap();
        let report = Fallback.build(tmp.path(), Path::new("foo.vhd"), SourceKind::Vhdl, "lib_a", &[], true);
        assert_eq!(report, BuildReport::empty());
        assert!(tmp.path().join("lib_a").is_dir());
    }
}
