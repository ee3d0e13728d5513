//! The GHDL adapter. GHDL's diagnostic lines are `path:line:col: message`,
//! with an optional `warning:`/`error:` tag right after the column — absent
//! a tag, GHDL treats the message as an error. GHDL prints no rebuild-hint
//! convention, so this adapter relies on [`BuilderAdapter::rebuilds_from`]'s
//! default empty implementation.

use crate::{BuilderAdapter, BuilderKind};
use hdlc_diagnostics::{Diagnostic, Severity};
use hdlc_model::SourceKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The GHDL builder adapter.
pub struct Ghdl;

impl BuilderAdapter for Ghdl {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Ghdl
    }

    fn tool_name(&self) -> &'static str {
        "ghdl"
    }

    fn version_args(&self) -> &'static [&'static str] {
        &["--version"]
    }

    fn command_for(&self, library_dir: &Path, path: &Path, _kind: SourceKind, flags: &[String]) -> Command {
        let mut cmd = Command::new("ghdl");
        cmd.arg("-a");
        cmd.arg(format!("--workdir={}", library_dir.display()));
        if let Some(name) = library_dir.file_name().and_then(|n| n.to_str()) {
            cmd.arg(format!("--work={name}"));
        }
        cmd.args(flags);
        cmd.arg(path);
        cmd
    }

    fn parse_output(&self, stdout: &str, stderr: &str) -> Vec<Diagnostic> {
        stdout.lines().chain(stderr.lines()).filter_map(parse_line).collect()
    }
}

/// Parses one `path:line:col: [warning:|error:] message` line.
fn parse_line(line: &str) -> Option<Diagnostic> {
    let mut parts = line.trim().splitn(4, ':');
    let path = parts.next()?.trim();
    let line_no: u32 = parts.next()?.trim().parse().ok()?;
    let col: u32 = parts.next()?.trim().parse().ok()?;
    let rest = parts.next()?.trim();
    if path.is_empty() {
        return None;
    }

    let (severity, message) = if let Some(m) = rest.strip_prefix("warning:") {
        (Severity::Warning, m.trim())
    } else if let Some(m) = rest.strip_prefix("error:") {
        (Severity::Error, m.trim())
    } else {
        (Severity::Error, rest)
    };
    if message.is_empty() {
        return None;
    }

    Some(Diagnostic::new(
        PathBuf::from(path),
        line_no.saturating_sub(1),
        Some(col.saturating_sub(1)),
        severity,
        None,
        message,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_error_with_no_tag() {
        let diag = parse_line("foo.vhd:12:3: signal x is not declared").unwrap();
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.line, 11);
        assert_eq!(diag.col, Some(2));
    }

    #[test]
    fn honors_warning_tag() {
        let diag = parse_line("foo.vhd:5:1: warning: unused variable y").unwrap();
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, "unused variable y");
    }

    #[test]
    fn garbage_line_is_skipped() {
        assert!(parse_line("ghdl: info: analyzing entity foo").is_none());
    }

    #[test]
    fn command_includes_workdir_and_work_name() {
        let cmd = Ghdl.command_for(Path::new("/work/lib_a"), Path::new("foo.vhd"), SourceKind::Vhdl, &["-fexplicit".to_string()]);
        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert!(args.iter().any(|a| a == "--workdir=/work/lib_a"));
        assert!(args.iter().any(|a| a == "--work=lib_a"));
        assert!(args.iter().any(|a| a == "-fexplicit"));
    }
}
