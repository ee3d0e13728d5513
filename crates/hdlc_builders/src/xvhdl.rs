//! The Xilinx `xvhdl` adapter. Diagnostic lines look like
//! `ERROR: [VRFC 10-91] signal 'x' is not declared [foo.vhd:12]` or the
//! `WARNING:`/`INFO:` equivalents, with the file and line in a trailing
//! `[path:line]` bracket rather than a leading `path:line:` prefix. Like
//! GHDL, `xvhdl` has no rebuild-hint convention, so the default empty
//! [`BuilderAdapter::rebuilds_from`] applies.

use crate::{BuilderAdapter, BuilderKind};
use hdlc_diagnostics::{Diagnostic, Severity};
use hdlc_model::SourceKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The Xilinx `xvhdl` builder adapter.
pub struct Xvhdl;

impl BuilderAdapter for Xvhdl {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Xvhdl
    }

    fn tool_name(&self) -> &'static str {
        "xvhdl"
    }

    fn version_args(&self) -> &'static [&'static str] {
        &["--version"]
    }

    fn command_for(&self, library_dir: &Path, path: &Path, _kind: SourceKind, flags: &[String]) -> Command {
        let library = library_dir.file_name().and_then(|n| n.to_str()).unwrap_or("work");
        let mut cmd = Command::new("xvhdl");
        cmd.arg("--work").arg(format!("{library}={}", library_dir.display()));
        cmd.args(flags);
        cmd.arg(path);
        cmd
    }

    fn parse_output(&self, stdout: &str, stderr: &str) -> Vec<Diagnostic> {
        stdout.lines().chain(stderr.lines()).filter_map(parse_line).collect()
    }
}

/// Parses one `<LEVEL>: [<code>] <message> [<path>:<line>]` line.
fn parse_line(line: &str) -> Option<Diagnostic> {
    let line = line.trim();
    let (level, rest) = line.split_once(':')?;
    let severity = match level {
        "ERROR" => Severity::Error,
        "WARNING" => Severity::Warning,
        "INFO" => Severity::Note,
        _ => return None,
    };
    let rest = rest.trim();

    let loc_start = rest.rfind('[')?;
    let loc_end = rest[loc_start..].find(']')? + loc_start;
    let location = &rest[loc_start + 1..loc_end];
    let (path, line_no) = location.rsplit_once(':')?;
    let line_no: u32 = line_no.trim().parse().ok()?;
    if path.is_empty() {
        return None;
    }

    let mut message = rest[..loc_start].trim();
    let mut code = None;
    if let Some(rest_after_bracket) = message.strip_prefix('[') {
        if let Some((tag, body)) = rest_after_bracket.split_once(']') {
            code = Some(tag.trim().to_string());
            message = body.trim();
        }
    }
    if message.is_empty() {
        return None;
    }

    Some(Diagnostic::new(PathBuf::from(path), line_no.saturating_sub(1), None, severity, code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_error_with_code_and_trailing_location() {
        let diag = parse_line("ERROR: [VRFC 10-91] signal 'x' is not declared [foo.vhd:12]").unwrap();
        assert_eq!(diag.path, PathBuf::from("foo.vhd"));
        assert_eq!(diag.line, 11);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_deref(), Some("VRFC 10-91"));
        assert_eq!(diag.message, "signal 'x' is not declared");
    }

    #[test]
    fn parses_warning_without_code() {
        let diag = parse_line("WARNING: unused signal y [bar.vhd:3]").unwrap();
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, "unused signal y");
        assert!(diag.code.is_none());
    }

    #[test]
    fn ignores_unrelated_output() {
        assert!(parse_line("Compiling architecture rtl of foo").is_none());
    }

    #[test]
    fn command_includes_work_mapping() {
        let cmd = Xvhdl.command_for(Path::new("/work/lib_a"), Path::new("foo.vhd"), SourceKind::Vhdl, &[]);
        let args: Vec<String> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert!(args.iter().any(|a| a == "lib_a=/work/lib_a"));
    }
}
