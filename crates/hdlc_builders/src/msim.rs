//! The ModelSim adapter. Dispatches to `vcom` for VHDL and `vlog` for
//! Verilog/SystemVerilog; `probe()` checks for `vcom` since the ModelSim
//! suite always ships its VHDL and Verilog front-ends together.
//!
//! Output lines look like `** Error: foo.vhd(12): signal 'x' not found` or
//! `** Warning: foo.vhd(5): ...`; location-less `** Note: ...` lines carry
//! no path to anchor a [`Diagnostic`] at, so they are dropped rather than
//! invented against a placeholder path. ModelSim is also the one adapter
//! that prints rebuild hints: `-- Recompile B because A changed`.

use crate::{BuilderAdapter, BuilderKind, RebuildHint};
use hdlc_diagnostics::{Diagnostic, Severity};
use hdlc_model::SourceKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// The ModelSim builder adapter.
pub struct Msim;

impl BuilderAdapter for Msim {
    fn kind(&self) -> BuilderKind {
        BuilderKind::Msim
    }

    fn tool_name(&self) -> &'static str {
        "vcom"
    }

    fn version_args(&self) -> &'static [&'static str] {
        &["-version"]
    }

    fn command_for(&self, library_dir: &Path, path: &Path, kind: SourceKind, flags: &[String]) -> Command {
        let tool = match kind {
            SourceKind::Vhdl => "vcom",
            SourceKind::Verilog | SourceKind::SystemVerilog => "vlog",
        };
        let mut cmd = Command::new(tool);
        cmd.arg("-work").arg(library_dir);
        cmd.args(flags);
        cmd.arg(path);
        cmd
    }

    fn parse_output(&self, stdout: &str, stderr: &str) -> Vec<Diagnostic> {
        stdout.lines().chain(stderr.lines()).filter_map(parse_line).collect()
    }

    fn rebuilds_from(&self, raw_stdout: &str) -> Vec<RebuildHint> {
        raw_stdout
            .lines()
            .filter_map(|line| {
                let after = line.split_once("Recompile ")?.1;
                let name = after.split(" because").next()?.trim();
                if name.is_empty() {
                    None
                } else {
                    Some(RebuildHint::UnitName(name.to_string()))
                }
            })
            .collect()
    }
}

/// Parses one `** <Level>: <path>(<line>): <message>` line. Lines without a
/// `(line)` location are dropped — there is nothing to anchor them to.
fn parse_line(line: &str) -> Option<Diagnostic> {
    let rest = line.trim().strip_prefix("** ")?;
    let (level, rest) = rest.split_once(':')?;
    let severity = match level {
        "Error" => Severity::Error,
        "Warning" => Severity::Warning,
        "Note" => Severity::Note,
        "Failure" => Severity::Fatal,
        _ => return None,
    };
    let rest = rest.trim_start();

    let open = rest.find('(')?;
    let close = rest[open..].find(')')? + open;
    let path = rest[..open].trim();
    let line_no: u32 = rest[open + 1..close].trim().parse().ok()?;
    let message = rest[close + 1..].trim_start_matches(':').trim();
    if path.is_empty() || message.is_empty() {
        return None;
    }

    Some(Diagnostic::new(PathBuf::from(path), line_no.saturating_sub(1), None, severity, None, message))
}
