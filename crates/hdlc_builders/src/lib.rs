//! Builder adapters (C5): a uniform facade over ModelSim, GHDL, and XVHDL as
//! linting back-ends, plus a no-op fallback.
//!
//! Every real adapter shares the same shape: probe the tool's version flag
//! to decide availability, create one working directory per library,
//! compile one file at a time into that directory, and translate the raw
//! stdout/stderr into normalized [`hdlc_diagnostics::Diagnostic`] values. The
//! tool-specific parts (argv, output format) live in the per-adapter
//! modules; everything else — timeout handling, the `scratch` diagnostic
//! filter, keeping partial output from a nonzero exit — is a default method
//! on [`BuilderAdapter`] so the three real adapters don't each reinvent it.

#![warn(missing_docs)]

pub mod error;
pub mod fallback;
pub mod ghdl;
pub mod msim;
pub mod process;
pub mod xvhdl;

pub use error::AdapterError;
pub use fallback::Fallback;
pub use ghdl::Ghdl;
pub use hdlc_config::BuilderKind;
pub use msim::Msim;
pub use xvhdl::Xvhdl;

use hdlc_diagnostics::Diagnostic;
use hdlc_model::SourceKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Default per-adapter compile timeout (§4.4).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for the short `--version` probe, independent of the compile
/// timeout since a hung probe would otherwise stall `configure()`.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// The outcome of [`BuilderAdapter::probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The tool responded to its version flag. `version` is the first
    /// non-empty line of output, if any was produced.
    Available {
        /// The tool's self-reported version string, if parsed.
        version: Option<String>,
    },
    /// The tool could not be invoked or did not respond usefully; `reason`
    /// is a human-readable explanation surfaced as an info diagnostic once
    /// per `configure()` (§7).
    Unavailable(String),
}

impl ProbeResult {
    /// `true` if the tool can be used.
    pub fn is_available(&self) -> bool {
        matches!(self, ProbeResult::Available { .. })
    }
}

/// Adapter-surfaced advice that some other file must be recompiled, found in
/// a completed build's raw output (notably ModelSim's "Recompile X because Y
/// changed" messages).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildHint {
    /// The hint named a design-unit/library name rather than a path; the
    /// engine resolves it through the database's design-unit index.
    UnitName(String),
    /// The hint named a source path directly.
    Path(PathBuf),
}

/// Everything one `build()` call produced: diagnostics plus any rebuild
/// hints extracted from the tool's raw output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Normalized diagnostics from this compile.
    pub diagnostics: Vec<Diagnostic>,
    /// Rebuild hints extracted from the tool's raw output.
    pub rebuild_hints: Vec<RebuildHint>,
}

impl BuildReport {
    /// A report with no diagnostics and no hints — what the fallback
    /// adapter always returns, and what a real adapter returns when a
    /// library could not even be created.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The shared facade every builder adapter implements (§4.4).
///
/// `probe`, `create_library`, and `build` have default implementations built
/// from the adapter-specific `tool_name`/`version_args`/`command_for`/
/// `parse_output`/`rebuilds_from` — a concrete adapter only needs to
/// describe *how it is invoked and how to read its output*, not reimplement
/// timeout handling or the working-directory layout.
pub trait BuilderAdapter {
    /// Which `BuilderKind` this adapter implements.
    fn kind(&self) -> BuilderKind;

    /// The executable name looked up on `PATH`.
    fn tool_name(&self) -> &'static str;

    /// Arguments that make the tool print its version and exit, used by the
    /// default `probe()`.
    fn version_args(&self) -> &'static [&'static str];

    /// Builds the tool-specific command line to compile `path` into the
    /// library rooted at `library_dir`.
    fn command_for(&self, library_dir: &Path, path: &Path, kind: SourceKind, flags: &[String]) -> Command;

    /// Parses raw stdout/stderr into normalized diagnostics.
    fn parse_output(&self, stdout: &str, stderr: &str) -> Vec<Diagnostic>;

    /// Extracts rebuild hints from the tool's raw stdout. Adapters with no
    /// such convention (GHDL, XVHDL) return an empty list.
    fn rebuilds_from(&self, raw_stdout: &str) -> Vec<RebuildHint> {
        let _ = raw_stdout;
        Vec::new()
    }

    /// Invokes the tool with its version flag and classifies the result.
    /// A probe failure (tool missing, non-zero exit, timeout) is never
    /// fatal — it just means this adapter is unavailable.
    fn probe(&self) -> ProbeResult {
        let mut cmd = Command::new(self.tool_name());
        cmd.args(self.version_args());
        match process::run_with_timeout(cmd, PROBE_TIMEOUT) {
            Ok(out) if out.status.success() => {
                ProbeResult::Available { version: first_line(&out.stdout).or_else(|| first_line(&out.stderr)) }
            }
            Ok(out) => ProbeResult::Unavailable(format!("{} exited with {}", self.tool_name(), out.status)),
            Err(process::RunError::Spawn(e)) => {
                ProbeResult::Unavailable(format!("{} not found on PATH: {e}", self.tool_name()))
            }
            Err(process::RunError::TimedOut { .. }) => {
                ProbeResult::Unavailable(format!("{} did not respond to --version in time", self.tool_name()))
            }
            Err(e) => ProbeResult::Unavailable(e.to_string()),
        }
    }

    /// Idempotently creates the per-library working directory under `root`.
    fn create_library(&self, root: &Path, library: &str) -> Result<PathBuf, AdapterError> {
        let dir = root.join(library);
        std::fs::create_dir_all(&dir).map_err(|source| AdapterError::CreateLibrary { path: dir.clone(), source })?;
        Ok(dir)
    }

    /// Compiles `path` into `library`, applying `flags`. `scratch` controls
    /// whether diagnostics referencing `path` itself are kept: `true` when
    /// `path` is the direct compilation target, `false` when it is only
    /// being compiled as someone else's dependency (§4.4).
    fn build(&self, root: &Path, path: &Path, kind: SourceKind, library: &str, flags: &[String], scratch: bool) -> BuildReport {
        let library_dir = match self.create_library(root, library) {
            Ok(dir) => dir,
            Err(_) => return BuildReport::empty(),
        };
        let cmd = self.command_for(&library_dir, path, kind, flags);
        match process::run_with_timeout(cmd, DEFAULT_TIMEOUT) {
            Ok(out) => {
                let mut diagnostics = self.parse_output(&out.stdout, &out.stderr);
                if !scratch {
                    diagnostics.retain(|d| d.path != path);
                }
                let rebuild_hints = self.rebuilds_from(&out.stdout);
                BuildReport { diagnostics, rebuild_hints }
            }
            Err(process::RunError::TimedOut { .. }) => BuildReport {
                diagnostics: vec![Diagnostic::error(
                    path,
                    0,
                    format!("{} timed out after {}s", self.tool_name(), DEFAULT_TIMEOUT.as_secs()),
                )],
                rebuild_hints: Vec::new(),
            },
            Err(_) => BuildReport::empty(),
        }
    }
}

/// Returns the first non-blank line of `text`, trimmed.
fn first_line(text: &str) -> Option<String> {
    text.lines().map(str::trim).find(|l| !l.is_empty()).map(str::to_string)
}

/// Picks an adapter by the engine's preference order `msim > ghdl > xvhdl >
/// fallback` (§4.6), probing each in turn and stopping at the first
/// available one. Always returns something — [`Fallback`] never fails its
/// own probe.
pub fn select_adapter(pinned: Option<BuilderKind>) -> (Box<dyn BuilderAdapter>, ProbeResult) {
    let candidates: Vec<Box<dyn BuilderAdapter>> = match pinned {
        Some(BuilderKind::Msim) => vec![Box::new(Msim)],
        Some(BuilderKind::Ghdl) => vec![Box::new(Ghdl)],
        Some(BuilderKind::Xvhdl) => vec![Box::new(Xvhdl)],
        Some(BuilderKind::Fallback) => vec![Box::new(Fallback)],
        None => vec![Box::new(Msim), Box::new(Ghdl), Box::new(Xvhdl), Box::new(Fallback)],
    };

    let mut last = ProbeResult::Unavailable("no adapter candidates".to_string());
    for candidate in candidates {
        let probe = candidate.probe();
        if probe.is_available() {
            return (candidate, probe);
        }
        last = probe;
    }
    (Box::new(Fallback), last)
}
