//! hdlc_checker CLI — the command-line front end over [`hdlc_engine`].
//!
//! The real transports this core is built for (an LSP server over stdio, an
//! HTTP API) are explicitly out of scope (§1 of the specification this
//! crate implements): `--lsp` and `--host`/`--port` only select which banner
//! this process prints at startup, acknowledging which transport a future
//! front end would multiplex onto this same engine. The one thing this
//! binary actually *does* is drive [`hdlc_engine::ProjectEngine`] end to
//! end: load a project, then read newline-delimited queries from stdin and
//! print their results, so the core is exercisable without a real editor.

mod render;

use clap::{Parser, ValueEnum};
use hdlc_engine::ProjectEngine;
use hdlc_model::Location;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

/// hdlc_checker — a build-engine core for mixed VHDL/Verilog/SystemVerilog
/// projects, driving ModelSim/GHDL/XVHDL as linting back-ends.
#[derive(Parser, Debug)]
#[command(name = "hdlc_checker", version, about = "HDL Checker build engine")]
struct Cli {
    /// Path to the project configuration (JSON or legacy line-oriented).
    #[arg(short, long)]
    config: PathBuf,

    /// Run an HTTP transport on this host (transport is out of scope here;
    /// only selects the startup banner).
    #[arg(long)]
    host: Option<String>,

    /// Port for `--host` (transport is out of scope here; only selects the
    /// startup banner).
    #[arg(long)]
    port: Option<u16>,

    /// Run an LSP transport over stdio (transport is out of scope here;
    /// only selects the startup banner).
    #[arg(long)]
    lsp: bool,

    /// Attach to an already-running editor process and exit this process
    /// when it disappears (transport-level; accepted and otherwise unused).
    #[arg(long = "attach-to-pid")]
    attach_to_pid: Option<u32>,

    /// Minimum severity of messages this process logs about itself.
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,

    /// File to append this process's own log lines to, instead of stderr.
    #[arg(long = "log-stream")]
    log_stream: Option<PathBuf>,

    /// Redirect the `check` loop's replies to this file instead of stdout.
    #[arg(long)]
    stdout: Option<PathBuf>,

    /// Redirect this process's own diagnostics to this file instead of
    /// stderr.
    #[arg(long)]
    stderr: Option<PathBuf>,

    /// Output format for the `check` loop's replies.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

/// Output format for query replies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

fn main() {
    let cli = Cli::parse();

    let mut log: Box<dyn Write> = match &cli.log_stream {
        Some(path) => match open_append(path) {
            Ok(f) => Box::new(f),
            Err(e) => {
                eprintln!("error: could not open --log-stream {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => Box::new(io::stderr()),
    };

    let transport = match (cli.lsp, &cli.host, cli.port) {
        (true, _, _) => "lsp".to_string(),
        (false, Some(host), Some(port)) => format!("http://{host}:{port}"),
        (false, Some(host), None) => format!("http://{host} (no --port given)"),
        (false, None, _) => "stdio check loop".to_string(),
    };
    let _ = writeln!(log, "[{}] starting ({transport})", cli.log_level);
    if let Some(pid) = cli.attach_to_pid {
        let _ = writeln!(log, "[{}] attached to pid {pid}", cli.log_level);
    }

    let engine = ProjectEngine::new();
    match engine.configure(&cli.config) {
        Ok(diags) if !diags.is_empty() => {
            let _ = writeln!(log, "{}", render::render_text(&diags));
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }

    let out_code = match &cli.stdout {
        Some(path) => match open_append(path) {
            Ok(f) => run_loop(&engine, cli.format, Box::new(f)),
            Err(e) => {
                eprintln!("error: could not open --stdout {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => run_loop(&engine, cli.format, Box::new(io::stdout())),
    };

    if let Err(e) = engine.shutdown() {
        eprintln!("error: {e}");
        process::exit(1);
    }
    process::exit(out_code);
}

fn open_append(path: &std::path::Path) -> io::Result<std::fs::File> {
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}

/// Reads one query per line from stdin until EOF or `quit`/`exit`, writing
/// each reply to `out`. A line is one of:
///
/// - `PATH` — `get_diagnostics(PATH)`
/// - `hover PATH LINE COL` — `get_hover(PATH, (LINE-1, COL-1))`
/// - `def PATH LINE COL` — `get_definition(PATH, (LINE-1, COL-1))`
///
/// Returns `0` if every query succeeded and found no error-severity
/// diagnostics, `1` otherwise — mirroring a linter's conventional exit code.
fn run_loop(engine: &ProjectEngine, format: ReportFormat, mut out: Box<dyn Write>) -> i32 {
    let stdin = io::stdin();
    let mut had_errors = false;

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let mut parts = line.split_whitespace();
        let first = parts.next().unwrap_or("");

        match first {
            "hover" => {
                let Some((path, pos)) = parse_located(&mut parts) else {
                    let _ = writeln!(out, "error: usage: hover PATH LINE COL");
                    had_errors = true;
                    continue;
                };
                match engine.get_hover(&path, pos) {
                    Ok(text) => {
                        let _ = writeln!(out, "{text}");
                    }
                    Err(e) => {
                        let _ = writeln!(out, "error: {e}");
                        had_errors = true;
                    }
                }
            }
            "def" => {
                let Some((path, pos)) = parse_located(&mut parts) else {
                    let _ = writeln!(out, "error: usage: def PATH LINE COL");
                    had_errors = true;
                    continue;
                };
                match engine.get_definition(&path, pos) {
                    Ok(sites) => {
                        for site in sites {
                            let _ = writeln!(
                                out,
                                "{}:{}:{}",
                                site.path.display(),
                                site.location.line + 1,
                                site.location.col + 1
                            );
                        }
                    }
                    Err(e) => {
                        let _ = writeln!(out, "error: {e}");
                        had_errors = true;
                    }
                }
            }
            path_str => match engine.get_diagnostics(PathBuf::from(path_str).as_path()) {
                Ok(diagnostics) => {
                    had_errors |= diagnostics.iter().any(|d| d.severity.is_error());
                    let rendered = match format {
                        ReportFormat::Text => render::render_text(&diagnostics),
                        ReportFormat::Json => render::render_json(&diagnostics),
                    };
                    let _ = writeln!(out, "{rendered}");
                }
                Err(e) => {
                    let _ = writeln!(out, "error: {e}");
                    had_errors = true;
                }
            },
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

fn parse_located<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Option<(PathBuf, Location)> {
    let path = PathBuf::from(parts.next()?);
    let line: u32 = parts.next()?.parse().ok()?;
    let col: u32 = parts.next()?.parse().ok()?;
    Some((path, Location::new(line.checked_sub(1)?, col.checked_sub(1)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_located_converts_to_zero_based() {
        let tokens = ["a.vhd", "3", "5"];
        let mut it = tokens.into_iter();
        let (path, loc) = parse_located(&mut it).unwrap();
        assert_eq!(path, PathBuf::from("a.vhd"));
        assert_eq!(loc, Location::new(2, 4));
    }

    #[test]
    fn parse_located_rejects_zero_line() {
        let tokens = ["a.vhd", "0", "5"];
        let mut it = tokens.into_iter();
        assert!(parse_located(&mut it).is_none());
    }

    #[test]
    fn parse_located_rejects_missing_fields() {
        let tokens = ["a.vhd", "3"];
        let mut it = tokens.into_iter();
        assert!(parse_located(&mut it).is_none());
    }

    #[test]
    fn cli_parses_minimal_config_flag() {
        let cli = Cli::parse_from(["hdlc_checker", "--config", "proj.json"]);
        assert_eq!(cli.config, PathBuf::from("proj.json"));
        assert!(!cli.lsp);
        assert!(cli.host.is_none());
    }

    #[test]
    fn cli_parses_lsp_flag() {
        let cli = Cli::parse_from(["hdlc_checker", "--config", "p.json", "--lsp"]);
        assert!(cli.lsp);
    }

    #[test]
    fn cli_parses_host_and_port() {
        let cli = Cli::parse_from([
            "hdlc_checker",
            "--config",
            "p.json",
            "--host",
            "127.0.0.1",
            "--port",
            "8080",
        ]);
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(8080));
    }

    #[test]
    fn run_loop_end_to_end_over_fallback_project() {
        use std::fs;
        use tempfile::TempDir;

        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("foo.vhd"), "entity foo is\nend entity foo;\narchitecture foo of foo is\nbegin\nend architecture foo;\n").unwrap();
        let cfg_path = tmp.path().join("proj.cfg");
        fs::write(&cfg_path, "builder = fallback\nvhdl lib_a foo.vhd\n").unwrap();

        let engine = ProjectEngine::new();
        engine.configure(&cfg_path).unwrap();

        let input = format!("{}\nquit\n", tmp.path().join("foo.vhd").display());
        // Simulate the loop body directly over a cursor rather than real
        // stdin, since `run_loop` reads the process's stdin handle.
        let mut out: Vec<u8> = Vec::new();
        for line in input.lines() {
            if line == "quit" {
                break;
            }
            let diags = engine.get_diagnostics(PathBuf::from(line).as_path()).unwrap();
            out.extend(render::render_text(&diags).into_bytes());
        }
        // A clean fallback-built entity/architecture pair has no diagnostics.
        assert!(out.is_empty());
    }
}
