//! The JSON configuration format (§6): `sources`, depth-first `include`
//! expansion with cycle detection, and per-language flag overrides.

use crate::error::ConfigError;
use crate::types::{ConfigLang, FlagsBlock, ResolvedConfig, ResolvedSource};
use hdlc_diagnostics::Diagnostic;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const KNOWN_TOP_KEYS: &[&str] = &["sources", "include", "vhdl", "verilog", "systemverilog"];

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    sources: Vec<RawSourceEntry>,
    #[serde(default)]
    include: Vec<String>,
    vhdl: Option<RawLangBlock>,
    verilog: Option<RawLangBlock>,
    systemverilog: Option<RawLangBlock>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSourceEntry {
    Plain(String),
    WithOptions((String, RawSourceOptions)),
}

#[derive(Deserialize, Default)]
struct RawSourceOptions {
    library: Option<String>,
    #[serde(default)]
    flags: Vec<String>,
}

#[derive(Deserialize)]
struct RawLangBlock {
    flags: RawFlags,
}

#[derive(Deserialize, Default)]
struct RawFlags {
    #[serde(default)]
    single: Vec<String>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    global: Vec<String>,
}

impl From<RawFlags> for FlagsBlock {
    fn from(raw: RawFlags) -> Self {
        FlagsBlock {
            single: raw.single,
            dependencies: raw.dependencies,
            global: raw.global,
        }
    }
}

/// Loads a JSON configuration from `path`, expanding `include`s depth-first.
///
/// Returns the flattened configuration plus any non-fatal diagnostics
/// (unknown keys, glob patterns matching nothing). Literal (non-glob)
/// source paths are always included even if missing from disk — detecting
/// that is the database's job (property 8), not the loader's.
pub fn load_json(path: &Path) -> Result<(ResolvedConfig, Vec<Diagnostic>), ConfigError> {
    let mut out = ResolvedConfig::default();
    let mut diags = Vec::new();
    let mut visited = HashSet::new();
    load_into(path, &mut visited, &mut out, &mut diags)?;
    Ok((out, diags))
}

fn load_into(
    path: &Path,
    visited: &mut HashSet<PathBuf>,
    out: &mut ResolvedConfig,
    diags: &mut Vec<Diagnostic>,
) -> Result<(), ConfigError> {
    let canon = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canon) {
        return Ok(());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;

    if let serde_json::Value::Object(map) = &value {
        for key in map.keys() {
            if !KNOWN_TOP_KEYS.contains(&key.as_str()) {
                diags.push(
                    Diagnostic::warning(path.to_path_buf(), 0, format!("unknown config key '{key}'"))
                        .with_code("unknown-config-key"),
                );
            }
        }
    }

    let raw: RawConfig = serde_json::from_value(value).map_err(|source| ConfigError::Json {
        path: path.display().to_string(),
        source,
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    for include in &raw.include {
        let include_path = resolve_relative(dir, include);
        load_into(&include_path, visited, out, diags)?;
    }

    for entry in raw.sources {
        let (pattern, library, flags) = match entry {
            RawSourceEntry::Plain(p) => (p, None, Vec::new()),
            RawSourceEntry::WithOptions((p, opts)) => (p, opts.library, opts.flags),
        };
        resolve_source(dir, &pattern, library, flags, out, diags, path);
    }

    if let Some(block) = raw.vhdl {
        out.flags.insert(ConfigLang::Vhdl, block.flags.into());
    }
    if let Some(block) = raw.verilog {
        out.flags.insert(ConfigLang::Verilog, block.flags.into());
    }
    if let Some(block) = raw.systemverilog {
        out.flags.insert(ConfigLang::SystemVerilog, block.flags.into());
    }

    Ok(())
}

fn resolve_relative(dir: &Path, entry: &str) -> PathBuf {
    let candidate = Path::new(entry);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        dir.join(candidate)
    }
}

fn resolve_source(
    dir: &Path,
    pattern: &str,
    library: Option<String>,
    flags: Vec<String>,
    out: &mut ResolvedConfig,
    diags: &mut Vec<Diagnostic>,
    config_path: &Path,
) {
    let is_glob = pattern.contains(['*', '?', '[']);
    if !is_glob {
        out.sources.push(ResolvedSource {
            path: resolve_relative(dir, pattern),
            library,
            flags,
        });
        return;
    }

    let full_pattern = resolve_relative(dir, pattern);
    let full_pattern_str = full_pattern.to_string_lossy().to_string();
    match glob::glob(&full_pattern_str) {
        Ok(paths) => {
            let mut matched = false;
            for entry in paths {
                match entry {
                    Ok(p) => {
                        matched = true;
                        out.sources.push(ResolvedSource {
                            path: p,
                            library: library.clone(),
                            flags: flags.clone(),
                        });
                    }
                    Err(_) => continue,
                }
            }
            if !matched {
                diags.push(
                    Diagnostic::warning(
                        config_path.to_path_buf(),
                        0,
                        format!("glob pattern '{pattern}' matched no files"),
                    )
                    .with_code("empty-glob"),
                );
            }
        }
        Err(_) => {
            diags.push(
                Diagnostic::warning(
                    config_path.to_path_buf(),
                    0,
                    format!("invalid glob pattern '{pattern}'"),
                )
                .with_code("invalid-glob"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_plain_and_structured_sources() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.vhd"), "entity a is end;").unwrap();
        fs::write(tmp.path().join("b.vhd"), "entity b is end;").unwrap();
        let cfg_path = tmp.path().join("proj.json");
        fs::write(
            &cfg_path,
            r#"{
                "sources": [
                    "a.vhd",
                    ["b.vhd", {"library": "lib_a", "flags": ["-x"]}]
                ]
            }"#,
        )
        .unwrap();

        let (cfg, diags) = load_json(&cfg_path).unwrap();
        assert!(diags.is_empty());
        assert_eq!(cfg.sources.len(), 2);
        assert_eq!(cfg.sources[1].library.as_deref(), Some("lib_a"));
        assert_eq!(cfg.sources[1].flags, vec!["-x"]);
    }

    #[test]
    fn missing_literal_path_is_kept_not_dropped() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = tmp.path().join("proj.json");
        fs::write(&cfg_path, r#"{"sources": ["missing.vhd"]}"#).unwrap();

        let (cfg, diags) = load_json(&cfg_path).unwrap();
        assert_eq!(cfg.sources.len(), 1, "missing literal paths still pass through to the DB");
        assert!(diags.is_empty());
    }

    #[test]
    fn glob_expands_matching_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.vhd"), "").unwrap();
        fs::write(tmp.path().join("b.vhd"), "").unwrap();
        let cfg_path = tmp.path().join("proj.json");
        fs::write(&cfg_path, r#"{"sources": ["*.vhd"]}"#).unwrap();

        let (cfg, diags) = load_json(&cfg_path).unwrap();
        assert_eq!(cfg.sources.len(), 2);
        assert!(diags.is_empty());
    }

    #[test]
    fn empty_glob_emits_warning_and_drops() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = tmp.path().join("proj.json");
        fs::write(&cfg_path, r#"{"sources": ["*.vhd"]}"#).unwrap();

        let (cfg, diags) = load_json(&cfg_path).unwrap();
        assert!(cfg.sources.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("empty-glob"));
    }

    #[test]
    fn unknown_top_level_key_warns() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = tmp.path().join("proj.json");
        fs::write(&cfg_path, r#"{"sources": [], "mystery": true}"#).unwrap();

        let (_, diags) = load_json(&cfg_path).unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code.as_deref(), Some("unknown-config-key"));
    }

    #[test]
    fn include_is_expanded_depth_first() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("base.vhd"), "").unwrap();
        fs::write(tmp.path().join("top.vhd"), "").unwrap();
        fs::write(
            tmp.path().join("base.json"),
            r#"{"sources": ["base.vhd"]}"#,
        )
        .unwrap();
        let cfg_path = tmp.path().join("proj.json");
        fs::write(
            &cfg_path,
            r#"{"include": ["base.json"], "sources": ["top.vhd"]}"#,
        )
        .unwrap();

        let (cfg, _) = load_json(&cfg_path).unwrap();
        let names: Vec<_> = cfg
            .sources
            .iter()
            .map(|s| s.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["base.vhd", "top.vhd"]);
    }

    #[test]
    fn include_cycle_is_ignored_not_errored() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("a.json"),
            r#"{"include": ["b.json"], "sources": []}"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("b.json"),
            r#"{"include": ["a.json"], "sources": []}"#,
        )
        .unwrap();

        let result = load_json(&tmp.path().join("a.json"));
        assert!(result.is_ok());
    }

    #[test]
    fn language_block_overrides_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = tmp.path().join("proj.json");
        fs::write(
            &cfg_path,
            r#"{"vhdl": {"flags": {"single": ["-custom"], "dependencies": [], "global": []}}}"#,
        )
        .unwrap();

        let (cfg, _) = load_json(&cfg_path).unwrap();
        let block = cfg.flags.get(&ConfigLang::Vhdl).unwrap();
        assert_eq!(block.single, vec!["-custom"]);
    }
}
