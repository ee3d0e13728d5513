//! The project engine (C7): the single object a transport (CLI, LSP, ...)
//! talks to. Owns the database, the chosen builder adapter, and the on-disk
//! cache, and serializes builds behind one mutex while letting read-only
//! queries proceed concurrently (§5).
//!
//! Control flow per `get_diagnostics` call: ensure the database is fresh,
//! plan the target's dependency closure, compile it dependency-first, fold
//! in static-checker and library-inference diagnostics, and repeat the
//! build if the tool's own output hinted that something else needs
//! recompiling (§4.6) — up to a bounded number of times.

#![warn(missing_docs)]

mod error;

pub use error::EngineError;

use hdlc_builders::{BuilderAdapter, Fallback, ProbeResult, RebuildHint};
use hdlc_common::{Identifier, Interner, SourcePath};
use hdlc_config::{BuilderKind, ConfigLang, ResolvedConfig, ResolvedSource};
use hdlc_db::Database;
use hdlc_diagnostics::{dedup_and_sort, Diagnostic, Severity};
use hdlc_model::{DependencyLibrary, Location, SourceKind};
use hdlc_planner::PlanResult;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// Bound on the rebuild-hint retry loop in `get_diagnostics` (§4.6).
const MAX_REBUILD_RETRIES: usize = 20;

/// A resolved `go to definition` target: a declaring file and the source
/// position its declaration sits at.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DefinitionSite {
    /// The file declaring the referenced name.
    pub path: PathBuf,
    /// The declaration's position within `path`.
    pub location: Location,
}

/// The top-level orchestrator for one project root.
///
/// There is exactly one legitimate instance of this type per project (§5's
/// "the engine is the only legitimate process-wide state"); a transport
/// creates one at startup and calls `shutdown` before exiting.
pub struct ProjectEngine {
    interner: Arc<Interner>,
    db: Database,
    adapter: RwLock<Box<dyn BuilderAdapter>>,
    probe: RwLock<ProbeResult>,
    builds_root: RwLock<PathBuf>,
    cache_path: RwLock<Option<PathBuf>>,
    build_lock: Mutex<()>,
    last_plans: RwLock<HashMap<SourcePath, PlanResult>>,
}

impl Default for ProjectEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectEngine {
    /// Creates an engine with an empty database and the no-op fallback
    /// adapter selected. Call [`ProjectEngine::configure`] before issuing
    /// any query.
    pub fn new() -> Self {
        let interner = Arc::new(Interner::new());
        Self {
            db: Database::new(interner.clone()),
            interner,
            adapter: RwLock::new(Box::new(Fallback)),
            probe: RwLock::new(ProbeResult::Available { version: None }),
            builds_root: RwLock::new(PathBuf::new()),
            cache_path: RwLock::new(None),
            build_lock: Mutex::new(()),
            last_plans: RwLock::new(HashMap::new()),
        }
    }

    /// Loads `config_path`, restores whatever cache entries are still
    /// fresh, upserts every resolved source into the database (dropping
    /// any previously known path the new config no longer names), and
    /// selects a builder adapter by availability (`msim > ghdl > xvhdl >
    /// fallback`, or the config's pinned choice). Returns diagnostics from
    /// config loading, the refresh pass, and adapter selection.
    pub fn configure(&self, config_path: &Path) -> Result<Vec<Diagnostic>, EngineError> {
        let (cfg, mut diagnostics) = hdlc_config::load(config_path)?;

        let builds_root = builds_root_for(config_path);
        let cache_path = builds_root.join("cache.bin");
        *self.builds_root.write().unwrap() = builds_root;
        *self.cache_path.write().unwrap() = Some(cache_path.clone());

        hdlc_cache::restore(&self.db, &cache_path, &self.interner);

        let mut wanted = HashSet::new();
        for source in &cfg.sources {
            let Some(path) = self.put_source(&cfg, source) else { continue };
            wanted.insert(path);
        }
        for known in self.db.all_paths() {
            if !wanted.contains(&known) {
                self.db.forget_file(&known);
            }
        }

        let (_changed, refresh_diagnostics) = self.db.refresh();
        diagnostics.extend(refresh_diagnostics);

        let (adapter, probe) = hdlc_builders::select_adapter(cfg.builder);
        if !probe.is_available() {
            diagnostics.push(
                Diagnostic::note(config_path, 0, format!("builder adapter unavailable: {}", probe_reason(&probe)))
                    .with_code("adapter-unavailable"),
            );
        }
        *self.adapter.write().unwrap() = adapter;
        *self.probe.write().unwrap() = probe;

        Ok(diagnostics)
    }

    fn put_source(&self, cfg: &ResolvedConfig, source: &ResolvedSource) -> Option<SourcePath> {
        let ext = source.path.extension()?.to_str()?;
        let kind = SourceKind::from_extension(ext)?;
        let lang = match kind {
            SourceKind::Vhdl => ConfigLang::Vhdl,
            SourceKind::Verilog => ConfigLang::Verilog,
            SourceKind::SystemVerilog => ConfigLang::SystemVerilog,
        };
        let builder = cfg.builder.unwrap_or(BuilderKind::Fallback);
        let (flags_single, flags_dependencies) = resolve_flags(cfg, builder, lang, source);
        let library = source.library.as_deref().map(|name| {
            if kind.is_case_insensitive() {
                Identifier::case_insensitive(&self.interner, name)
            } else {
                Identifier::case_sensitive(&self.interner, name)
            }
        });
        let path = SourcePath::capture(&source.path).unwrap_or_else(|_| SourcePath::missing(&source.path));
        self.db.put_file(path.clone(), kind, library, flags_single, flags_dependencies);
        Some(path)
    }

    /// Looks up `path` as a currently-known source. `SourcePath` equality
    /// ignores its captured mtime, so a freshly captured value is a valid
    /// database key regardless of which call originally registered it.
    fn resolve_known_path(&self, path: &Path) -> Result<SourcePath, EngineError> {
        let candidate = SourcePath::capture(path).unwrap_or_else(|_| SourcePath::missing(path));
        if self.db.get(&candidate).is_none() {
            return Err(EngineError::UnknownPath { path: path.to_path_buf() });
        }
        Ok(candidate)
    }

    /// Ensures the database is fresh, plans `path`'s dependency closure,
    /// compiles it dependency-first, folds in static-checker and
    /// library/dependency-resolution diagnostics, and repeats the build
    /// while the tool keeps hinting at files to recompile (bounded at
    /// [`MAX_REBUILD_RETRIES`]). If a build reports a `Fatal` diagnostic
    /// (§6: "any Fatal surface ... halts the run"), compilation of the
    /// remaining plan stops immediately and the static checker does not
    /// run for this call. Returns the merged, deduplicated, stably-sorted
    /// diagnostic list (§5's ordering guarantee).
    pub fn get_diagnostics(&self, path: &Path) -> Result<Vec<Diagnostic>, EngineError> {
        let _guard = self.build_lock.lock().unwrap();
        let target = self.resolve_known_path(path)?;

        self.db.refresh();

        let plan = hdlc_planner::plan(&target, &self.db, &self.interner);
        let mut diagnostics = plan.diagnostics.clone();
        for unresolved in &plan.unresolved {
            diagnostics.push(
                Diagnostic::error(
                    unresolved.owner.as_path(),
                    unresolved.location.line,
                    format!(
                        "unresolved dependency on '{}.{}'",
                        unresolved.library.render(&self.interner),
                        unresolved.name.render(&self.interner),
                    ),
                )
                .with_col(unresolved.location.col)
                .with_code("unresolved-dependency"),
            );
        }

        let mut halted = false;
        {
            let adapter = self.adapter.read().unwrap();
            let builds_root = self.builds_root.read().unwrap().clone();
            let mut pending: HashSet<SourcePath> = plan.order.iter().cloned().collect();

            'retry: for attempt in 0..MAX_REBUILD_RETRIES {
                if pending.is_empty() {
                    break;
                }
                let mut hints = Vec::new();
                for file_path in &plan.order {
                    if !pending.contains(file_path) {
                        continue;
                    }
                    let Some(file) = self.db.get(file_path) else { continue };
                    let library = self.db.library_of(file_path);
                    let is_target = file_path == &target;
                    let flags = if is_target { &file.flags_single } else { &file.flags_dependencies };
                    let report = adapter.build(
                        &builds_root,
                        file_path.as_path(),
                        file.kind,
                        library.render(&self.interner),
                        flags,
                        is_target,
                    );
                    let hit_fatal = report.diagnostics.iter().any(|d| d.severity == Severity::Fatal);
                    diagnostics.extend(report.diagnostics);
                    if hit_fatal {
                        halted = true;
                        break 'retry;
                    }
                    hints.extend(report.rebuild_hints);
                }

                pending = self.resolve_rebuild_hints(&hints, &plan.order);
                if attempt + 1 == MAX_REBUILD_RETRIES && !pending.is_empty() {
                    eprintln!(
                        "get_diagnostics({}): rebuild-hint loop exceeded {MAX_REBUILD_RETRIES} retries, returning last result",
                        target
                    );
                }
            }
        }

        if !halted {
            for file_path in &plan.order {
                if let Some(diag) = self.db.library_diagnostic_for(file_path) {
                    diagnostics.push(diag);
                }
                if let Some(file) = self.db.get(file_path) {
                    if let Ok(text) = std::fs::read_to_string(file_path.as_path()) {
                        diagnostics.extend(hdlc_checker::check_file(file_path.as_path(), file.kind, &text));
                    }
                }
            }
        }

        self.last_plans.write().unwrap().insert(target, plan);
        Ok(dedup_and_sort(diagnostics))
    }

    /// Resolves each rebuild hint to a concrete, currently-planned path: a
    /// `Path` hint is used directly, a `UnitName` hint is matched against
    /// every design unit declared by a file in `order`.
    fn resolve_rebuild_hints(&self, hints: &[RebuildHint], order: &[SourcePath]) -> HashSet<SourcePath> {
        let mut out = HashSet::new();
        for hint in hints {
            match hint {
                RebuildHint::Path(p) => {
                    if let Ok(found) = SourcePath::capture(p) {
                        out.insert(found);
                    }
                }
                RebuildHint::UnitName(name) => {
                    for candidate in order {
                        let Some(file) = self.db.get(candidate) else { continue };
                        if file.design_units.iter().any(|u| u.name.render(&self.interner).eq_ignore_ascii_case(name)) {
                            out.insert(candidate.clone());
                        }
                    }
                }
            }
        }
        out
    }

    /// Finds the reference at `pos` in `path` (a dependency use or a
    /// design-unit declaration) and returns every location declaring it.
    pub fn get_definition(&self, path: &Path, pos: Location) -> Result<Vec<DefinitionSite>, EngineError> {
        let target = self.resolve_known_path(path)?;
        let Some(file) = self.db.get(&target) else { return Ok(Vec::new()) };

        for dep in &file.dependencies {
            if !dep.locations.contains(&pos) {
                continue;
            }
            let library = match dep.library {
                DependencyLibrary::Named(l) => l,
                DependencyLibrary::Work => self.db.library_of(&target),
            };
            let mut sites = Vec::new();
            for owner in self.db.paths_by_design_unit(library, dep.name) {
                let Some(owner_file) = self.db.get(&owner) else { continue };
                for unit in owner_file.design_units.iter().filter(|u| u.name == dep.name) {
                    for loc in &unit.locations {
                        sites.push(DefinitionSite { path: owner.as_path().to_path_buf(), location: *loc });
                    }
                }
            }
            sites.sort_by(|a, b| (a.path.as_path(), a.location).cmp(&(b.path.as_path(), b.location)));
            return Ok(sites);
        }

        for unit in &file.design_units {
            if unit.locations.contains(&pos) {
                return Ok(unit
                    .locations
                    .iter()
                    .map(|loc| DefinitionSite { path: target.as_path().to_path_buf(), location: *loc })
                    .collect());
            }
        }

        Ok(Vec::new())
    }

    /// Describes the symbol at `pos` in `path`: for a dependency, the
    /// library it resolved to and its declaring file; for a design unit,
    /// the last planned compilation order for this file and every step's
    /// library (recomputed if no plan has been cached yet).
    pub fn get_hover(&self, path: &Path, pos: Location) -> Result<String, EngineError> {
        let target = self.resolve_known_path(path)?;
        let Some(file) = self.db.get(&target) else { return Ok(String::new()) };

        for dep in &file.dependencies {
            if !dep.locations.contains(&pos) {
                continue;
            }
            let library = match dep.library {
                DependencyLibrary::Named(l) => l,
                DependencyLibrary::Work => self.db.library_of(&target),
            };
            let owners = self.db.paths_by_design_unit(library, dep.name);
            return Ok(match owners.first() {
                Some(owner) => format!("library {}: declared in {}", library.render(&self.interner), owner),
                None => format!("library {}: unresolved", library.render(&self.interner)),
            });
        }

        for unit in &file.design_units {
            if !unit.locations.contains(&pos) {
                continue;
            }
            let cached_order = self.last_plans.read().unwrap().get(&target).map(|p| p.order.clone());
            let order = match cached_order {
                Some(order) => order,
                None => hdlc_planner::plan(&target, &self.db, &self.interner).order,
            };
            let mut lines = vec![format!("compilation order for {target}:")];
            for step in &order {
                lines.push(format!("  {step} ({})", self.db.library_of(step).render(&self.interner)));
            }
            return Ok(lines.join("\n"));
        }

        Ok(String::new())
    }

    /// Flushes the database's current contents to the on-disk cache, if
    /// [`ProjectEngine::configure`] has been called at least once.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        if let Some(cache_path) = self.cache_path.read().unwrap().clone() {
            hdlc_cache::save(&cache_path, &self.db, &self.interner)?;
        }
        Ok(())
    }
}

/// Combines a language's configured flag block with §6's per-(builder,
/// language) defaults, falling back to the defaults entirely when the
/// config supplied no flags block at all for this language.
fn resolve_flags(
    cfg: &ResolvedConfig,
    builder: BuilderKind,
    lang: ConfigLang,
    source: &ResolvedSource,
) -> (Vec<String>, Vec<String>) {
    let block = cfg.flags.get(&lang);
    let has_explicit = block.is_some_and(|b| !b.single.is_empty() || !b.dependencies.is_empty() || !b.global.is_empty());

    let (mut single, mut dependencies) = if has_explicit {
        let b = block.unwrap();
        let mut single = b.single.clone();
        single.extend(b.global.iter().cloned());
        let mut dependencies = b.dependencies.clone();
        dependencies.extend(b.global.iter().cloned());
        (single, dependencies)
    } else {
        let defaults: Vec<String> = hdlc_config::default_flags(builder, lang).iter().map(|s| s.to_string()).collect();
        (defaults.clone(), defaults)
    };

    single.extend(source.flags.iter().cloned());
    dependencies.extend(source.flags.iter().cloned());
    (single, dependencies)
}

fn probe_reason(probe: &ProbeResult) -> String {
    match probe {
        ProbeResult::Available { .. } => String::new(),
        ProbeResult::Unavailable(reason) => reason.clone(),
    }
}

/// The builder working-directory root for a project: a hidden directory
/// beside the config file, namespaced by the cache's schema tag so a
/// schema bump never reuses a stale layout (§4.4).
fn builds_root_for(config_path: &Path) -> PathBuf {
    let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!(".hdlc_checker-{}", hdlc_cache::SCHEMA_TAG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_project(tmp: &TempDir) -> PathBuf {
        fs::write(
            tmp.path().join("pkg.vhd"),
            "package p is\nend package p;",
        )
        .unwrap();
        fs::write(
            tmp.path().join("user.vhd"),
            "library lib_a;\nuse lib_a.p.all;\n-- TODO: tighten this up\nentity user is\nend entity user;",
        )
        .unwrap();

        let cfg_path = tmp.path().join("proj.cfg");
        fs::write(
            &cfg_path,
            "builder = fallback\nvhdl lib_a pkg.vhd\nvhdl lib_a user.vhd\n",
        )
        .unwrap();
        cfg_path
    }

    #[test]
    fn configure_then_get_diagnostics_includes_tag_check() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = write_project(&tmp);

        let engine = ProjectEngine::new();
        let configure_diags = engine.configure(&cfg_path).unwrap();
        assert!(configure_diags.is_empty(), "a clean fallback project configures without diagnostics");

        let user_path = tmp.path().join("user.vhd");
        let diagnostics = engine.get_diagnostics(&user_path).unwrap();
        assert!(diagnostics.iter().any(|d| d.code.as_deref() == Some("TODO")));
    }

    #[test]
    fn get_diagnostics_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = write_project(&tmp);
        let engine = ProjectEngine::new();
        engine.configure(&cfg_path).unwrap();

        let user_path = tmp.path().join("user.vhd");
        let first = engine.get_diagnostics(&user_path).unwrap();
        let second = engine.get_diagnostics(&user_path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn get_diagnostics_on_unknown_path_errors() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = write_project(&tmp);
        let engine = ProjectEngine::new();
        engine.configure(&cfg_path).unwrap();

        let err = engine.get_diagnostics(&tmp.path().join("nope.vhd")).unwrap_err();
        assert!(matches!(err, EngineError::UnknownPath { .. }));
    }

    #[test]
    fn get_definition_resolves_dependency_to_declaring_package() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = write_project(&tmp);
        let engine = ProjectEngine::new();
        engine.configure(&cfg_path).unwrap();

        let user_path = tmp.path().join("user.vhd");
        // `use lib_a.p.all;` is the second line (0-based line 1).
        let sites = engine.get_definition(&user_path, Location::new(1, 10)).unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].path, tmp.path().join("pkg.vhd"));
    }

    #[test]
    fn shutdown_then_restore_skips_reparsing() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = write_project(&tmp);

        let engine = ProjectEngine::new();
        engine.configure(&cfg_path).unwrap();
        let user_path = tmp.path().join("user.vhd");
        engine.get_diagnostics(&user_path).unwrap();
        engine.shutdown().unwrap();

        let cache_path = builds_root_for(&cfg_path).join("cache.bin");
        assert!(cache_path.exists());

        let second_engine = ProjectEngine::new();
        second_engine.configure(&cfg_path).unwrap();
        let diagnostics = second_engine.get_diagnostics(&user_path).unwrap();
        assert!(diagnostics.iter().any(|d| d.code.as_deref() == Some("TODO")));
    }

    /// A builder stand-in that reports a `Fatal` diagnostic on the first
    /// file it is asked to build, regardless of which file that is.
    struct FatalAdapter;

    impl BuilderAdapter for FatalAdapter {
        fn kind(&self) -> BuilderKind {
            BuilderKind::Fallback
        }

        fn tool_name(&self) -> &'static str {
            "fatal-test-adapter"
        }

        fn version_args(&self) -> &'static [&'static str] {
            &[]
        }

        fn command_for(&self, _library_dir: &Path, _path: &Path, _kind: SourceKind, _flags: &[String]) -> std::process::Command {
            std::process::Command::new("true")
        }

        fn parse_output(&self, _stdout: &str, _stderr: &str) -> Vec<Diagnostic> {
            Vec::new()
        }

        fn build(
            &self,
            _root: &Path,
            path: &Path,
            _kind: SourceKind,
            _library: &str,
            _flags: &[String],
            _scratch: bool,
        ) -> hdlc_builders::BuildReport {
            hdlc_builders::BuildReport {
                diagnostics: vec![Diagnostic::new(path, 0, None, Severity::Fatal, None, "tool crashed")],
                rebuild_hints: Vec::new(),
            }
        }
    }

    #[test]
    fn get_diagnostics_halts_on_fatal_and_skips_static_checks() {
        let tmp = TempDir::new().unwrap();
        let cfg_path = write_project(&tmp);
        let engine = ProjectEngine::new();
        engine.configure(&cfg_path).unwrap();
        *engine.adapter.write().unwrap() = Box::new(FatalAdapter);

        let user_path = tmp.path().join("user.vhd");
        let diagnostics = engine.get_diagnostics(&user_path).unwrap();

        assert!(diagnostics.iter().any(|d| d.severity == Severity::Fatal));
        // `user.vhd`'s "-- TODO: tighten this up" comment would normally
        // surface a TODO diagnostic from the static checker; a Fatal build
        // result halts the run before that checker ever runs.
        assert!(!diagnostics.iter().any(|d| d.code.as_deref() == Some("TODO")));
    }
}
