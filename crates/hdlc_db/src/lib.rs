//! The in-memory project database (C3): indexes every known path's parsed
//! source, resolves design-unit references to declaring paths, and infers
//! libraries for files configuration left unassigned.
//!
//! All public methods take either the read or write half of a single
//! `RwLock`, giving single-writer/multiple-reader semantics (§5) without
//! additional synchronization machinery — concurrent `get_definition`/
//! `get_hover` queries never block on each other, only on a `refresh()` or
//! a mutating call.

#![warn(missing_docs)]

pub mod inference;

use hdlc_common::{Identifier, Interner, SourcePath};
use hdlc_diagnostics::Diagnostic;
use hdlc_model::{SourceFile, SourceKind};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

struct Inner {
    files: HashMap<SourcePath, SourceFile>,
    /// Paths whose library was set directly by configuration, as opposed to
    /// inferred — the only evidence [`inference::infer`] considers.
    explicit_library: HashSet<SourcePath>,
    /// `(library, design-unit name) -> declaring paths`, rebuilt after every
    /// mutation. Sorted by path so multi-candidate resolution (§4.3 rule 1)
    /// is deterministic.
    design_unit_index: HashMap<(Identifier, Identifier), Vec<SourcePath>>,
}

impl Inner {
    fn new() -> Self {
        Self {
            files: HashMap::new(),
            explicit_library: HashSet::new(),
            design_unit_index: HashMap::new(),
        }
    }

    /// Resets every non-explicit file's library to `None`, then re-runs
    /// inference and rebuilds the design-unit index. Called at the end of
    /// every mutating batch (`put_file`, `forget_file`, `refresh`).
    fn reconcile(&mut self, interner: &Interner) {
        for (path, file) in self.files.iter_mut() {
            if !self.explicit_library.contains(path) {
                file.library = None;
            }
        }
        let assignment = inference::infer(&self.files, &self.explicit_library, interner);
        for (path, lib) in assignment {
            if let Some(file) = self.files.get_mut(&path) {
                file.library = Some(lib);
            }
        }

        self.design_unit_index.clear();
        for (path, file) in &self.files {
            let Some(lib) = file.library else { continue };
            for unit in &file.design_units {
                self.design_unit_index
                    .entry((lib, unit.name))
                    .or_default()
                    .push(path.clone());
            }
        }
        for paths in self.design_unit_index.values_mut() {
            paths.sort();
            paths.dedup();
        }
    }
}

/// The project-wide source database.
pub struct Database {
    interner: Arc<Interner>,
    inner: RwLock<Inner>,
}

impl Database {
    /// Creates an empty database sharing `interner` with every parser and
    /// query caller.
    pub fn new(interner: Arc<Interner>) -> Self {
        Self {
            interner,
            inner: RwLock::new(Inner::new()),
        }
    }

    /// The shared interner every identifier in this database was created
    /// against.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Inserts or updates a known path. Idempotent: calling this again for
    /// the same path replaces its kind/library/flags but never touches its
    /// parsed artifacts — those are only replaced by [`Database::refresh`].
    pub fn put_file(
        &self,
        path: SourcePath,
        kind: SourceKind,
        library: Option<Identifier>,
        flags_single: Vec<String>,
        flags_dependencies: Vec<String>,
    ) {
        let mut inner = self.inner.write().unwrap();
        let entry = inner
            .files
            .entry(path.clone())
            .or_insert_with(|| SourceFile::new(path.clone(), kind));
        entry.kind = kind;
        entry.flags_single = flags_single;
        entry.flags_dependencies = flags_dependencies;
        if let Some(lib) = library {
            entry.library = Some(lib);
            inner.explicit_library.insert(path);
        } else {
            inner.explicit_library.remove(&path);
        }
        inner.reconcile(&self.interner);
    }

    /// Inserts a fully-parsed file directly, skipping a re-parse.
    ///
    /// Used by `hdlc_cache` when restoring a cached [`SourceFile`] whose
    /// captured mtime/size still matches the file on disk (§4.7) — the
    /// cache already holds the design units/dependencies a fresh parse
    /// would produce, so there is no reason to re-read and re-scan the
    /// file at startup. `explicit_library` mirrors the flag `put_file`
    /// would have been called with, so later reconciliation treats the
    /// restored library the same way either path produces.
    pub fn restore_parsed(&self, file: SourceFile, explicit_library: bool) {
        let mut inner = self.inner.write().unwrap();
        let path = file.path.clone();
        if explicit_library {
            inner.explicit_library.insert(path.clone());
        } else {
            inner.explicit_library.remove(&path);
        }
        inner.files.insert(path, file);
        inner.reconcile(&self.interner);
    }

    /// Removes a path and every piece of derived state it owned.
    pub fn forget_file(&self, path: &SourcePath) {
        let mut inner = self.inner.write().unwrap();
        inner.files.remove(path);
        inner.explicit_library.remove(path);
        inner.reconcile(&self.interner);
    }

    /// Resolves the declaring paths for `(library, name)`. `library` must
    /// already be a concrete identifier — resolving the VHDL `work`
    /// sentinel against a particular referencing file is the caller's
    /// (`hdlc_planner`'s) job, since it depends on *which* file asks.
    pub fn paths_by_design_unit(&self, library: Identifier, name: Identifier) -> Vec<SourcePath> {
        let inner = self.inner.read().unwrap();
        inner
            .design_unit_index
            .get(&(library, name))
            .cloned()
            .unwrap_or_default()
    }

    /// Resolves the library a path is assigned to, inferring lazily if
    /// necessary. Returns the sentinel
    /// [`inference::UNRESOLVED_LIBRARY`] identifier if the path is unknown
    /// or could not be placed by any rule.
    pub fn library_of(&self, path: &SourcePath) -> Identifier {
        let inner = self.inner.read().unwrap();
        inner
            .files
            .get(path)
            .and_then(|f| f.library)
            .unwrap_or_else(|| Identifier::case_insensitive(&self.interner, inference::UNRESOLVED_LIBRARY))
    }

    /// Returns a diagnostic at line 0 if `path`'s library could not be
    /// inferred (§3 rule 3 / §7), or `None` if it has a real assignment.
    pub fn library_diagnostic_for(&self, path: &SourcePath) -> Option<Diagnostic> {
        let lib = self.library_of(path);
        if lib.render(&self.interner) == inference::UNRESOLVED_LIBRARY {
            Some(Diagnostic::error(
                path.as_path(),
                0,
                "library could not be inferred for this file",
            ))
        } else {
            None
        }
    }

    /// Returns a clone of the file record at `path`, if known.
    pub fn get(&self, path: &SourcePath) -> Option<SourceFile> {
        self.inner.read().unwrap().files.get(path).cloned()
    }

    /// Returns `true` if `path`'s library was set explicitly (by
    /// configuration or a prior [`Database::restore_parsed`] call) rather
    /// than inferred. Used by `hdlc_cache` to round-trip the distinction
    /// inference itself depends on (§3's rules only grant evidentiary
    /// weight to explicit assignments).
    pub fn is_explicit_library(&self, path: &SourcePath) -> bool {
        self.inner.read().unwrap().explicit_library.contains(path)
    }

    /// Returns every known path, sorted.
    pub fn all_paths(&self) -> Vec<SourcePath> {
        let inner = self.inner.read().unwrap();
        let mut paths: Vec<_> = inner.files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Re-parses every stale (never-parsed or mtime-changed) file in
    /// parallel, replaces its design units/dependencies/include list
    /// wholesale, re-runs library inference, and returns the set of paths
    /// that were actually re-parsed.
    ///
    /// A file whose content can no longer be read (removed from disk since
    /// it was registered) is left with its previous parsed artifacts and
    /// reported via the returned diagnostics instead (property 8 — "file
    /// not found" at line 0).
    pub fn refresh(&self) -> (Vec<SourcePath>, Vec<Diagnostic>) {
        let stale: Vec<SourcePath> = {
            let inner = self.inner.read().unwrap();
            inner
                .files
                .iter()
                .filter(|(_, f)| f.is_stale())
                .map(|(p, _)| p.clone())
                .collect()
        };

        let interner = &self.interner;
        let results: Vec<(SourcePath, Result<ParsedFile, Diagnostic>)> = stale
            .par_iter()
            .map(|path| {
                let kind = {
                    let inner = self.inner.read().unwrap();
                    inner.files.get(path).map(|f| f.kind)
                };
                let Some(kind) = kind else {
                    return (
                        path.clone(),
                        Err(Diagnostic::error(path.as_path(), 0, "file removed from configuration during refresh")),
                    );
                };
                match std::fs::read_to_string(path.as_path()) {
                    Ok(text) => (path.clone(), Ok(parse_source(path, &text, kind, interner))),
                    Err(_) => (
                        path.clone(),
                        Err(Diagnostic::error(path.as_path(), 0, "file not found")),
                    ),
                }
            })
            .collect();

        let mut changed = Vec::new();
        let mut diagnostics = Vec::new();
        let mut inner = self.inner.write().unwrap();
        for (path, result) in results {
            match result {
                Ok(parsed) => {
                    if let Ok(fresh_path) = SourcePath::capture(path.as_path()) {
                        if let Some(file) = inner.files.get_mut(&path) {
                            file.path = fresh_path;
                            file.replace_parsed(parsed.design_units, parsed.dependencies, parsed.includes);
                            changed.push(path);
                        }
                    }
                }
                Err(diag) => diagnostics.push(diag),
            }
        }
        inner.reconcile(&self.interner);
        (changed, diagnostics)
    }
}

struct ParsedFile {
    design_units: Vec<hdlc_model::DesignUnit>,
    dependencies: Vec<hdlc_model::Dependency>,
    includes: Vec<std::path::PathBuf>,
}

fn parse_source(path: &SourcePath, text: &str, kind: SourceKind, interner: &Interner) -> ParsedFile {
    let (design_units, dependencies, includes) = match kind {
        SourceKind::Vhdl => hdlc_vhdl_parser::parse_file(path, text, interner),
        SourceKind::Verilog | SourceKind::SystemVerilog => {
            let dialect = hdlc_verilog_parser::dialect_for(kind).expect("verilog/sv kind always maps to a dialect");
            hdlc_verilog_parser::parse_file(path, text, interner, dialect)
        }
    };
    ParsedFile {
        design_units,
        dependencies,
        includes,
    }
}

/// The library assigned when inference cannot place a file (re-exported for
/// callers that need to recognize it, e.g. the project engine's diagnostic
/// merge step).
pub use inference::UNRESOLVED_LIBRARY;
