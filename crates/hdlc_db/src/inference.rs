//! Library inference (§3): assigns a library to every file left unresolved
//! by configuration, following the first of three rules to fire.
//!
//! Only *explicit* assignments participate as evidence — a file that was
//! itself inferred on a previous pass never propagates its assignment to
//! another unresolved file. This keeps inference a single deterministic
//! pass over the explicit set rather than a fixed-point iteration, which is
//! what makes idempotence (I4) trivial: re-running inference against the
//! same explicit set and the same dependency/design-unit data always
//! recomputes the same assignment.

use hdlc_common::{Identifier, Interner, SourcePath};
use hdlc_model::{DependencyLibrary, SourceFile};
use std::collections::HashMap;

/// The sentinel library assigned when no rule can place a file (§3 rule 3).
pub const UNRESOLVED_LIBRARY: &str = "!!hdl_checker_unresolved_library!!";

/// One piece of evidence gathered from an explicitly-assigned file: either a
/// design unit it declares, or a dependency it references (with `work`
/// already resolved to that file's own library).
struct ExplicitUnit {
    library: Identifier,
    name: Identifier,
    owner: SourcePath,
}

struct ExplicitDependency {
    library: Identifier,
    name: Identifier,
}

/// Runs library inference over every file in `files`, returning the
/// assignment for each file whose `library` field was `None` on entry.
/// Files already carrying an explicit or previously-inferred library are
/// left untouched by the caller; this function only computes what
/// unresolved files *should* become.
///
/// `explicit` marks which paths were assigned a library directly (by
/// configuration), as opposed to carrying a leftover inferred value from a
/// prior run — only those count as rule evidence.
pub fn infer(
    files: &HashMap<SourcePath, SourceFile>,
    explicit: &std::collections::HashSet<SourcePath>,
    interner: &Interner,
) -> HashMap<SourcePath, Identifier> {
    let mut explicit_units: Vec<ExplicitUnit> = Vec::new();
    let mut explicit_deps: Vec<ExplicitDependency> = Vec::new();

    for path in explicit {
        let Some(file) = files.get(path) else { continue };
        let Some(lib) = file.library else { continue };
        for unit in &file.design_units {
            explicit_units.push(ExplicitUnit {
                library: lib,
                name: unit.name,
                owner: path.clone(),
            });
        }
        for dep in &file.dependencies {
            let resolved = match dep.library {
                DependencyLibrary::Named(l) => l,
                DependencyLibrary::Work => lib,
            };
            explicit_deps.push(ExplicitDependency {
                library: resolved,
                name: dep.name,
            });
        }
    }

    // Deterministic tie-break: sort evidence by (library name, owner path)
    // before scanning, so the first match found is always the same one.
    explicit_units.sort_by(|a, b| {
        render(a.library, interner)
            .cmp(&render(b.library, interner))
            .then_with(|| a.owner.as_path().cmp(b.owner.as_path()))
    });
    explicit_deps.sort_by(|a, b| render(a.library, interner).cmp(&render(b.library, interner)));

    let sentinel = Identifier::case_insensitive(interner, UNRESOLVED_LIBRARY);
    let mut result = HashMap::new();

    for (path, file) in files {
        if file.library.is_some() {
            continue;
        }

        // Rule 1: a dependency of this file names a unit an explicit file
        // in some library L declares.
        let rule1 = file.dependencies.iter().find_map(|dep| {
            let DependencyLibrary::Named(lib) = dep.library else {
                return None;
            };
            explicit_units
                .iter()
                .find(|u| u.library == lib && u.name == dep.name)
                .map(|u| u.library)
        });
        if let Some(lib) = rule1 {
            result.insert(path.clone(), lib);
            continue;
        }

        // Rule 2: an explicit file in some library L depends on a unit this
        // file declares.
        let rule2 = file.design_units.iter().find_map(|unit| {
            explicit_deps
                .iter()
                .find(|d| d.name == unit.name)
                .map(|d| d.library)
        });
        if let Some(lib) = rule2 {
            result.insert(path.clone(), lib);
            continue;
        }

        // Rule 3: give up.
        result.insert(path.clone(), sentinel);
    }

    result
}

fn render(id: Identifier, interner: &Interner) -> String {
    id.render(interner).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlc_model::{DesignUnit, DesignUnitKind, Location, SourceKind};
    use std::collections::HashSet;

    fn path(p: &str) -> SourcePath {
        SourcePath::missing(p)
    }

    #[test]
    fn rule1_inherits_library_from_dependency_target() {
        let interner = Interner::new();
        let lib_a = Identifier::case_insensitive(&interner, "lib_a");
        let pkg = Identifier::case_insensitive(&interner, "p");

        let mut pkg_file = SourceFile::new(path("/pkg.vhd"), SourceKind::Vhdl);
        pkg_file.library = Some(lib_a);
        pkg_file
            .design_units
            .push(DesignUnit::new(pkg, DesignUnitKind::Package, path("/pkg.vhd"), Location::new(0, 0)));

        let mut user_file = SourceFile::new(path("/user.vhd"), SourceKind::Vhdl);
        user_file.dependencies.push(hdlc_model::Dependency::new(
            DependencyLibrary::Named(lib_a),
            pkg,
            Location::new(0, 0),
        ));

        let mut files = HashMap::new();
        files.insert(path("/pkg.vhd"), pkg_file);
        files.insert(path("/user.vhd"), user_file);

        let mut explicit = HashSet::new();
        explicit.insert(path("/pkg.vhd"));

        let assignment = infer(&files, &explicit, &interner);
        assert_eq!(assignment.get(&path("/user.vhd")), Some(&lib_a));
    }

    #[test]
    fn rule3_falls_back_to_sentinel() {
        let interner = Interner::new();
        let mut files = HashMap::new();
        files.insert(path("/lonely.vhd"), SourceFile::new(path("/lonely.vhd"), SourceKind::Vhdl));
        let explicit = HashSet::new();

        let assignment = infer(&files, &explicit, &interner);
        let lib = assignment[&path("/lonely.vhd")];
        assert_eq!(lib.render(&interner), UNRESOLVED_LIBRARY);
    }

    #[test]
    fn idempotent_on_repeat_run() {
        let interner = Interner::new();
        let mut files = HashMap::new();
        files.insert(path("/a.vhd"), SourceFile::new(path("/a.vhd"), SourceKind::Vhdl));
        let explicit = HashSet::new();

        let first = infer(&files, &explicit, &interner);
        let second = infer(&files, &explicit, &interner);
        assert_eq!(first[&path("/a.vhd")], second[&path("/a.vhd")]);
    }
}
