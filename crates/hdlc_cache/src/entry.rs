//! Plain, serde-friendly DTOs mirroring [`hdlc_model::SourceFile`] and its
//! owned design units/dependencies, with every [`hdlc_common::Identifier`]
//! field widened to a plain `String`.
//!
//! `Identifier`'s own `Serialize` impl round-trips an `InternedStr` index —
//! stable only within the `Interner` that produced it, and useless once a
//! fresh `Interner` is built at the next process start. These DTOs store
//! the identifier's rendered spelling instead and re-intern it against
//! whichever `Interner` is live at load time.

use hdlc_common::{Identifier, Interner, SourcePath};
use hdlc_model::{Dependency, DependencyLibrary, DesignUnit, DesignUnitKind, Location, SourceFile, SourceKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A cached [`DesignUnit`], with its name stored as plain text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedDesignUnit {
    /// The declared name, as originally written.
    pub name: String,
    /// What kind of declaration this is.
    pub kind: DesignUnitKind,
    /// Source positions of the declaration.
    pub locations: Vec<Location>,
}

/// A cached [`DependencyLibrary`], with a named library stored as plain text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CachedDependencyLibrary {
    /// An explicitly named library.
    Named(String),
    /// The VHDL `work` sentinel.
    Work,
}

/// A cached [`Dependency`], with its name (and named library, if any)
/// stored as plain text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedDependency {
    /// The library the referenced name is expected to live in.
    pub library: CachedDependencyLibrary,
    /// The referenced design-unit name, as originally written.
    pub name: String,
    /// Source positions where this dependency is referenced.
    pub locations: Vec<Location>,
}

/// A cached [`SourceFile`]: everything `hdlc_db` knew about one path at
/// the time the cache was last saved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedSourceFile {
    /// The file's path with the mtime/size captured at save time —
    /// reused directly (not widened to a DTO) since [`SourcePath`] is
    /// already serde-friendly and comparing it to a freshly captured
    /// value is exactly invariant I3's staleness check.
    pub path: SourcePath,
    /// The HDL dialect.
    pub kind: SourceKind,
    /// The explicitly assigned library, if any (an inferred library is
    /// never cached — it is recomputed fresh every time `hdlc_db`
    /// reconciles, same as for a freshly `put_file`d path).
    pub explicit_library: Option<String>,
    /// Flags applied when this file is the direct compilation target.
    pub flags_single: Vec<String>,
    /// Flags applied when this file is compiled only as a dependency.
    pub flags_dependencies: Vec<String>,
    /// Design units declared in this file.
    pub design_units: Vec<CachedDesignUnit>,
    /// Dependencies this file references.
    pub dependencies: Vec<CachedDependency>,
    /// Verilog ``` `include ``` targets found in this file.
    pub include_list: Vec<PathBuf>,
}

/// Converts a live `SourceFile` into its cached form, rendering every
/// `Identifier` to plain text via `interner`.
pub fn to_cached(file: &SourceFile, explicit_library: bool, interner: &Interner) -> CachedSourceFile {
    CachedSourceFile {
        path: file.path.clone(),
        kind: file.kind,
        explicit_library: if explicit_library {
            file.library.map(|l| l.render(interner).to_string())
        } else {
            None
        },
        flags_single: file.flags_single.clone(),
        flags_dependencies: file.flags_dependencies.clone(),
        design_units: file
            .design_units
            .iter()
            .map(|u| CachedDesignUnit {
                name: u.name.render(interner).to_string(),
                kind: u.kind,
                locations: u.locations.clone(),
            })
            .collect(),
        dependencies: file
            .dependencies
            .iter()
            .map(|d| CachedDependency {
                library: match d.library {
                    DependencyLibrary::Named(l) => CachedDependencyLibrary::Named(l.render(interner).to_string()),
                    DependencyLibrary::Work => CachedDependencyLibrary::Work,
                },
                name: d.name.render(interner).to_string(),
                locations: d.locations.clone(),
            })
            .collect(),
        include_list: file.include_list.clone(),
    }
}

/// Reconstructs a `SourceFile` from its cached form, re-interning every
/// name against `interner` with the cached file's own case-sensitivity
/// rule (§3: VHDL folds case, Verilog/SystemVerilog preserve it). Returns
/// the file plus whether its library was explicit, for the caller to pass
/// straight through to [`hdlc_db::Database::restore_parsed`].
pub fn from_cached(cached: CachedSourceFile, interner: &Interner) -> (SourceFile, bool) {
    let intern_name = |text: &str| -> Identifier {
        if cached.kind.is_case_insensitive() {
            Identifier::case_insensitive(interner, text)
        } else {
            Identifier::case_sensitive(interner, text)
        }
    };

    let mut file = SourceFile::new(cached.path, cached.kind);
    let explicit = cached.explicit_library.is_some();
    file.library = cached.explicit_library.as_deref().map(&intern_name);
    file.flags_single = cached.flags_single;
    file.flags_dependencies = cached.flags_dependencies;
    file.design_units = cached
        .design_units
        .into_iter()
        .map(|u| DesignUnit {
            name: intern_name(&u.name),
            kind: u.kind,
            owner: file.path.clone(),
            locations: u.locations,
        })
        .collect();
    file.dependencies = cached
        .dependencies
        .into_iter()
        .map(|d| Dependency {
            library: match d.library {
                CachedDependencyLibrary::Named(l) => DependencyLibrary::Named(intern_name(&l)),
                CachedDependencyLibrary::Work => DependencyLibrary::Work,
            },
            name: intern_name(&d.name),
            locations: d.locations,
        })
        .collect();
    file.include_list = cached.include_list;
    (file, explicit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlc_common::SourcePath;

    #[test]
    fn roundtrips_design_unit_name_through_interner() {
        let interner = Interner::new();
        let path = SourcePath::missing("/tmp/pkg.vhd");
        let name = Identifier::case_insensitive(&interner, "P");
        let mut file = SourceFile::new(path, SourceKind::Vhdl);
        file.library = Some(Identifier::case_insensitive(&interner, "lib_a"));
        file.design_units.push(DesignUnit::new(
            name,
            DesignUnitKind::Package,
            file.path.clone(),
            Location::new(0, 0),
        ));

        let cached = to_cached(&file, true, &interner);
        assert_eq!(cached.explicit_library.as_deref(), Some("lib_a"));

        let fresh_interner = Interner::new();
        let (restored, explicit) = from_cached(cached, &fresh_interner);
        assert!(explicit);
        assert_eq!(restored.design_units.len(), 1);
        let restored_name = restored.design_units[0].name;
        let again = Identifier::case_insensitive(&fresh_interner, "p");
        assert_eq!(restored_name, again, "VHDL name must still fold case after a round-trip");
    }

    #[test]
    fn non_explicit_library_is_not_cached() {
        let interner = Interner::new();
        let path = SourcePath::missing("/tmp/user.vhd");
        let mut file = SourceFile::new(path, SourceKind::Vhdl);
        file.library = Some(Identifier::case_insensitive(&interner, "lib_a")); // inferred, not explicit
        let cached = to_cached(&file, false, &interner);
        assert!(cached.explicit_library.is_none());
    }
}
