//! Unresolved cross-file references a [`crate::SourceFile`] declares.

use crate::design_unit::Location;
use hdlc_common::Identifier;
use serde::{Deserialize, Serialize};

/// The library half of a [`Dependency`].
///
/// `Work` is the VHDL `work` sentinel: "the same library as whichever file
/// declares this dependency." It is kept distinct from a named library
/// rather than folded into `Option<Identifier>`, because resolving it
/// requires knowing the *declaring* file's own (possibly still-unresolved)
/// library — a different operation than looking up a named library.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DependencyLibrary {
    /// An explicitly named library, e.g. `lib_a` in `use lib_a.pkg.all`.
    Named(Identifier),
    /// The VHDL `work` sentinel.
    Work,
}

/// An unresolved `(library, name)` reference that the build planner must
/// resolve to a declaring path.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Dependency {
    /// The library the referenced name is expected to live in.
    pub library: DependencyLibrary,
    /// The referenced design-unit name.
    pub name: Identifier,
    /// Source positions where this dependency is referenced.
    pub locations: Vec<Location>,
}

impl Dependency {
    /// Creates a dependency referenced at a single location.
    pub fn new(library: DependencyLibrary, name: Identifier, at: Location) -> Self {
        Self {
            library,
            name,
            locations: vec![at],
        }
    }
}
