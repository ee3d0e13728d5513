//! Case-aware interned identifiers for cheap cloning and O(1) equality.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A raw interned string index into a global [`Interner`].
///
/// This provides O(1) equality comparison and O(1) cloning, same as a bare
/// `u32`, but with string deduplication across the compilation session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct InternedStr(u32);

// SAFETY: `InternedStr` wraps a `u32` which is always a valid `usize` on
// 32-bit and 64-bit platforms. `try_from_usize` rejects values that don't fit.
unsafe impl lasso::Key for InternedStr {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(InternedStr)
    }
}

/// A quoted HDL name with a case-sensitivity bit.
///
/// VHDL identifiers fold to lower-case for equality and hashing; Verilog and
/// SystemVerilog identifiers preserve case. `raw` always holds the
/// as-written spelling (for rendering); `canonical` holds the spelling used
/// for comparisons — the same string as `raw` when `case_sensitive` is
/// `true`, or its lower-cased form otherwise. Comparing interned ids keeps
/// equality O(1) regardless of which rule applies.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Identifier {
    raw: InternedStr,
    canonical: InternedStr,
    case_sensitive: bool,
}

impl Identifier {
    /// Interns `text` as a case-sensitive identifier (Verilog/SystemVerilog rule).
    pub fn case_sensitive(interner: &Interner, text: &str) -> Self {
        let raw = interner.get_or_intern(text);
        Self {
            raw,
            canonical: raw,
            case_sensitive: true,
        }
    }

    /// Interns `text` as a case-insensitive identifier (VHDL rule): equality
    /// and hashing compare the lower-cased spelling, but `raw` preserves the
    /// text exactly as written for rendering.
    pub fn case_insensitive(interner: &Interner, text: &str) -> Self {
        let raw = interner.get_or_intern(text);
        let canonical = if text.chars().all(|c| !c.is_ascii_uppercase()) {
            raw
        } else {
            interner.get_or_intern(&text.to_ascii_lowercase())
        };
        Self {
            raw,
            canonical,
            case_sensitive: false,
        }
    }

    /// Returns `true` if this identifier was created with the case-sensitive rule.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Resolves this identifier's as-written spelling.
    pub fn render<'a>(&self, interner: &'a Interner) -> &'a str {
        interner.resolve(self.raw)
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Identifier {}

impl std::hash::Hash for Identifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

/// Thread-safe global string interner backed by [`lasso::ThreadedRodeo`].
///
/// Every identifier and path string seen by the project engine is interned
/// here to provide O(1) equality, O(1) cloning, and string deduplication.
pub struct Interner {
    rodeo: ThreadedRodeo<InternedStr>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning its [`InternedStr`]. If the string was
    /// already interned, returns the existing id without allocating.
    pub fn get_or_intern(&self, s: &str) -> InternedStr {
        self.rodeo.get_or_intern(s)
    }

    /// Resolves an [`InternedStr`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the id was not created by this interner.
    pub fn resolve(&self, id: InternedStr) -> &str {
        self.rodeo.resolve(&id)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
