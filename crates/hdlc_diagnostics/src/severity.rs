//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a diagnostic message.
///
/// Ordered from least severe (`Note`) to most severe (`Fatal`), matching the
/// derived `PartialOrd`/`Ord` implementation based on declaration order. This
/// is the adapter-agnostic severity set §6 maps builder tool output onto:
/// `E → Error`, `W → Warning`, `Note`/`Info → Note`, any `Fatal` surface
/// stays `Fatal` and halts the run.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// An informational note — includes library-inference notices and
    /// TODO/FIXME/XXX tags surfaced by the static checker.
    Note,
    /// A potential issue that does not prevent compilation.
    Warning,
    /// A definite problem reported by a tool or by dependency resolution.
    Error,
    /// A tool-reported fatal condition; the engine halts the current run.
    Fatal,
}

impl Severity {
    /// Returns `true` if this severity is [`Error`](Severity::Error) or
    /// [`Fatal`](Severity::Fatal).
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error | Severity::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => write!(f, "note"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}
