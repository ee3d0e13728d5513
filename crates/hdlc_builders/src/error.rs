//! The adapter crate's error type, for failures that are not themselves
//! user-visible diagnostics (those are carried as [`hdlc_diagnostics::Diagnostic`]
//! values returned from [`crate::BuilderAdapter::build`] instead).

use std::path::PathBuf;

/// Failures a [`crate::BuilderAdapter`] cannot recover from on its own.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The per-library working directory could not be created.
    #[error("failed to create library directory {path:?}: {source}")]
    CreateLibrary {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
