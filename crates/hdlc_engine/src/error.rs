//! Failures `ProjectEngine` operations can return.
//!
//! Most problems the engine encounters (a missing adapter, an unresolved
//! dependency, a stale cache entry) are surfaced as diagnostics rather than
//! errors — see §7. `EngineError` is reserved for the few failures that
//! leave the engine with nothing useful to report at all.

use std::path::PathBuf;

/// A failure from one of [`crate::ProjectEngine`]'s operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The project configuration could not be loaded at all.
    #[error("failed to load project configuration: {0}")]
    Config(#[from] hdlc_config::ConfigError),

    /// The cache could not be flushed to disk.
    #[error("failed to write cache: {0}")]
    Cache(#[from] hdlc_cache::CacheError),

    /// A query (`get_definition`/`get_hover`) named a path the engine has
    /// never seen (not in the loaded configuration).
    #[error("{path:?} is not a source file known to this project")]
    UnknownPath {
        /// The path the caller asked about.
        path: PathBuf,
    },
}
