//! Failures that abort a cache *write*. Reading a cache never fails this
//! way — per §7, a bad cache load is always silently treated as absent
//! (see [`crate::load`]).

use std::path::PathBuf;

/// A failure while writing the on-disk cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache file (or its parent directory) could not be written.
    #[error("failed to write cache file {path:?}: {source}")]
    Io {
        /// The cache file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The database snapshot could not be encoded.
    #[error("failed to encode cache: {reason}")]
    Encode {
        /// Description of the encoding failure.
        reason: String,
    },
}
