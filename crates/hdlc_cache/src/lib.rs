//! The on-disk parse cache (§4.7 / §7): lets a fresh process skip
//! re-scanning every source file on startup by persisting what the
//! previous run's [`hdlc_db::Database`] already knew.
//!
//! A cache load never fails. Any problem reading it back — missing file,
//! wrong schema tag, corrupt payload — is treated exactly like a cold
//! start with no cache at all. Only a *write* can fail, since there the
//! caller has a legitimate interest in knowing the cache was not updated.

#![warn(missing_docs)]

mod entry;
mod error;

pub use entry::{CachedDependency, CachedDependencyLibrary, CachedDesignUnit, CachedSourceFile};
pub use error::CacheError;

use hdlc_common::Interner;
use hdlc_db::Database;
use std::fs;
use std::path::Path;

/// First line of every cache file. Bumped whenever [`CachedSourceFile`]'s
/// shape changes in a way that would make an old cache undecodable (or,
/// worse, silently misdecodable) — existing cache files then simply miss
/// instead of erroring.
pub const SCHEMA_TAG: &str = "hdlc-cache-v1";

/// Writes every path currently known to `db` to `cache_path`.
///
/// The file is a single text line holding [`SCHEMA_TAG`], a `\n`, and then
/// the bincode encoding of the full `Vec<CachedSourceFile>`.
pub fn save(cache_path: &Path, db: &Database, interner: &Interner) -> Result<(), CacheError> {
    let entries: Vec<CachedSourceFile> = db
        .all_paths()
        .into_iter()
        .filter_map(|path| {
            let file = db.get(&path)?;
            let explicit = db.is_explicit_library(&path);
            Some(entry::to_cached(&file, explicit, interner))
        })
        .collect();

    let payload = bincode::serde::encode_to_vec(&entries, bincode::config::standard())
        .map_err(|err| CacheError::Encode { reason: err.to_string() })?;

    let mut bytes = Vec::with_capacity(SCHEMA_TAG.len() + 1 + payload.len());
    bytes.extend_from_slice(SCHEMA_TAG.as_bytes());
    bytes.push(b'\n');
    bytes.extend_from_slice(&payload);

    if let Some(parent) = cache_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    fs::write(cache_path, bytes).map_err(|source| CacheError::Io {
        path: cache_path.to_path_buf(),
        source,
    })
}

/// Reads back whatever `save` last wrote to `cache_path`. Never fails:
/// a missing file, a mismatched schema tag, or an undecodable payload all
/// produce an empty list, exactly as if no cache existed.
pub fn load(cache_path: &Path, _interner: &Interner) -> Vec<CachedSourceFile> {
    let Ok(bytes) = fs::read(cache_path) else {
        return Vec::new();
    };
    let Some(newline) = bytes.iter().position(|&b| b == b'\n') else {
        return Vec::new();
    };
    if &bytes[..newline] != SCHEMA_TAG.as_bytes() {
        return Vec::new();
    }
    let payload = &bytes[newline + 1..];
    match bincode::serde::decode_from_slice::<Vec<CachedSourceFile>, _>(payload, bincode::config::standard()) {
        Ok((entries, _)) => entries,
        Err(_) => Vec::new(),
    }
}

/// Loads `cache_path` and restores every entry whose path still exists on
/// disk and is not stale (§4.7: a changed mtime/size means the cache
/// entry is discarded, not trusted), inserting each into `db` via
/// [`Database::restore_parsed`]. Returns the number of entries restored.
pub fn restore(db: &Database, cache_path: &Path, interner: &Interner) -> usize {
    let mut restored = 0;
    for cached in load(cache_path, interner) {
        if !cached.path.exists() || cached.path.is_stale() {
            continue;
        }
        let (file, explicit) = entry::from_cached(cached, interner);
        db.restore_parsed(file, explicit);
        restored += 1;
    }
    restored
}
