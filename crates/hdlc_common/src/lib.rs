//! Shared foundational types used across the HDL Checker project engine.
//!
//! This crate provides interned, case-aware identifiers, content hashing for
//! cache invalidation, a timestamped path value type, and the common result
//! type for internal (non-user-facing) errors.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod path;
pub mod result;

pub use hash::ContentHash;
pub use ident::{Identifier, Interner};
pub use path::SourcePath;
pub use result::{HdlcResult, InternalError};
