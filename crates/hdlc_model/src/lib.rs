//! The shared data model parsed sources are expressed in: design units,
//! dependencies, and the per-file record that owns them.
//!
//! This crate plays the role a unified IR would play in a full compiler, but
//! stops at the identifier/declaration scope the project engine actually
//! needs — there is no elaboration, no expression tree, no signal/port
//! model. Every parser (`hdlc_vhdl_parser`, `hdlc_verilog_parser`) produces
//! these types directly; the database (`hdlc_db`) indexes them.

#![warn(missing_docs)]

pub mod dependency;
pub mod design_unit;
pub mod source_file;

pub use dependency::{Dependency, DependencyLibrary};
pub use design_unit::{DesignUnit, DesignUnitKind, Location};
pub use source_file::{SourceFile, SourceKind};
