//! Luna typeck - declaration indexing, type inference and diagnostics.
//!
//! # Main Entry Points
//!
//! - [`index_file`]: record a file's declarations in the [`ClassRegistry`](luna_types::ClassRegistry)
//! - [`InferCtx`]: per-pass expression type inference
//! - [`type_check`]: the assignability policy, configured by [`CheckOptions`]
//! - [`diagnose_file`]: the full diagnostics pass over one file
//!
//! Indexing must see every file before diagnosis runs: diagnostics read
//! classes declared anywhere in the workspace.

mod annotations;
mod check;
mod diagnose;
mod index;
mod infer;
mod lower;

pub use check::{type_check, CheckOptions};
pub use diagnose::diagnose_file;
pub use index::index_file;
pub use infer::InferCtx;
pub use lower::{lower_signature, lower_type};
