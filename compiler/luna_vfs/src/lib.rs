//! Luna VFS - the virtual workspace tree.
//!
//! The workspace keeps the authoritative text of every tracked file in
//! memory, arranged as one folder hierarchy per URI scheme.
//!
//! # Module Organization
//!
//! - `uri`: [`FileUri`], the normalized scheme-plus-segments identity of a node
//! - `tree`: [`VirtualFolder`], [`VirtualFile`] and the [`VirtualNode`] between them
//! - `fs`: [`VirtualFs`], the per-scheme roots and URI-addressed operations
//!
//! Folders own their children outright, so the tree cannot contain cycles
//! and a file's URI is always its ancestors' segments plus its own name.

mod fs;
mod tree;
mod uri;

pub use fs::VirtualFs;
pub use tree::{FileState, VirtualFile, VirtualFolder, VirtualNode};
pub use uri::{FileUri, UriError};
