//! Error types at the coordinator boundary.
//!
//! Diagnostics are never errors. These cover the workspace plumbing only:
//! unreadable files, bad configuration, overlapping sweeps.

use std::path::PathBuf;

use luna_vfs::{FileUri, UriError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// A second sweep was requested while one is running.
    #[error("a workspace sweep is already running")]
    SweepInFlight,

    #[error("cannot read `{uri}`: {source}")]
    Read {
        uri: FileUri,
        #[source]
        source: std::io::Error,
    },

    #[error("`{uri}` is not valid UTF-8")]
    InvalidText { uri: FileUri },

    #[error("`{0}` does not exist")]
    NotFound(FileUri),

    /// The loader cannot serve this URI scheme.
    #[error("no source loader for `{0}`")]
    Unsupported(FileUri),

    #[error(transparent)]
    Uri(#[from] UriError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}
