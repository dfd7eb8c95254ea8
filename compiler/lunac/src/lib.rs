//! Luna workspace coordinator.
//!
//! Ties the analysis crates into a live workspace: files come in from disk
//! scans, editor buffers and watched-file events; diagnostics and progress
//! go out through a [`DiagnosticSink`].
//!
//! # Main Entry Points
//!
//! - [`Workspace`]: the single owner of the virtual tree and the class registry
//! - [`ChangeQueue`] / [`WorkspaceEvent`]: thread-safe intake of changes
//! - [`Settings`]: editor configuration, including the [`CheckOptions`](luna_typeck::CheckOptions)
//! - [`WorkspacePolicy`]: which files belong to the workspace
//! - [`DiskLoader`] / [`MemoryLoader`]: where file text comes from
//! - [`commands`]: the `luna` command line

use std::sync::Once;

pub mod commands;
mod error;
mod loader;
mod policy;
mod queue;
mod settings;
mod sink;
mod workspace;

pub use error::{SettingsError, WorkspaceError};
pub use loader::{DiskLoader, MemoryLoader, SourceLoader};
pub use policy::{wildcard_match, InclusionPolicy, WorkspacePolicy};
pub use queue::{ChangeQueue, FileChange, WorkspaceEvent};
pub use settings::{Settings, SettingsUpdate, DEFAULT_ASSOCIATION};
pub use sink::{CollectingSink, DiagnosticSink};
pub use workspace::{SweepGuard, SweepState, SweepSummary, Workspace};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Output goes to stderr, which keeps stdout
/// free for the language server protocol. Enable with
/// `RUST_LOG=lunac=debug` or `RUST_LOG=luna_typeck=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(filter)
                .init();
        }
    });
}
