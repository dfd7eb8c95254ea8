//! Full-workspace reload and batched re-diagnosis.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use luna_diagnostic::Severity;
use luna_vfs::FileUri;

use super::Workspace;
use crate::{InclusionPolicy, WorkspaceError};

/// Shared "a sweep is running" flag.
///
/// Clones observe the same flag, so other threads can see a sweep in
/// flight without touching the workspace itself.
#[derive(Clone, Debug, Default)]
pub struct SweepState(Arc<AtomicBool>);

impl SweepState {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Claim the flag. Fails if another sweep holds it.
    pub fn try_begin(&self) -> Result<SweepGuard, WorkspaceError> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| WorkspaceError::SweepInFlight)?;
        Ok(SweepGuard(Arc::clone(&self.0)))
    }
}

/// Releases the sweep flag when dropped, even on unwind.
#[must_use = "the sweep flag is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SweepGuard(Arc<AtomicBool>);

impl Drop for SweepGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// What one sweep did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Excluded files dropped before scanning.
    pub removed: usize,
    /// Discovered files now tracked.
    pub loaded: usize,
    /// Discovered files that could not be read.
    pub skipped: usize,
    pub diagnosed: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Monotonic progress over a fixed number of work units.
struct Progress {
    done: usize,
    total: usize,
}

impl Progress {
    fn step(&mut self) -> f32 {
        self.done = (self.done + 1).min(self.total);
        self.fraction()
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "file counts stay far below f32's exact integer range"
    )]
    fn fraction(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        self.done as f32 / self.total as f32
    }

    fn percent(&self) -> usize {
        if self.total == 0 {
            100
        } else {
            self.done * 100 / self.total
        }
    }
}

impl Workspace {
    /// Rescan every root and re-diagnose every tracked file once.
    ///
    /// Steps: drop files the policy now excludes, track every discovered
    /// file (already tracked ones keep their text and become dirty), index
    /// them all, then diagnose the whole tree. Progress counts one unit per
    /// discovered file loaded and one per file diagnosed, and ends at
    /// exactly 1.0 with "Finished!".
    ///
    /// Events queued while the sweep runs are applied after it.
    #[tracing::instrument(level = "info", skip(self), fields(roots = self.roots.len()))]
    pub fn sweep(&mut self) -> Result<SweepSummary, WorkspaceError> {
        let guard = self.sweep_state.try_begin()?;
        let mut summary = SweepSummary {
            removed: self.clean_excluded(),
            ..SweepSummary::default()
        };

        let discovered = self.discover();
        let already_tracked: BTreeSet<FileUri> = self.fs.file_uris().into_iter().collect();
        let diagnose_only = already_tracked.difference(&discovered).count();
        let mut progress = Progress {
            done: 0,
            total: 2 * discovered.len() + diagnose_only,
        };
        self.sink.progress_report("load workspace folders", 0.0);

        for uri in &discovered {
            let loaded = match self.fs.find_file_mut(uri) {
                Some(file) => {
                    file.mark_dirty();
                    true
                }
                None => self.load(uri),
            };
            if loaded {
                summary.loaded += 1;
            } else {
                summary.skipped += 1;
            }
            let fraction = progress.step();
            let text = format!("parse file[{}%]: {uri}", progress.percent());
            self.sink.progress_report(&text, fraction);
        }

        for uri in self.fs.file_uris() {
            self.diagnose(&uri);
            summary.diagnosed += 1;
            if let Some(diagnostics) = self.diagnostics(&uri) {
                for diagnostic in diagnostics {
                    match diagnostic.severity {
                        Severity::Error => summary.errors += 1,
                        Severity::Warning => summary.warnings += 1,
                    }
                }
            }
            let fraction = progress.step();
            let text = format!("diagnose file[{}%]: {uri}", progress.percent());
            self.sink.progress_report(&text, fraction);
        }

        self.sink.progress_report("Finished!", 1.0);
        tracing::info!(?summary, "sweep finished");
        drop(guard);

        self.process_pending()?;
        Ok(summary)
    }

    /// Every file below the policy's roots that the policy includes.
    fn discover(&self) -> BTreeSet<FileUri> {
        self.policy
            .roots()
            .iter()
            .flat_map(|root| self.loader.list_files(root))
            .filter(|uri| self.policy.is_included(uri))
            .collect()
    }

    /// Untrack files the current policy excludes. Returns how many.
    fn clean_excluded(&mut self) -> usize {
        let excluded: Vec<FileUri> = self
            .fs
            .file_uris()
            .into_iter()
            .filter(|uri| self.policy.is_excluded(uri))
            .collect();
        for uri in &excluded {
            self.untrack(uri);
        }
        excluded.len()
    }
}
