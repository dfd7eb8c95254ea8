//! The workspace coordinator.
//!
//! Owns every piece of cross-file state (the virtual tree, the class
//! registry, the settings) and is the only thing that mutates it. Changes
//! arrive either as direct calls or as [`WorkspaceEvent`]s on the
//! [`ChangeQueue`]; both paths run on the caller's thread, one change at a
//! time.
//!
//! A tracked file moves through:
//!
//! ```text
//! untracked ──track──► dirty ──diagnose + publish──► clean
//!     ▲                  ▲                              │
//!     └────untrack───────┴─────────text change──────────┘
//! ```
//!
//! Untracking publishes an empty list so the editor drops stale markers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use luna_diagnostic::Diagnostic;
use luna_ir::SourceParser;
use luna_typeck::{diagnose_file, index_file, CheckOptions};
use luna_types::ClassRegistry;
use luna_vfs::{FileUri, VirtualFile, VirtualFs};

use crate::{
    ChangeQueue, DiagnosticSink, FileChange, InclusionPolicy, Settings, SettingsError,
    SourceLoader, WorkspaceError, WorkspaceEvent, WorkspacePolicy,
};

mod sweep;

pub use sweep::{SweepGuard, SweepState, SweepSummary};

pub struct Workspace {
    fs: VirtualFs,
    roots: Vec<FileUri>,
    registry: ClassRegistry,
    settings: Settings,
    policy: WorkspacePolicy,
    parser: Arc<dyn SourceParser>,
    loader: Arc<dyn SourceLoader>,
    sink: Arc<dyn DiagnosticSink>,
    queue: ChangeQueue,
    sweep_state: SweepState,
}

impl Workspace {
    pub fn new(
        parser: Arc<dyn SourceParser>,
        loader: Arc<dyn SourceLoader>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let settings = Settings::default();
        let policy = WorkspacePolicy::new(&settings, &[]);
        Workspace {
            fs: VirtualFs::new(),
            roots: Vec::new(),
            registry: ClassRegistry::new(),
            settings,
            policy,
            parser,
            loader,
            sink,
            queue: ChangeQueue::new(),
            sweep_state: SweepState::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self.refresh_policy();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn fs(&self) -> &VirtualFs {
        &self.fs
    }

    pub fn roots(&self) -> &[FileUri] {
        &self.roots
    }

    pub fn policy(&self) -> &WorkspacePolicy {
        &self.policy
    }

    /// A producer handle on this workspace's event queue.
    pub fn queue(&self) -> ChangeQueue {
        self.queue.clone()
    }

    /// A handle for checking, from any thread, whether a sweep is running.
    pub fn sweep_state(&self) -> SweepState {
        self.sweep_state.clone()
    }

    pub fn find_file(&self, uri: &FileUri) -> Option<&VirtualFile> {
        self.fs.find_file(uri)
    }

    /// Last delivered diagnostics of a tracked file.
    pub fn diagnostics(&self, uri: &FileUri) -> Option<&[Diagnostic]> {
        self.fs.find_file(uri).map(VirtualFile::diagnostics)
    }

    // Configuration

    /// Apply an editor settings object. Returns whether a reload is due.
    pub fn update_settings(&mut self, value: &serde_json::Value) -> Result<bool, SettingsError> {
        let update = self.settings.update(value)?;
        self.refresh_policy();
        Ok(update.associations_changed)
    }

    fn refresh_policy(&mut self) {
        self.policy = WorkspacePolicy::new(&self.settings, &self.roots);
    }

    // Roots

    /// Register a workspace root. Its files are loaded by the next sweep.
    pub fn add_root(&mut self, uri: FileUri) {
        if self.roots.contains(&uri) {
            return;
        }
        tracing::info!(root = %uri, "workspace root added");
        self.roots.push(uri);
        self.refresh_policy();
    }

    /// Forget a root and untrack everything below it.
    pub fn remove_root(&mut self, uri: &FileUri) {
        let before = self.roots.len();
        self.roots.retain(|root| root != uri);
        if self.roots.len() == before {
            return;
        }
        tracing::info!(root = %uri, "workspace root removed");
        self.untrack(uri);
        self.refresh_policy();
    }

    // Editor buffers

    /// Track an editor buffer whatever the inclusion policy says.
    pub fn open_document(&mut self, uri: &FileUri, text: String) {
        self.track(uri, text);
        self.diagnose(uri);
    }

    pub fn update_document(&mut self, uri: &FileUri, text: String) {
        self.track(uri, text);
        self.diagnose(uri);
    }

    /// Drop a closed buffer unless the file belongs to the workspace anyway.
    pub fn close_document(&mut self, uri: &FileUri) {
        if self.policy.is_excluded(uri) {
            self.untrack(uri);
        }
    }

    // Watched files

    pub fn file_changed(&mut self, uri: &FileUri, change: FileChange) {
        if self.policy.is_excluded(uri) {
            tracing::trace!(%uri, ?change, "ignoring change outside the workspace");
            return;
        }
        match change {
            FileChange::Created => self.load_and_diagnose(uri),
            FileChange::Changed => {
                self.untrack(uri);
                self.load_and_diagnose(uri);
            }
            FileChange::Deleted => {
                self.untrack(uri);
            }
        }
    }

    fn load_and_diagnose(&mut self, uri: &FileUri) {
        if self.load(uri) {
            self.diagnose(uri);
        }
    }

    /// Read `uri` through the loader and track it. Unreadable files are
    /// logged and skipped.
    fn load(&mut self, uri: &FileUri) -> bool {
        match self.loader.read_text(uri) {
            Ok(text) => {
                self.track(uri, text);
                true
            }
            Err(err) => {
                tracing::warn!(%uri, %err, "skipping unreadable file");
                false
            }
        }
    }

    // Events

    /// Apply one event. Returns whether it asks for a reload.
    pub fn apply(&mut self, event: WorkspaceEvent) -> bool {
        match event {
            WorkspaceEvent::Opened { uri, text } => self.open_document(&uri, text),
            WorkspaceEvent::Edited { uri, text } => self.update_document(&uri, text),
            WorkspaceEvent::Closed { uri } => self.close_document(&uri),
            WorkspaceEvent::Watched { uri, change } => self.file_changed(&uri, change),
            WorkspaceEvent::RootAdded(uri) => {
                self.add_root(uri);
                return true;
            }
            WorkspaceEvent::RootRemoved(uri) => self.remove_root(&uri),
            WorkspaceEvent::Configuration(value) => match self.update_settings(&value) {
                Ok(reload) => return reload,
                Err(err) => tracing::warn!(%err, "ignoring settings update"),
            },
            WorkspaceEvent::Reload => return true,
        }
        false
    }

    /// Drain the queue, one event at a time, then run a single sweep if any
    /// drained event asked for one.
    ///
    /// While a sweep is running elsewhere nothing is drained: the events stay
    /// queued for the next call. Returns the number of events applied.
    pub fn process_pending(&mut self) -> Result<usize, WorkspaceError> {
        if self.sweep_state.is_running() {
            return Ok(0);
        }
        let mut applied = 0;
        let mut reload = false;
        while let Some(event) = self.queue.pop() {
            tracing::trace!(?event, "applying");
            reload |= self.apply(event);
            applied += 1;
        }
        if reload {
            self.sweep()?;
        }
        Ok(applied)
    }

    /// Drop every tree, root and declaration.
    pub fn dispose(&mut self) {
        self.fs.clear();
        self.roots.clear();
        self.registry.clear();
        self.refresh_policy();
    }

    // Tracking

    /// Insert or replace the file and re-index its declarations.
    fn track(&mut self, uri: &FileUri, text: String) {
        // A file standing where a folder must go, or a folder where the file
        // goes, leaves the tree through `untrack` like any other removal.
        if let Some(blocking) = self.fs.blocking_node(uri).map(|node| node.uri().clone()) {
            tracing::debug!(%uri, replaced = %blocking, "replacing a node of the other kind");
            self.untrack(&blocking);
        }
        let Some(file) = self.fs.upsert_file(uri, text) else {
            tracing::warn!(%uri, "cannot track a scheme root as a file");
            return;
        };
        let id = file.id().clone();
        self.registry.remove_declarations_from(&id);
        let parser = self.parser.as_ref();
        let registry = &mut self.registry;
        let indexed = panic::catch_unwind(AssertUnwindSafe(|| {
            index_file(file.syntax_tree(parser), &id, registry);
        }));
        if indexed.is_err() {
            tracing::warn!(%uri, "indexing panicked; dropping the file's declarations");
            self.registry.remove_declarations_from(&id);
        }
        tracing::debug!(%uri, "tracked");
    }

    /// Detach `uri` (a file or a whole folder) and forget what it declared.
    fn untrack(&mut self, uri: &FileUri) -> bool {
        let Some(node) = self.fs.remove(uri) else {
            return false;
        };
        let registry = &mut self.registry;
        let sink = &self.sink;
        node.walk_files(&mut |file| {
            registry.remove_declarations_from(file.id());
            sink.publish_diagnostics(file.uri(), &[]);
            tracing::debug!(uri = %file.uri(), "untracked");
            true
        });
        true
    }

    /// Diagnose one tracked file, publish the result and mark it clean.
    fn diagnose(&mut self, uri: &FileUri) {
        let Some(file) = self.fs.find_file(uri) else {
            return;
        };
        let diagnostics =
            diagnose_isolated(file, self.parser.as_ref(), &self.registry, &self.settings.check);
        self.sink.publish_diagnostics(uri, &diagnostics);
        if let Some(file) = self.fs.find_file_mut(uri) {
            file.set_diagnostics(diagnostics);
        }
    }
}

/// Run the diagnostics pass, turning a panic into an empty result so one
/// pathological file cannot take the workspace down.
fn diagnose_isolated(
    file: &VirtualFile,
    parser: &dyn SourceParser,
    registry: &ClassRegistry,
    options: &CheckOptions,
) -> Vec<Diagnostic> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        diagnose_file(file.syntax_tree(parser), file.text(), registry, options)
    }));
    outcome.unwrap_or_else(|_| {
        tracing::warn!(uri = %file.uri(), "diagnosis panicked; publishing no diagnostics");
        Vec::new()
    })
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("roots", &self.roots)
            .field("files", &self.fs.file_count())
            .field("classes", &self.registry.len())
            .field("sweeping", &self.sweep_state.is_running())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
