//! The delivery side: where diagnostics and progress go.

use luna_diagnostic::Diagnostic;
use luna_vfs::FileUri;
use parking_lot::Mutex;

/// Receives the coordinator's output. Implemented by the language server
/// (forwarding to the editor) and by [`CollectingSink`].
pub trait DiagnosticSink: Send + Sync {
    /// The complete, ordered diagnostic list of one file. An empty list
    /// clears what was published before.
    fn publish_diagnostics(&self, uri: &FileUri, diagnostics: &[Diagnostic]);

    /// `fraction` is in `[0, 1]` and never decreases within one sweep.
    fn progress_report(&self, text: &str, fraction: f32);
}

/// Records everything it receives.
#[derive(Debug, Default)]
pub struct CollectingSink {
    published: Mutex<Vec<(FileUri, Vec<Diagnostic>)>>,
    progress: Mutex<Vec<(String, f32)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publication, in delivery order.
    pub fn published(&self) -> Vec<(FileUri, Vec<Diagnostic>)> {
        self.published.lock().clone()
    }

    /// The last list published for `uri`.
    pub fn latest(&self, uri: &FileUri) -> Option<Vec<Diagnostic>> {
        self.published
            .lock()
            .iter()
            .rev()
            .find(|(published, _)| published == uri)
            .map(|(_, diagnostics)| diagnostics.clone())
    }

    pub fn progress(&self) -> Vec<(String, f32)> {
        self.progress.lock().clone()
    }

    pub fn clear(&self) {
        self.published.lock().clear();
        self.progress.lock().clear();
    }
}

impl DiagnosticSink for CollectingSink {
    fn publish_diagnostics(&self, uri: &FileUri, diagnostics: &[Diagnostic]) {
        self.published.lock().push((uri.clone(), diagnostics.to_vec()));
    }

    fn progress_report(&self, text: &str, fraction: f32) {
        self.progress.lock().push((text.to_owned(), fraction));
    }
}
