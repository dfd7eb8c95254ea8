use std::fmt;
use std::sync::OnceLock;

use luna_diagnostic::Diagnostic;
use luna_ir::{FileId, SourceParser, SyntaxTree};

use crate::FileUri;

/// Where a tracked file stands in the diagnosis cycle.
///
/// Untracked files are simply absent from the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileState {
    /// Text changed since the last diagnosis was delivered.
    Dirty,
    /// Diagnosed, and the result has been handed to the editor.
    Clean,
}

/// One tracked source file.
pub struct VirtualFile {
    uri: FileUri,
    id: FileId,
    text: String,
    /// Parsed on first use, dropped on every text change.
    tree: OnceLock<SyntaxTree>,
    state: FileState,
    diagnostics: Vec<Diagnostic>,
}

impl VirtualFile {
    pub fn new(uri: FileUri, text: String) -> Self {
        let id = uri.file_id();
        VirtualFile {
            uri,
            id,
            text,
            tree: OnceLock::new(),
            state: FileState::Dirty,
            diagnostics: Vec::new(),
        }
    }

    pub fn uri(&self) -> &FileUri {
        &self.uri
    }

    /// Key under which the registry records this file's declarations.
    pub fn id(&self) -> &FileId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> FileState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == FileState::Dirty
    }

    pub fn is_parsed(&self) -> bool {
        self.tree.get().is_some()
    }

    /// The syntax tree of the current text, parsing it if needed.
    pub fn syntax_tree(&self, parser: &dyn SourceParser) -> &SyntaxTree {
        self.tree.get_or_init(|| {
            tracing::trace!(uri = %self.uri, "parsing");
            parser.parse(&self.text)
        })
    }

    /// Replace the text. Drops the cached tree and marks the file dirty.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.invalidate();
    }

    /// Forget everything derived from the text.
    pub fn invalidate(&mut self) {
        self.tree = OnceLock::new();
        self.diagnostics.clear();
        self.state = FileState::Dirty;
    }

    pub fn mark_dirty(&mut self) {
        self.state = FileState::Dirty;
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Store a delivered diagnosis result and mark the file clean.
    pub fn set_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics = diagnostics;
        self.state = FileState::Clean;
    }
}

impl fmt::Debug for VirtualFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualFile")
            .field("uri", &self.uri)
            .field("len", &self.text.len())
            .field("state", &self.state)
            .field("parsed", &self.is_parsed())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
