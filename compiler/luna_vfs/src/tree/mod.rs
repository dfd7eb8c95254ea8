//! Folders and files of the virtual workspace.

use std::collections::BTreeMap;

use crate::FileUri;

mod file;

pub use file::{FileState, VirtualFile};

/// A child of a folder.
#[derive(Debug)]
pub enum VirtualNode {
    File(VirtualFile),
    Folder(VirtualFolder),
}

impl VirtualNode {
    pub fn uri(&self) -> &FileUri {
        match self {
            VirtualNode::File(file) => file.uri(),
            VirtualNode::Folder(folder) => folder.uri(),
        }
    }

    pub fn as_file(&self) -> Option<&VirtualFile> {
        match self {
            VirtualNode::File(file) => Some(file),
            VirtualNode::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&VirtualFolder> {
        match self {
            VirtualNode::Folder(folder) => Some(folder),
            VirtualNode::File(_) => None,
        }
    }

    /// Visit this node's files, depth first. See [`VirtualFolder::walk_files`].
    pub fn walk_files<F>(&self, visitor: &mut F) -> bool
    where
        F: FnMut(&VirtualFile) -> bool,
    {
        match self {
            VirtualNode::File(file) => visitor(file),
            VirtualNode::Folder(folder) => folder.walk_files(visitor),
        }
    }
}

/// A folder owning its children by name.
///
/// Children are kept sorted by name so walks are deterministic.
#[derive(Debug)]
pub struct VirtualFolder {
    uri: FileUri,
    children: BTreeMap<String, VirtualNode>,
}

impl VirtualFolder {
    pub fn new(uri: FileUri) -> Self {
        VirtualFolder {
            uri,
            children: BTreeMap::new(),
        }
    }

    pub fn uri(&self) -> &FileUri {
        &self.uri
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn children(&self) -> impl Iterator<Item = &VirtualNode> {
        self.children.values()
    }

    /// Add a file, or return the one already tracked under `name`.
    ///
    /// An existing file keeps its text; use [`VirtualFile::set_text`] to
    /// replace it. A folder of the same name is replaced by the new file.
    pub fn add_file(&mut self, name: &str, text: impl Into<String>) -> &mut VirtualFile {
        let exists = matches!(self.children.get(name), Some(VirtualNode::File(_)));
        if !exists {
            let file = VirtualFile::new(self.uri.join(name), text.into());
            tracing::debug!(uri = %file.uri(), "file added");
            self.children.insert(name.to_owned(), VirtualNode::File(file));
        }
        match self.children.get_mut(name) {
            Some(VirtualNode::File(file)) => file,
            _ => unreachable!("a file was just ensured under `{name}`"),
        }
    }

    /// Return the child folder `name`, creating it when missing.
    pub fn create_folder(&mut self, name: &str) -> &mut VirtualFolder {
        let exists = matches!(self.children.get(name), Some(VirtualNode::Folder(_)));
        if !exists {
            let folder = VirtualFolder::new(self.uri.join(name));
            self.children.insert(name.to_owned(), VirtualNode::Folder(folder));
        }
        match self.children.get_mut(name) {
            Some(VirtualNode::Folder(folder)) => folder,
            _ => unreachable!("a folder was just ensured under `{name}`"),
        }
    }

    /// Detach the child `name`.
    ///
    /// The whole subtree is returned so the caller can drop whatever it
    /// derived from those files (declarations, published diagnostics).
    pub fn remove_file(&mut self, name: &str) -> Option<VirtualNode> {
        let removed = self.children.remove(name);
        if let Some(node) = &removed {
            tracing::debug!(uri = %node.uri(), "node removed");
        }
        removed
    }

    pub fn find_file(&self, name: &str) -> Option<&VirtualNode> {
        self.children.get(name)
    }

    pub fn find_file_mut(&mut self, name: &str) -> Option<&mut VirtualNode> {
        self.children.get_mut(name)
    }

    /// Drop every child.
    pub fn remove_all(&mut self) {
        self.children.clear();
    }

    /// Visit every file below this folder, depth first in name order.
    ///
    /// The visitor returns `false` to stop. The stop is propagated: the
    /// return value is `false` exactly when some visit returned `false`.
    pub fn walk_files<F>(&self, visitor: &mut F) -> bool
    where
        F: FnMut(&VirtualFile) -> bool,
    {
        self.children
            .values()
            .all(|child| child.walk_files(&mut *visitor))
    }

    /// Like [`walk_files`](Self::walk_files), with mutable access to each file.
    pub fn walk_files_mut<F>(&mut self, visitor: &mut F) -> bool
    where
        F: FnMut(&mut VirtualFile) -> bool,
    {
        for child in self.children.values_mut() {
            let go_on = match child {
                VirtualNode::File(file) => visitor(file),
                VirtualNode::Folder(folder) => folder.walk_files_mut(visitor),
            };
            if !go_on {
                return false;
            }
        }
        true
    }

    /// URIs of every file below this folder, in walk order.
    pub fn file_uris(&self) -> Vec<FileUri> {
        let mut uris = Vec::new();
        self.walk_files(&mut |file| {
            uris.push(file.uri().clone());
            true
        });
        uris
    }

    pub fn file_count(&self) -> usize {
        let mut count = 0;
        self.walk_files(&mut |_| {
            count += 1;
            true
        });
        count
    }
}
