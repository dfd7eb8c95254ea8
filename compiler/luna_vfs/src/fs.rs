//! URI-addressed access to the per-scheme trees.

use std::collections::BTreeMap;

use crate::{FileUri, VirtualFile, VirtualFolder, VirtualNode};

/// All scheme roots of one workspace.
///
/// Each scheme (`file`, `untitled`, ...) gets exactly one root folder,
/// created the first time a URI of that scheme is inserted.
#[derive(Debug, Default)]
pub struct VirtualFs {
    roots: BTreeMap<String, VirtualFolder>,
}

impl VirtualFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// The root folder of `scheme`, created on first reference.
    pub fn scheme_root(&mut self, scheme: &str) -> &mut VirtualFolder {
        self.roots
            .entry(scheme.to_owned())
            .or_insert_with(|| VirtualFolder::new(FileUri::scheme_root(scheme)))
    }

    /// The root folder of `scheme`, if one exists.
    pub fn existing_root(&self, scheme: &str) -> Option<&VirtualFolder> {
        self.roots.get(scheme)
    }

    /// The folder at `uri`.
    ///
    /// With `create`, the scheme root and every missing ancestor are created
    /// on the way. Without it, `None` is returned as soon as a step is missing.
    pub fn folder_mut(&mut self, uri: &FileUri, create: bool) -> Option<&mut VirtualFolder> {
        let mut folder = if create {
            self.roots
                .entry(uri.scheme().to_owned())
                .or_insert_with(|| VirtualFolder::new(uri.root()))
        } else {
            self.roots.get_mut(uri.scheme())?
        };
        for name in uri.segments() {
            folder = if create {
                folder.create_folder(name)
            } else {
                match folder.find_file_mut(name)? {
                    VirtualNode::Folder(child) => child,
                    VirtualNode::File(_) => return None,
                }
            };
        }
        Some(folder)
    }

    pub fn folder(&self, uri: &FileUri) -> Option<&VirtualFolder> {
        let mut folder = self.roots.get(uri.scheme())?;
        for name in uri.segments() {
            folder = folder.find_file(name)?.as_folder()?;
        }
        Some(folder)
    }

    /// The node at `uri`, file or folder.
    pub fn find(&self, uri: &FileUri) -> Option<&VirtualNode> {
        let name = uri.name()?;
        self.folder(&uri.parent()?)?.find_file(name)
    }

    pub fn find_file(&self, uri: &FileUri) -> Option<&VirtualFile> {
        self.find(uri)?.as_file()
    }

    pub fn find_file_mut(&mut self, uri: &FileUri) -> Option<&mut VirtualFile> {
        let name = uri.name()?;
        let parent = uri.parent()?;
        match self.folder_mut(&parent, false)?.find_file_mut(name)? {
            VirtualNode::File(file) => Some(file),
            VirtualNode::Folder(_) => None,
        }
    }

    /// The node that tracking a file at `uri` would replace: a file where
    /// an ancestor folder must go, or a folder at `uri` itself.
    ///
    /// Callers detach it with [`remove`](Self::remove) first so whatever was
    /// derived from its files can be dropped.
    pub fn blocking_node(&self, uri: &FileUri) -> Option<&VirtualNode> {
        let (last, ancestors) = uri.segments().split_last()?;
        let mut folder = self.roots.get(uri.scheme())?;
        for name in ancestors {
            match folder.find_file(name)? {
                VirtualNode::Folder(child) => folder = child,
                file @ VirtualNode::File(_) => return Some(file),
            }
        }
        folder
            .find_file(last)
            .filter(|node| matches!(node, VirtualNode::Folder(_)))
    }

    /// Track `uri` with `text`, replacing the text of an already tracked file.
    ///
    /// Missing ancestor folders are created. The file ends up dirty either way.
    /// A [`blocking_node`](Self::blocking_node) is silently replaced.
    /// Returns `None` only for a scheme-root URI, which cannot be a file.
    pub fn upsert_file(&mut self, uri: &FileUri, text: String) -> Option<&mut VirtualFile> {
        let name = uri.name()?;
        let parent = uri.parent()?;
        let folder = self.folder_mut(&parent, true)?;
        let existed = matches!(folder.find_file(name), Some(VirtualNode::File(_)));
        let file = folder.add_file(name, text.as_str());
        if existed {
            file.set_text(text);
        }
        Some(file)
    }

    /// Detach the node at `uri` and return it.
    pub fn remove(&mut self, uri: &FileUri) -> Option<VirtualNode> {
        let name = uri.name()?;
        let parent = uri.parent()?;
        self.folder_mut(&parent, false)?.remove_file(name)
    }

    /// Visit every tracked file of every scheme. Stops when the visitor does.
    pub fn walk_files<F>(&self, visitor: &mut F) -> bool
    where
        F: FnMut(&VirtualFile) -> bool,
    {
        self.roots
            .values()
            .all(|root| root.walk_files(&mut *visitor))
    }

    pub fn walk_files_mut<F>(&mut self, visitor: &mut F) -> bool
    where
        F: FnMut(&mut VirtualFile) -> bool,
    {
        self.roots
            .values_mut()
            .all(|root| root.walk_files_mut(&mut *visitor))
    }

    /// URIs of every tracked file, in walk order.
    pub fn file_uris(&self) -> Vec<FileUri> {
        self.roots.values().flat_map(VirtualFolder::file_uris).collect()
    }

    pub fn file_count(&self) -> usize {
        self.roots.values().map(VirtualFolder::file_count).sum()
    }

    /// Drop every scheme root.
    pub fn clear(&mut self) {
        self.roots.clear();
    }
}
