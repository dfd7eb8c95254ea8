//! Reading source text from the backing store.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use luna_vfs::FileUri;
use parking_lot::RwLock;

use crate::WorkspaceError;

/// Where file text comes from during scans and watched-file events.
///
/// Reads are synchronous and one file at a time.
pub trait SourceLoader: Send + Sync {
    fn read_text(&self, uri: &FileUri) -> Result<String, WorkspaceError>;

    /// Every file below `root` (or `root` itself when it is a file), sorted.
    fn list_files(&self, root: &FileUri) -> Vec<FileUri>;
}

/// Serves `file:` URIs from the local disk.
#[derive(Copy, Clone, Debug, Default)]
pub struct DiskLoader;

impl SourceLoader for DiskLoader {
    fn read_text(&self, uri: &FileUri) -> Result<String, WorkspaceError> {
        let path = uri
            .to_path()
            .ok_or_else(|| WorkspaceError::Unsupported(uri.clone()))?;
        let bytes = fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                WorkspaceError::NotFound(uri.clone())
            } else {
                WorkspaceError::Read {
                    uri: uri.clone(),
                    source,
                }
            }
        })?;
        String::from_utf8(bytes).map_err(|_| WorkspaceError::InvalidText { uri: uri.clone() })
    }

    fn list_files(&self, root: &FileUri) -> Vec<FileUri> {
        let Some(path) = root.to_path() else {
            return Vec::new();
        };
        let mut files = Vec::new();
        if path.is_file() {
            files.push(root.clone());
        } else if path.is_dir() {
            scan_directory(&path, &mut files);
        }
        files.sort();
        files
    }
}

fn scan_directory(dir: &Path, files: &mut Vec<FileUri>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "cannot list directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();

        // Skip hidden files and directories
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.starts_with('.'))
        {
            continue;
        }

        if path.is_dir() {
            scan_directory(&path, files);
        } else {
            match FileUri::from_path(&path) {
                Ok(uri) => files.push(uri),
                Err(err) => tracing::warn!(path = %path.display(), %err, "skipping file"),
            }
        }
    }
}

/// An in-memory store for synthetic schemes.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    files: RwLock<BTreeMap<FileUri, String>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: FileUri, text: impl Into<String>) {
        self.files.write().insert(uri, text.into());
    }

    pub fn remove(&self, uri: &FileUri) -> Option<String> {
        self.files.write().remove(uri)
    }
}

impl SourceLoader for MemoryLoader {
    fn read_text(&self, uri: &FileUri) -> Result<String, WorkspaceError> {
        self.files
            .read()
            .get(uri)
            .cloned()
            .ok_or_else(|| WorkspaceError::NotFound(uri.clone()))
    }

    fn list_files(&self, root: &FileUri) -> Vec<FileUri> {
        self.files
            .read()
            .keys()
            .filter(|uri| uri.starts_with(root))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn uri(text: &str) -> FileUri {
        match FileUri::parse(text) {
            Ok(uri) => uri,
            Err(err) => panic!("`{text}` should parse: {err}"),
        }
    }

    #[test]
    fn memory_loader() {
        let loader = MemoryLoader::new();
        loader.insert(uri("mem:///p/a.lua"), "a");
        loader.insert(uri("mem:///p/sub/b.lua"), "b");
        loader.insert(uri("mem:///q/c.lua"), "c");

        assert_eq!(
            loader.list_files(&uri("mem:///p")),
            vec![uri("mem:///p/a.lua"), uri("mem:///p/sub/b.lua")]
        );
        assert_eq!(loader.read_text(&uri("mem:///q/c.lua")).ok().as_deref(), Some("c"));
        assert!(matches!(
            loader.read_text(&uri("mem:///missing.lua")),
            Err(WorkspaceError::NotFound(_))
        ));
        assert_eq!(loader.remove(&uri("mem:///q/c.lua")).as_deref(), Some("c"));
    }

    #[test]
    fn disk_loader_skips_hidden_entries() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("cannot create a temporary directory");
        };
        let root = dir.path();
        let writes = [
            fs::create_dir_all(root.join("src/.cache")),
            fs::write(root.join("src/a.lua"), "local a = 1"),
            fs::write(root.join("src/.cache/x.lua"), ""),
            fs::write(root.join(".hidden.lua"), ""),
            fs::write(root.join("b.lua"), [0xff, 0xfe]),
        ];
        assert!(writes.iter().all(Result::is_ok));

        let Ok(root_uri) = FileUri::from_path(root) else {
            panic!("temporary directories are absolute");
        };
        let loader = DiskLoader;
        let names: Vec<String> = loader
            .list_files(&root_uri)
            .iter()
            .filter_map(|uri| uri.name().map(str::to_owned))
            .collect();
        assert_eq!(names, vec!["b.lua", "a.lua"]);

        let a = root_uri.join("src").join("a.lua");
        assert_eq!(loader.read_text(&a).ok().as_deref(), Some("local a = 1"));
        assert!(matches!(
            loader.read_text(&root_uri.join("b.lua")),
            Err(WorkspaceError::InvalidText { .. })
        ));
        assert!(matches!(
            loader.read_text(&root_uri.join("gone.lua")),
            Err(WorkspaceError::NotFound(_))
        ));
        assert!(matches!(
            loader.read_text(&uri("mem:///a.lua")),
            Err(WorkspaceError::Unsupported(_))
        ));
    }
}
