//! Which files belong to the workspace.

use std::path::Path;

use luna_vfs::FileUri;

use crate::Settings;

/// The include/exclude predicate the coordinator consults for every
/// external event. Editor-opened buffers bypass it.
pub trait InclusionPolicy: Send + Sync {
    fn is_included(&self, uri: &FileUri) -> bool;

    fn is_excluded(&self, uri: &FileUri) -> bool {
        !self.is_included(uri)
    }
}

/// Inclusion driven by the settings: a file is included when its name
/// matches an association wildcard and it lies below a root.
///
/// Configured source roots take precedence over workspace roots. With no
/// roots at all, every matching file is included.
#[derive(Clone, Debug, Default)]
pub struct WorkspacePolicy {
    associations: Vec<String>,
    roots: Vec<FileUri>,
}

impl WorkspacePolicy {
    pub fn new(settings: &Settings, workspace_roots: &[FileUri]) -> Self {
        let mut roots: Vec<FileUri> = settings
            .source_roots()
            .iter()
            .flat_map(|root| resolve_root(root, workspace_roots))
            .collect();
        if roots.is_empty() {
            roots = workspace_roots.to_vec();
        }
        WorkspacePolicy {
            associations: settings.associations().to_vec(),
            roots,
        }
    }

    pub fn roots(&self) -> &[FileUri] {
        &self.roots
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.associations
            .iter()
            .any(|pattern| wildcard_match(pattern, name))
    }
}

impl InclusionPolicy for WorkspacePolicy {
    fn is_included(&self, uri: &FileUri) -> bool {
        let Some(name) = uri.name() else {
            return false;
        };
        self.matches_name(name)
            && (self.roots.is_empty() || self.roots.iter().any(|root| uri.starts_with(root)))
    }
}

/// A configured source root: a URI, an absolute path, or a path relative
/// to each workspace root.
fn resolve_root(root: &str, workspace_roots: &[FileUri]) -> Vec<FileUri> {
    let path = Path::new(root);
    if path.is_absolute() {
        return FileUri::from_path(path).into_iter().collect();
    }
    if root.contains(':') {
        if let Ok(uri) = FileUri::parse(root) {
            return vec![uri];
        }
    }
    workspace_roots
        .iter()
        .map(|base| {
            root.split(['/', '\\'])
                .filter(|segment| !segment.is_empty() && *segment != ".")
                .fold(base.clone(), |uri, segment| uri.join(segment))
        })
        .collect()
}

/// Match `name` against a pattern where `*` is any run of characters and
/// `?` is exactly one.
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    // Position after the last `*` and the name position it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p + 1, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star_p, star_n)) => {
                    p = star_p;
                    n = star_n + 1;
                    backtrack = Some((star_p, star_n + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}
