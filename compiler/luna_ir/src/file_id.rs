use std::fmt;
use std::sync::Arc;

/// Identity of a tracked source file: its normalized URI string.
///
/// Cheap to clone; used as the ownership key for every declaration the
/// indexer records, so removing a file can find exactly what it contributed.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(Arc<str>);

impl FileId {
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        FileId(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        FileId::new(value)
    }
}
