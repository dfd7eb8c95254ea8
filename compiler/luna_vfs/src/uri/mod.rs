//! Normalized file URIs.
//!
//! Editors send URIs in many spellings of the same location
//! (`file:///a/./b`, `file:///a/c/../b`, percent-escaped names). Every
//! URI entering the workspace goes through [`FileUri::parse`] or
//! [`FileUri::from_path`] first, so equal locations compare equal.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use luna_ir::FileId;
use thiserror::Error;

/// Errors produced while normalizing a URI.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UriError {
    #[error("empty URI")]
    Empty,

    #[error("URI `{0}` has no scheme")]
    MissingScheme(String),

    #[error("invalid URI scheme `{0}`")]
    InvalidScheme(String),

    #[error("invalid percent escape in `{0}`")]
    InvalidEscape(String),

    #[error("URI `{0}` climbs above its root")]
    EscapesRoot(String),

    #[error("path `{}` is not absolute", .0.display())]
    NotAbsolute(PathBuf),
}

/// A scheme, an optional authority and a list of path segments.
///
/// Segments are stored decoded and never contain `/`, `.` or `..`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileUri {
    scheme: String,
    authority: String,
    segments: Vec<String>,
    /// Written with `//` after the scheme (`file:///x`), as opposed to `untitled:x`.
    hierarchical: bool,
}

impl FileUri {
    /// Parse and normalize a URI string.
    pub fn parse(text: &str) -> Result<Self, UriError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(UriError::Empty);
        }
        let Some((scheme, rest)) = text.split_once(':') else {
            return Err(UriError::MissingScheme(text.to_owned()));
        };
        if !is_valid_scheme(scheme) {
            return Err(UriError::InvalidScheme(scheme.to_owned()));
        }

        let (hierarchical, authority, path) = match rest.strip_prefix("//") {
            Some(after) => match after.split_once('/') {
                Some((authority, path)) => (true, authority, path),
                None => (true, after, ""),
            },
            None => (false, "", rest),
        };

        let mut segments = Vec::new();
        for raw in path.split('/') {
            let segment = percent_decode(raw).ok_or_else(|| UriError::InvalidEscape(text.to_owned()))?;
            push_segment(&mut segments, segment)
                .map_err(|()| UriError::EscapesRoot(text.to_owned()))?;
        }

        Ok(FileUri {
            scheme: scheme.to_ascii_lowercase(),
            authority: authority.to_owned(),
            segments,
            hierarchical,
        })
    }

    /// A `file:` URI for an absolute filesystem path.
    pub fn from_path(path: &Path) -> Result<Self, UriError> {
        if !path.is_absolute() {
            return Err(UriError::NotAbsolute(path.to_path_buf()));
        }
        let mut segments = Vec::new();
        for component in path.components() {
            let segment = match component {
                Component::Prefix(prefix) => prefix.as_os_str().to_string_lossy().into_owned(),
                Component::RootDir => continue,
                Component::CurDir => ".".to_owned(),
                Component::ParentDir => "..".to_owned(),
                Component::Normal(name) => name.to_string_lossy().into_owned(),
            };
            push_segment(&mut segments, segment)
                .map_err(|()| UriError::EscapesRoot(path.display().to_string()))?;
        }
        Ok(FileUri {
            scheme: "file".to_owned(),
            authority: String::new(),
            segments,
            hierarchical: true,
        })
    }

    /// The root folder URI of `scheme`.
    pub fn scheme_root(scheme: &str) -> Self {
        FileUri {
            scheme: scheme.to_ascii_lowercase(),
            authority: String::new(),
            segments: Vec::new(),
            hierarchical: true,
        }
    }

    /// This URI with every segment dropped, spelled the same way.
    pub fn root(&self) -> FileUri {
        FileUri {
            segments: Vec::new(),
            ..self.clone()
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for a scheme root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The containing folder, `None` for a scheme root.
    pub fn parent(&self) -> Option<FileUri> {
        if self.is_root() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }

    /// A child of this URI. `name` is taken as a single segment.
    pub fn join(&self, name: &str) -> FileUri {
        let mut child = self.clone();
        child.segments.push(name.to_owned());
        child
    }

    /// Whether `self` is `base` or lies below it.
    pub fn starts_with(&self, base: &FileUri) -> bool {
        self.scheme == base.scheme
            && self.authority == base.authority
            && self.segments.starts_with(&base.segments)
    }

    /// The local path of a `file:` URI.
    pub fn to_path(&self) -> Option<PathBuf> {
        if self.scheme != "file" {
            return None;
        }
        let joined = self.segments.join("/");
        let has_drive = self.segments.first().is_some_and(|s| s.ends_with(':'));
        if cfg!(windows) && has_drive {
            Some(PathBuf::from(joined))
        } else {
            Some(PathBuf::from(format!("/{joined}")))
        }
    }

    /// The registry ownership key for the file at this URI.
    pub fn file_id(&self) -> FileId {
        FileId::new(self.to_string())
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Append one raw segment, resolving `.` and `..`.
fn push_segment(segments: &mut Vec<String>, segment: String) -> Result<(), ()> {
    match segment.as_str() {
        "" | "." => Ok(()),
        ".." => segments.pop().map(|_| ()).ok_or(()),
        _ => {
            segments.push(segment);
            Ok(())
        }
    }
}

fn percent_decode(raw: &str) -> Option<String> {
    if !raw.contains('%') {
        return Some(raw.to_owned());
    }
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            // `from_str_radix` alone would take a sign: `%+1`.
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn percent_encode(segment: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b':' | b'@'
            | b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'=' => {
                write!(f, "{}", char::from(byte))?;
            }
            _ => write!(f, "%{byte:02X}")?,
        }
    }
    Ok(())
}

impl fmt::Display for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if self.hierarchical {
            write!(f, "//{}/", self.authority)?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            percent_encode(segment, f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FileUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileUri({self})")
    }
}

impl std::str::FromStr for FileUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileUri::parse(s)
    }
}
