use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::FileKind;

static README: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^README(\.[a-zA-Z0-9]+)?$").unwrap());

/// a classified, slash-separated repository path
///
/// the empty path is the repository root and is always a directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathFile {
    path: String,
    kind: FileKind,
}

impl PathFile {
    /// create a path, dropping leading and trailing slashes
    pub fn new(path: impl AsRef<str>, kind: FileKind) -> Self {
        let path = path.as_ref().trim_matches('/').to_string();
        let kind = if path.is_empty() {
            FileKind::Directory
        } else {
            kind
        };
        Self { path, kind }
    }

    /// the repository root
    pub fn root() -> Self {
        Self {
            path: String::new(),
            kind: FileKind::Directory,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    /// last path segment, empty for the root
    pub fn name(&self) -> &str {
        base_name(&self.path)
    }

    /// parent directory path, `None` for the root
    pub fn parent(&self) -> Option<&str> {
        parent_path(&self.path)
    }

    /// enclosing directories, nearest first, ending with the root
    pub fn ancestors(&self) -> Ancestors<'_> {
        ancestors(&self.path)
    }

    /// number of segments (0 for the root)
    pub fn depth(&self) -> usize {
        if self.path.is_empty() {
            0
        } else {
            self.path.matches('/').count() + 1
        }
    }

    pub fn is_readme(&self) -> bool {
        !self.is_dir() && is_readme(self.name())
    }

    /// listing order: directories first, then by name
    pub fn listing_cmp(&self, other: &Self) -> Ordering {
        let a = self.kind == FileKind::Directory;
        let b = other.kind == FileKind::Directory;
        b.cmp(&a).then_with(|| self.name().cmp(other.name()))
    }
}

impl fmt::Display for PathFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.path)
        }
    }
}

/// README-class file name
pub fn is_readme(name: &str) -> bool {
    README.is_match(name)
}

/// last segment of a path
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// parent of a path: `None` for the root, `""` for top-level entries
pub fn parent_path(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rfind('/').map_or("", |i| &path[..i]))
}

/// strict ancestors of a path, nearest first, ending with the root
pub fn ancestors(path: &str) -> Ancestors<'_> {
    Ancestors {
        next: parent_path(path),
    }
}

pub struct Ancestors<'a> {
    next: Option<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let current = self.next?;
        self.next = parent_path(current);
        Some(current)
    }
}

/// join a directory path and an entry name
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}
