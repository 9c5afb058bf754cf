use crate::ops::CommitLog;
use crate::site::path::PathFile;

/// number of leading bytes inspected for NUL when classifying content
const BINARY_SNIFF_LEN: usize = 8000;

/// everything a renderer needs to produce one output page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub file: PathFile,
    /// children of a directory, directories first then by name
    pub listing: Option<Vec<PathFile>>,
    /// recent commits touching this path (all commits for the root)
    pub commits: CommitLog,
    /// text of the directory's README, if it has one
    pub readme: Option<String>,
    /// file bytes or symlink target
    pub content: Option<Content>,
}

impl Page {
    pub fn path(&self) -> &str {
        self.file.path()
    }

    pub fn is_index(&self) -> bool {
        self.file.is_root()
    }
}

/// contents of a file page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Content {
    pub bytes: Vec<u8>,
    /// bytes are a symlink target rather than file data
    pub symlink: bool,
}

impl Content {
    pub fn file(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            symlink: false,
        }
    }

    pub fn symlink(target: Vec<u8>) -> Self {
        Self {
            bytes: target,
            symlink: true,
        }
    }

    /// NUL in the leading bytes, or not UTF-8
    pub fn is_binary(&self) -> bool {
        let head = &self.bytes[..self.bytes.len().min(BINARY_SNIFF_LEN)];
        head.contains(&0) || std::str::from_utf8(&self.bytes).is_err()
    }

    /// the content as text, unless it is binary
    pub fn text(&self) -> Option<&str> {
        if self.is_binary() {
            return None;
        }
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
