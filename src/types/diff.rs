use std::fmt;

use crate::hash::Hash;
use crate::types::{EntryKind, FileKind};

/// diff entry change kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "A"),
            ChangeKind::Modified => write!(f, "M"),
            ChangeKind::Deleted => write!(f, "D"),
        }
    }
}

/// one side of a diff entry: the object, its kind and its full path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryRef {
    pub path: String,
    pub kind: EntryKind,
}

impl EntryRef {
    pub fn new(path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// object id of the entry
    pub fn hash(&self) -> &Hash {
        self.kind.hash()
    }

    /// page classification of the entry
    pub fn file_kind(&self) -> FileKind {
        self.kind.file_kind()
    }
}

/// a changed leaf between two trees
///
/// `old == None` means created, `new == None` means removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffEntry {
    pub old: Option<EntryRef>,
    pub new: Option<EntryRef>,
}

impl DiffEntry {
    pub fn added(new: EntryRef) -> Self {
        Self {
            old: None,
            new: Some(new),
        }
    }

    pub fn deleted(old: EntryRef) -> Self {
        Self {
            old: Some(old),
            new: None,
        }
    }

    pub fn modified(old: EntryRef, new: EntryRef) -> Self {
        Self {
            old: Some(old),
            new: Some(new),
        }
    }

    /// path of the changed entry
    pub fn path(&self) -> &str {
        match (&self.new, &self.old) {
            (Some(e), _) | (None, Some(e)) => &e.path,
            (None, None) => "",
        }
    }

    pub fn change_kind(&self) -> ChangeKind {
        match (&self.old, &self.new) {
            (None, _) => ChangeKind::Added,
            (_, None) => ChangeKind::Deleted,
            _ => ChangeKind::Modified,
        }
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.change_kind(), self.path())
    }
}
