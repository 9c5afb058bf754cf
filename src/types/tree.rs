use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::hash::Hash;

/// a directory tree - collection of entries sorted by name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// create a new tree, validating and sorting entries
    pub fn new(mut entries: Vec<TreeEntry>) -> Result<Self> {
        // validate entry names
        for entry in &entries {
            validate_entry_name(&entry.name)?;
        }

        // sort by name (byte-wise)
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        // check for duplicates
        for window in entries.windows(2) {
            if window[0].name == window[1].name {
                return Err(Error::DuplicateEntryName(window[0].name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// create an empty tree
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// get entries slice
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// look up entry by name
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is tree empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// validate an entry name
fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("empty name".to_string()));
    }
    if name.contains('/') {
        return Err(Error::InvalidEntryName(format!(
            "name contains '/': {}",
            name
        )));
    }
    if name.contains('\0') {
        return Err(Error::InvalidEntryName(format!(
            "name contains null byte: {}",
            name
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::InvalidEntryName(format!("reserved name: {}", name)));
    }
    Ok(())
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// kind of tree entry with associated metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    /// regular file
    Regular {
        hash: Hash,
        size: u64,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        executable: bool,
    },

    /// symbolic link, target stored as a blob
    Symlink { hash: Hash },

    /// directory
    Directory { hash: Hash },

    /// link to a commit of another repository
    Submodule { commit: Hash },
}

impl EntryKind {
    /// get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            EntryKind::Regular { .. } => "regular",
            EntryKind::Symlink { .. } => "symlink",
            EntryKind::Directory { .. } => "directory",
            EntryKind::Submodule { .. } => "submodule",
        }
    }

    /// is this a directory entry
    pub fn is_directory(&self) -> bool {
        matches!(self, EntryKind::Directory { .. })
    }

    /// is this a regular file entry
    pub fn is_regular(&self) -> bool {
        matches!(self, EntryKind::Regular { .. })
    }

    /// is this a symlink entry
    pub fn is_symlink(&self) -> bool {
        matches!(self, EntryKind::Symlink { .. })
    }

    /// the object this entry points at
    pub fn hash(&self) -> &Hash {
        match self {
            EntryKind::Regular { hash, .. } => hash,
            EntryKind::Symlink { hash } => hash,
            EntryKind::Directory { hash } => hash,
            EntryKind::Submodule { commit } => commit,
        }
    }

    /// page classification of this entry
    pub fn file_kind(&self) -> FileKind {
        match self {
            EntryKind::Regular { .. } | EntryKind::Symlink { .. } => FileKind::File,
            EntryKind::Directory { .. } => FileKind::Directory,
            EntryKind::Submodule { .. } => FileKind::Submodule,
        }
    }

    /// create a regular file entry
    pub fn regular(hash: Hash, size: u64) -> Self {
        Self::Regular {
            hash,
            size,
            executable: false,
        }
    }

    /// create an executable file entry
    pub fn executable(hash: Hash, size: u64) -> Self {
        Self::Regular {
            hash,
            size,
            executable: true,
        }
    }

    /// create a symlink entry
    pub fn symlink(hash: Hash) -> Self {
        Self::Symlink { hash }
    }

    /// create a directory entry
    pub fn directory(hash: Hash) -> Self {
        Self::Directory { hash }
    }

    /// create a submodule entry
    pub fn submodule(commit: Hash) -> Self {
        Self::Submodule { commit }
    }
}

/// how a path is presented: as a file, a directory or a submodule link
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    File,
    Directory,
    Submodule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_empty() {
        let t = Tree::empty();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
    }

    #[test]
    fn test_tree_sorting() {
        let entries = vec![
            TreeEntry::new("zebra", EntryKind::regular(Hash::ZERO, 0)),
            TreeEntry::new("alpha", EntryKind::regular(Hash::ZERO, 0)),
            TreeEntry::new("beta", EntryKind::regular(Hash::ZERO, 0)),
        ];
        let tree = Tree::new(entries).unwrap();
        let names: Vec<_> = tree.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "zebra"]);
    }

    #[test]
    fn test_tree_get() {
        let entries = vec![
            TreeEntry::new("alpha", EntryKind::regular(Hash::ZERO, 10)),
            TreeEntry::new("beta", EntryKind::directory(Hash::ZERO)),
        ];
        let tree = Tree::new(entries).unwrap();

        assert!(tree.get("alpha").is_some());
        assert!(tree.get("beta").unwrap().kind.is_directory());
        assert!(tree.get("gamma").is_none());
    }

    #[test]
    fn test_tree_rejects_bad_names() {
        for name in ["", "foo/bar", "foo\0bar", ".", ".."] {
            let entries = vec![TreeEntry::new(name, EntryKind::regular(Hash::ZERO, 0))];
            assert!(
                matches!(Tree::new(entries), Err(Error::InvalidEntryName(_))),
                "accepted {:?}",
                name
            );
        }
    }

    #[test]
    fn test_tree_rejects_duplicates() {
        let entries = vec![
            TreeEntry::new("same", EntryKind::regular(Hash::ZERO, 0)),
            TreeEntry::new("same", EntryKind::directory(Hash::ZERO)),
        ];
        assert!(matches!(
            Tree::new(entries),
            Err(Error::DuplicateEntryName(_))
        ));
    }

    #[test]
    fn test_entry_kind_classification() {
        assert_eq!(EntryKind::regular(Hash::ZERO, 0).file_kind(), FileKind::File);
        assert_eq!(EntryKind::symlink(Hash::ZERO).file_kind(), FileKind::File);
        assert_eq!(
            EntryKind::directory(Hash::ZERO).file_kind(),
            FileKind::Directory
        );
        assert_eq!(
            EntryKind::submodule(Hash::ZERO).file_kind(),
            FileKind::Submodule
        );
    }

    #[test]
    fn test_entry_kind_type_names() {
        assert_eq!(EntryKind::regular(Hash::ZERO, 0).type_name(), "regular");
        assert_eq!(EntryKind::symlink(Hash::ZERO).type_name(), "symlink");
        assert_eq!(EntryKind::directory(Hash::ZERO).type_name(), "directory");
        assert_eq!(EntryKind::submodule(Hash::ZERO).type_name(), "submodule");
    }

    #[test]
    fn test_executable_bit_changes_entry() {
        assert_ne!(
            EntryKind::regular(Hash::ZERO, 4),
            EntryKind::executable(Hash::ZERO, 4)
        );
    }

    #[test]
    fn test_tree_cbor_roundtrip() {
        let h = Hash::from_hex("abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789")
            .unwrap();
        let entries = vec![
            TreeEntry::new("file.txt", EntryKind::regular(h, 100)),
            TreeEntry::new("run.sh", EntryKind::executable(h, 10)),
            TreeEntry::new("link", EntryKind::symlink(h)),
            TreeEntry::new("dir", EntryKind::directory(h)),
            TreeEntry::new("vendor", EntryKind::submodule(h)),
        ];
        let tree = Tree::new(entries).unwrap();

        let mut cbor_bytes = Vec::new();
        ciborium::into_writer(&tree, &mut cbor_bytes).unwrap();
        let parsed: Tree = ciborium::from_reader(&cbor_bytes[..]).unwrap();

        assert_eq!(tree, parsed);
    }

    #[test]
    fn test_tree_cbor_determinism() {
        // same tree should produce identical cbor bytes
        let tree1 = Tree::new(vec![
            TreeEntry::new("b", EntryKind::regular(Hash::ZERO, 0)),
            TreeEntry::new("a", EntryKind::regular(Hash::ZERO, 0)),
        ])
        .unwrap();
        let tree2 = Tree::new(vec![
            TreeEntry::new("a", EntryKind::regular(Hash::ZERO, 0)),
            TreeEntry::new("b", EntryKind::regular(Hash::ZERO, 0)),
        ])
        .unwrap();

        let mut bytes1 = Vec::new();
        let mut bytes2 = Vec::new();
        ciborium::into_writer(&tree1, &mut bytes1).unwrap();
        ciborium::into_writer(&tree2, &mut bytes2).unwrap();

        assert_eq!(bytes1, bytes2);
    }
}
