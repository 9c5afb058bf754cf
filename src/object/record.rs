//! trees and commits: CBOR records, zstd compressed, named by the hash of
//! the compressed bytes

use std::path::PathBuf;

use crate::error::Result;
use crate::hash::Hash;
use crate::object::{object_path, read_cbor_object, write_cbor_object};
use crate::repo::Repo;
use crate::types::{Commit, Tree};

pub fn write_tree(repo: &Repo, tree: &Tree) -> Result<Hash> {
    write_cbor_object(repo, tree, tree_path)
}

pub fn read_tree(repo: &Repo, hash: &Hash) -> Result<Tree> {
    read_cbor_object(&tree_path(repo, hash), hash)
}

pub fn write_commit(repo: &Repo, commit: &Commit) -> Result<Hash> {
    write_cbor_object(repo, commit, commit_path)
}

pub fn read_commit(repo: &Repo, hash: &Hash) -> Result<Commit> {
    read_cbor_object(&commit_path(repo, hash), hash)
}

pub(crate) fn tree_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(repo.trees_path(), hash)
}

pub(crate) fn commit_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(repo.commits_path(), hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{EntryKind, TreeEntry};
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo")).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_tree_with_every_entry_kind() {
        let (_dir, repo) = test_repo();

        let tree = Tree::new(vec![
            TreeEntry::new("README", EntryKind::regular(Hash::ZERO, 100)),
            TreeEntry::new("docs", EntryKind::directory(Hash::ZERO)),
            TreeEntry::new("link", EntryKind::symlink(Hash::ZERO)),
            TreeEntry::new("vendor", EntryKind::submodule(Hash::ZERO)),
        ])
        .unwrap();

        let hash = write_tree(&repo, &tree).unwrap();
        assert_eq!(write_tree(&repo, &tree).unwrap(), hash);
        assert_eq!(read_tree(&repo, &hash).unwrap(), tree);
        assert!(tree_path(&repo, &hash).starts_with(repo.trees_path()));
    }

    #[test]
    fn test_commit_keeps_parents() {
        let (_dir, repo) = test_repo();

        let root = write_tree(&repo, &Tree::empty()).unwrap();
        let parent = Hash::from_hex(&"a".repeat(64)).unwrap();
        let commit = Commit::with_timestamp(root, vec![parent], "author", 1_234_567_890, "child");

        let hash = write_commit(&repo, &commit).unwrap();
        let back = read_commit(&repo, &hash).unwrap();
        assert_eq!(back, commit);
        assert_eq!(back.first_parent(), Some(&parent));
    }

    #[test]
    fn test_missing_objects() {
        let (_dir, repo) = test_repo();

        let fake = Hash::from_hex(&"1".repeat(64)).unwrap();
        assert!(matches!(read_tree(&repo, &fake), Err(Error::ObjectNotFound(_))));
        assert!(matches!(read_commit(&repo, &fake), Err(Error::ObjectNotFound(_))));

        // trees and commits live apart, a tree id is not a commit
        let tree = write_tree(&repo, &Tree::empty()).unwrap();
        assert!(matches!(read_commit(&repo, &tree), Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_corrupt_tree_detected() {
        let (_dir, repo) = test_repo();

        let hash = write_tree(&repo, &Tree::empty()).unwrap();
        std::fs::write(tree_path(&repo, &hash), b"garbage").unwrap();

        assert!(matches!(read_tree(&repo, &hash), Err(Error::CorruptObject(_))));
    }
}
