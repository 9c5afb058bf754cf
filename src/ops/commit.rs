use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::{IoResultExt, Result};
use crate::hash::Hash;
use crate::object::{write_blob, write_commit, write_tree};
use crate::refs::{try_read_ref, write_ref};
use crate::repo::Repo;
use crate::types::{Commit, EntryKind, Tree, TreeEntry};

/// commit a directory tree to a ref
///
/// the new commit's parent is the ref's current commit, if any.
pub fn commit(
    repo: &Repo,
    source: &Path,
    ref_name: &str,
    message: Option<&str>,
    author: Option<&str>,
) -> Result<Hash> {
    let tree_hash = import_dir(repo, source)?;
    commit_tree(repo, &tree_hash, ref_name, message, author)
}

/// record an already stored tree as the next commit on a ref
pub fn commit_tree(
    repo: &Repo,
    tree_hash: &Hash,
    ref_name: &str,
    message: Option<&str>,
    author: Option<&str>,
) -> Result<Hash> {
    let _lock = repo.lock()?;

    let parents: Vec<Hash> = try_read_ref(repo, ref_name)?.into_iter().collect();
    let commit = Commit::new(
        *tree_hash,
        parents,
        author.unwrap_or("zub"),
        message.unwrap_or(""),
    );

    let commit_hash = write_commit(repo, &commit)?;
    write_ref(repo, ref_name, &commit_hash)?;

    tracing::debug!(commit = %commit_hash.short(), tree = %tree_hash.short(), ref_name, "committed");
    Ok(commit_hash)
}

/// store a directory (recursively) and return its tree hash
pub fn import_dir(repo: &Repo, dir: &Path) -> Result<Hash> {
    let mut dir_entries: Vec<_> = fs::read_dir(dir)
        .with_path(dir)?
        .collect::<std::io::Result<Vec<_>>>()
        .with_path(dir)?;
    dir_entries.sort_by_key(|e| e.file_name());

    let mut entries = Vec::with_capacity(dir_entries.len());
    for entry in dir_entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        let meta = fs::symlink_metadata(&path).with_path(&path)?;
        let file_type = meta.file_type();

        let kind = if file_type.is_dir() {
            EntryKind::directory(import_dir(repo, &path)?)
        } else if file_type.is_symlink() {
            let target = fs::read_link(&path).with_path(&path)?;
            let hash = write_blob(repo, target.to_string_lossy().as_bytes())?;
            EntryKind::symlink(hash)
        } else if file_type.is_file() {
            let content = fs::read(&path).with_path(&path)?;
            let hash = write_blob(repo, &content)?;
            if meta.permissions().mode() & 0o111 != 0 {
                EntryKind::executable(hash, meta.len())
            } else {
                EntryKind::regular(hash, meta.len())
            }
        } else {
            // devices, fifos and sockets have no page representation
            tracing::debug!(path = %path.display(), "skipping special file");
            continue;
        };

        entries.push(TreeEntry::new(name, kind));
    }

    write_tree(repo, &Tree::new(entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{read_blob, read_commit, read_tree};
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("repo");
        let repo = Repo::init(&repo_path).unwrap();
        (dir, repo)
    }

    fn root_tree(repo: &Repo, commit_hash: &Hash) -> Tree {
        let commit_obj = read_commit(repo, commit_hash).unwrap();
        read_tree(repo, &commit_obj.tree).unwrap()
    }

    #[test]
    fn test_commit_single_file() {
        let (dir, repo) = test_repo();

        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("hello.txt"), "world").unwrap();

        let hash = commit(&repo, &source, "main", Some("test commit"), None).unwrap();

        assert_eq!(crate::refs::resolve_ref(&repo, "main").unwrap(), hash);

        let tree = root_tree(&repo, &hash);
        assert_eq!(tree.len(), 1);
        let entry = tree.get("hello.txt").unwrap();
        assert_eq!(read_blob(&repo, entry.kind.hash()).unwrap(), b"world");
    }

    #[test]
    fn test_commit_nested_directories() {
        let (dir, repo) = test_repo();

        let source = dir.path().join("source");
        fs::create_dir_all(source.join("a/b/c")).unwrap();
        fs::write(source.join("a/b/c/file.txt"), "deep").unwrap();
        fs::write(source.join("top.txt"), "top").unwrap();

        let hash = commit(&repo, &source, "main", None, None).unwrap();
        let tree = root_tree(&repo, &hash);

        assert_eq!(tree.len(), 2);
        let a = tree.get("a").unwrap();
        assert!(a.kind.is_directory());
        let subtree = read_tree(&repo, a.kind.hash()).unwrap();
        assert!(subtree.get("b").is_some());
    }

    #[test]
    fn test_commit_symlink_and_executable() {
        let (dir, repo) = test_repo();

        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        symlink("target/path", source.join("link")).unwrap();
        fs::write(source.join("run.sh"), "#!/bin/sh\n").unwrap();
        fs::set_permissions(source.join("run.sh"), fs::Permissions::from_mode(0o755)).unwrap();

        let hash = commit(&repo, &source, "main", None, None).unwrap();
        let tree = root_tree(&repo, &hash);

        let link = tree.get("link").unwrap();
        assert!(link.kind.is_symlink());
        assert_eq!(read_blob(&repo, link.kind.hash()).unwrap(), b"target/path");

        assert!(matches!(
            tree.get("run.sh").unwrap().kind,
            EntryKind::Regular {
                executable: true,
                ..
            }
        ));
    }

    #[test]
    fn test_commit_updates_parent() {
        let (dir, repo) = test_repo();

        let source = dir.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("file.txt"), "v1").unwrap();
        let hash1 = commit(&repo, &source, "main", Some("v1"), None).unwrap();

        fs::write(source.join("file.txt"), "v2").unwrap();
        let hash2 = commit(&repo, &source, "main", Some("v2"), Some("someone")).unwrap();

        let commit2 = read_commit(&repo, &hash2).unwrap();
        assert_eq!(commit2.parents, vec![hash1]);
        assert_eq!(commit2.author, "someone");
    }

    #[test]
    fn test_commit_keeps_empty_directory() {
        let (dir, repo) = test_repo();

        let source = dir.path().join("source");
        fs::create_dir_all(source.join("empty")).unwrap();

        let hash = commit(&repo, &source, "main", None, None).unwrap();
        let tree = root_tree(&repo, &hash);

        let empty = tree.get("empty").unwrap();
        assert!(read_tree(&repo, empty.kind.hash()).unwrap().is_empty());
    }

    #[test]
    fn test_commit_prepared_tree() {
        let (_dir, repo) = test_repo();

        let linked = Hash::from_hex(&"c".repeat(64)).unwrap();
        let tree = Tree::new(vec![TreeEntry::new("vendor", EntryKind::submodule(linked))]).unwrap();
        let tree_hash = write_tree(&repo, &tree).unwrap();

        let hash = commit_tree(&repo, &tree_hash, "main", Some("link"), None).unwrap();
        assert_eq!(read_commit(&repo, &hash).unwrap().tree, tree_hash);
    }
}
