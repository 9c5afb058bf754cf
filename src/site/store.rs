use crate::error::Result;
use crate::hash::Hash;
use crate::object::{read_blob, read_commit, read_tree};
use crate::ops::{self, CommitLog};
use crate::refs::resolve_ref;
use crate::repo::Repo;
use crate::types::{DiffEntry, EntryKind, EntryRef, Tree};

/// read-only access to a versioned tree store
///
/// the page engine only ever reads through this trait; it never writes to
/// the store.
pub trait VersionedStore {
    /// commit at the tip of the tracked ref
    fn resolve_tip(&self) -> Result<Hash>;

    /// root tree of a commit
    fn tree_of(&self, commit: &Hash) -> Result<Hash>;

    fn lookup_tree(&self, tree: &Hash) -> Result<Tree>;

    /// leaf changes between two root trees, sorted by path
    fn diff_trees(&self, old: Option<&Hash>, new: &Hash) -> Result<Vec<DiffEntry>>;

    /// history reachable from `commit`, optionally limited to one path
    fn log_commits(&self, commit: &Hash, path: Option<&str>, limit: usize) -> Result<CommitLog>;

    /// bytes behind a file or symlink entry
    fn blob_contents(&self, entry: &EntryRef) -> Result<Vec<u8>>;

    /// entry at a slash-separated path below a root tree
    ///
    /// the empty path resolves to the root directory itself. a path running
    /// through a non-directory resolves to nothing.
    fn find_entry(&self, root: &Hash, path: &str) -> Result<Option<EntryKind>>;
}

/// a zub repository publishing a single ref
pub struct RepoStore<'a> {
    repo: &'a Repo,
    tip: String,
}

impl<'a> RepoStore<'a> {
    pub fn new(repo: &'a Repo, tip: impl Into<String>) -> Self {
        Self {
            repo,
            tip: tip.into(),
        }
    }

    pub fn repo(&self) -> &Repo {
        self.repo
    }

    /// name of the tracked ref
    pub fn tip(&self) -> &str {
        &self.tip
    }
}

impl VersionedStore for RepoStore<'_> {
    fn resolve_tip(&self) -> Result<Hash> {
        resolve_ref(self.repo, &self.tip)
    }

    fn tree_of(&self, commit: &Hash) -> Result<Hash> {
        Ok(read_commit(self.repo, commit)?.tree)
    }

    fn lookup_tree(&self, tree: &Hash) -> Result<Tree> {
        read_tree(self.repo, tree)
    }

    fn diff_trees(&self, old: Option<&Hash>, new: &Hash) -> Result<Vec<DiffEntry>> {
        ops::diff_trees(self.repo, old, new)
    }

    fn log_commits(&self, commit: &Hash, path: Option<&str>, limit: usize) -> Result<CommitLog> {
        ops::log(self.repo, commit, path, limit)
    }

    fn blob_contents(&self, entry: &EntryRef) -> Result<Vec<u8>> {
        read_blob(self.repo, entry.hash())
    }

    fn find_entry(&self, root: &Hash, path: &str) -> Result<Option<EntryKind>> {
        ops::entry_at(self.repo, root, path)
    }
}
