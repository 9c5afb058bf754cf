use crate::error::Result;
use crate::hash::Hash;
use crate::ops::CommitLog;
use crate::site::page::{Content, Page};
use crate::site::path::{is_readme, join, PathFile};
use crate::site::store::VersionedStore;
use crate::types::{EntryKind, EntryRef};

/// one commit and its root tree, fixed for the duration of a build
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    commit: Hash,
    root_tree: Hash,
    max_commits: usize,
}

impl Snapshot {
    /// snapshot of the store's current tip
    pub fn open<S: VersionedStore + ?Sized>(store: &S, max_commits: usize) -> Result<Self> {
        let commit = store.resolve_tip()?;
        let root_tree = store.tree_of(&commit)?;
        Ok(Self::at(commit, root_tree, max_commits))
    }

    pub fn at(commit: Hash, root_tree: Hash, max_commits: usize) -> Self {
        Self {
            commit,
            root_tree,
            max_commits,
        }
    }

    pub fn commit(&self) -> &Hash {
        &self.commit
    }

    pub fn root_tree(&self) -> &Hash {
        &self.root_tree
    }

    pub fn max_commits(&self) -> usize {
        self.max_commits
    }

    /// the entry at `path`, if it exists in this snapshot
    pub fn resolve<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        path: &str,
    ) -> Result<Option<EntryKind>> {
        store.find_entry(&self.root_tree, path)
    }

    /// build the page for an entry of this snapshot
    pub fn page<S: VersionedStore + ?Sized>(
        &self,
        store: &S,
        path: &str,
        kind: &EntryKind,
    ) -> Result<Page> {
        let file = PathFile::new(path, kind.file_kind());
        let commits = match kind {
            // only the index and leaf pages carry history
            EntryKind::Directory { .. } if !file.is_root() => CommitLog::default(),
            _ => {
                let log_path = (!file.is_root()).then_some(file.path());
                store.log_commits(&self.commit, log_path, self.max_commits)?
            }
        };

        let mut page = Page {
            file,
            listing: None,
            commits,
            readme: None,
            content: None,
        };

        match kind {
            EntryKind::Directory { hash } => {
                let tree = store.lookup_tree(hash)?;

                let mut listing: Vec<PathFile> = tree
                    .entries()
                    .iter()
                    .map(|e| PathFile::new(join(path, &e.name), e.kind.file_kind()))
                    .collect();
                listing.sort_by(PathFile::listing_cmp);
                page.listing = Some(listing);

                // entries are name ordered, so this is the first README by name
                if let Some(entry) = tree
                    .entries()
                    .iter()
                    .find(|e| e.kind.is_regular() && is_readme(&e.name))
                {
                    let readme = EntryRef::new(join(path, &entry.name), entry.kind.clone());
                    let bytes = store.blob_contents(&readme)?;
                    page.readme = Some(String::from_utf8_lossy(&bytes).into_owned());
                }
            }
            EntryKind::Regular { .. } => {
                let bytes = store.blob_contents(&EntryRef::new(path, kind.clone()))?;
                page.content = Some(Content::file(bytes));
            }
            EntryKind::Symlink { .. } => {
                let target = store.blob_contents(&EntryRef::new(path, kind.clone()))?;
                page.content = Some(Content::symlink(target));
            }
            EntryKind::Submodule { .. } => {}
        }

        Ok(page)
    }

    /// root directory entry
    pub fn root_entry(&self) -> EntryKind {
        EntryKind::directory(self.root_tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::commit;
    use crate::repo::Repo;
    use crate::site::store::RepoStore;
    use crate::types::FileKind;
    use std::fs;
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("repo");
        let repo = Repo::init(&repo_path).unwrap();
        (dir, repo)
    }

    fn page_at(snapshot: &Snapshot, store: &RepoStore<'_>, path: &str) -> Option<Page> {
        let kind = snapshot.resolve(store, path).unwrap()?;
        Some(snapshot.page(store, path, &kind).unwrap())
    }

    #[test]
    fn test_root_page() {
        let (dir, repo) = test_repo();

        let source = dir.path().join("source");
        fs::create_dir_all(source.join("src")).unwrap();
        fs::write(source.join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(source.join("README.md"), "# hello\n").unwrap();
        fs::write(source.join("README"), "plain\n").unwrap();
        fs::write(source.join("Cargo.toml"), "[package]\n").unwrap();
        let head = commit(&repo, &source, "main", Some("init"), None).unwrap();

        let store = RepoStore::new(&repo, "main");
        let snapshot = Snapshot::open(&store, 5).unwrap();
        assert_eq!(snapshot.commit(), &head);

        let page = page_at(&snapshot, &store, "").unwrap();
        assert!(page.is_index());
        assert!(page.content.is_none());
        assert_eq!(page.readme.as_deref(), Some("plain\n"));
        assert_eq!(page.commits.total, 1);

        let listing: Vec<_> = page.listing.unwrap().iter().map(|p| p.path().to_string()).collect();
        assert_eq!(listing, vec!["src", "Cargo.toml", "README", "README.md"]);
    }

    #[test]
    fn test_file_and_symlink_pages() {
        let (dir, repo) = test_repo();

        let source = dir.path().join("source");
        fs::create_dir_all(source.join("docs")).unwrap();
        fs::write(source.join("docs/guide.txt"), "read me\n").unwrap();
        symlink("guide.txt", source.join("docs/link")).unwrap();
        commit(&repo, &source, "main", None, None).unwrap();

        let store = RepoStore::new(&repo, "main");
        let snapshot = Snapshot::open(&store, 5).unwrap();

        let page = page_at(&snapshot, &store, "docs/guide.txt").unwrap();
        assert_eq!(page.file.kind(), FileKind::File);
        assert!(page.listing.is_none());
        assert!(page.readme.is_none());
        assert_eq!(page.content.unwrap().text(), Some("read me\n"));

        let link = page_at(&snapshot, &store, "docs/link").unwrap();
        let content = link.content.unwrap();
        assert!(content.symlink);
        assert_eq!(content.bytes, b"guide.txt");

        let docs = page_at(&snapshot, &store, "docs").unwrap();
        assert!(docs.readme.is_none());
        assert_eq!(docs.listing.unwrap().len(), 2);

        assert!(page_at(&snapshot, &store, "docs/missing").is_none());
    }

    #[test]
    fn test_only_index_and_leaves_carry_history() {
        let (dir, repo) = test_repo();

        let source = dir.path().join("source");
        fs::create_dir_all(source.join("x/y")).unwrap();
        fs::write(source.join("x/y/z.txt"), "1").unwrap();
        commit(&repo, &source, "main", Some("init"), None).unwrap();
        fs::write(source.join("x/y/z.txt"), "2").unwrap();
        commit(&repo, &source, "main", Some("second"), None).unwrap();

        let store = RepoStore::new(&repo, "main");
        let snapshot = Snapshot::open(&store, 5).unwrap();

        assert_eq!(page_at(&snapshot, &store, "").unwrap().commits.total, 2);
        assert_eq!(page_at(&snapshot, &store, "x/y/z.txt").unwrap().commits.total, 2);

        for dir in ["x", "x/y"] {
            let page = page_at(&snapshot, &store, dir).unwrap();
            assert_eq!(page.commits, CommitLog::default());
            assert!(page.listing.is_some());
        }
    }
}
