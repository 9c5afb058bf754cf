use crate::error::Result;
use crate::site::page::Page;
use crate::site::path::join;
use crate::site::snapshot::Snapshot;
use crate::site::store::VersionedStore;
use crate::types::EntryKind;

/// pre-order traversal of a whole snapshot, one page per path
///
/// used when there is no previous build to diff against.
pub struct FullWalker<'a, S: VersionedStore + ?Sized> {
    store: &'a S,
    snapshot: &'a Snapshot,
}

impl<'a, S: VersionedStore + ?Sized> FullWalker<'a, S> {
    pub fn new(store: &'a S, snapshot: &'a Snapshot) -> Self {
        Self { store, snapshot }
    }

    /// visit the root and every reachable entry, parents before children
    ///
    /// submodules are visited but not descended into. the first error from a
    /// lookup or from `visit` stops the walk. returns the number of pages.
    pub fn walk<F>(&self, mut visit: F) -> Result<usize>
    where
        F: FnMut(&str, Page) -> Result<()>,
    {
        let mut visited = 0;
        let mut stack = vec![(String::new(), self.snapshot.root_entry())];

        while let Some((path, kind)) = stack.pop() {
            let page = self.snapshot.page(self.store, &path, &kind)?;

            if let EntryKind::Directory { hash } = &kind {
                let tree = self.store.lookup_tree(hash)?;
                // reversed so the stack pops children in name order
                for entry in tree.entries().iter().rev() {
                    stack.push((join(&path, &entry.name), entry.kind.clone()));
                }
            }

            visit(&path, page)?;
            visited += 1;
        }

        Ok(visited)
    }
}
