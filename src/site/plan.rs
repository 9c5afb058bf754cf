use std::collections::BTreeMap;

use crate::error::Result;
use crate::hash::Hash;
use crate::site::path::{ancestors, base_name, is_readme, parent_path};
use crate::site::snapshot::Snapshot;
use crate::site::store::VersionedStore;
use crate::types::{DiffEntry, EntryKind};

/// what to do with one output page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// (re)render the page for the entry now at this path
    Generate(EntryKind),
    /// remove the page
    Delete,
}

impl Action {
    pub fn is_generate(&self) -> bool {
        matches!(self, Action::Generate(_))
    }
}

/// outcome of planning: one action per affected path, in path order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuildSet {
    actions: BTreeMap<String, Action>,
}

impl RebuildSet {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&Action> {
        self.actions.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Action)> {
        self.actions.iter().map(|(path, action)| (path.as_str(), action))
    }

    /// paths that will be regenerated
    pub fn generated(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, a)| a.is_generate()).map(|(p, _)| p)
    }

    /// paths that will be deleted
    pub fn deleted(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|(_, a)| !a.is_generate()).map(|(p, _)| p)
    }
}

impl IntoIterator for RebuildSet {
    type Item = (String, Action);
    type IntoIter = std::collections::btree_map::IntoIter<String, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

/// a tentative mark, settled against the new tree at the end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Generate,
    Delete,
}

/// turns a leaf diff into the set of pages to regenerate or delete
pub struct RebuildPlanner<'a, S: VersionedStore + ?Sized> {
    store: &'a S,
    old_root: Hash,
    new: &'a Snapshot,
    marks: BTreeMap<String, Mark>,
}

impl<'a, S: VersionedStore + ?Sized> RebuildPlanner<'a, S> {
    pub fn new(store: &'a S, old_root: Hash, new: &'a Snapshot) -> Self {
        Self {
            store,
            old_root,
            new,
            marks: BTreeMap::new(),
        }
    }

    /// plan the rebuild for `diff`, the leaf diff between the two roots
    pub fn plan(mut self, diff: &[DiffEntry]) -> Result<RebuildSet> {
        for entry in diff {
            match (&entry.old, &entry.new) {
                (None, Some(new)) => self.created(&new.path)?,
                (Some(old), None) => self.removed(&old.path)?,
                (Some(old), Some(new)) => {
                    self.modified(&new.path, old.file_kind() != new.file_kind())
                }
                (None, None) => {}
            }
        }

        // the index aggregates repository-wide history
        if self.old_root != *self.new.root_tree() {
            self.mark("", Mark::Generate);
        }

        self.settle()
    }

    fn created(&mut self, path: &str) -> Result<()> {
        self.mark(path, Mark::Generate);

        // directories that came into existence with this leaf, up to and
        // including the first one that already existed (its listing changed).
        // the root always existed, so this ends there at the latest.
        for prefix in ancestors(path) {
            if self.old_dir_exists(prefix)? {
                self.mark(prefix, Mark::Generate);
                break;
            }
            if self.new_exists(prefix)? {
                self.mark(prefix, Mark::Generate);
            }
        }
        Ok(())
    }

    fn removed(&mut self, path: &str) -> Result<()> {
        self.mark(path, Mark::Delete);

        // the first surviving ancestor lost a child; everything below it is gone
        for ancestor in ancestors(path) {
            if self.new_exists(ancestor)? {
                self.mark(ancestor, Mark::Generate);
                break;
            }
            self.mark(ancestor, Mark::Delete);
        }
        Ok(())
    }

    fn modified(&mut self, path: &str, kind_changed: bool) {
        self.mark(path, Mark::Generate);

        if kind_changed || is_readme(base_name(path)) {
            if let Some(parent) = parent_path(path) {
                self.mark(parent, Mark::Generate);
            }
        }
    }

    /// Generate wins over Delete; the liveness check in `settle` has the last word
    fn mark(&mut self, path: &str, mark: Mark) {
        match self.marks.get_mut(path) {
            Some(existing) => {
                if mark == Mark::Generate {
                    *existing = Mark::Generate;
                }
            }
            None => {
                self.marks.insert(path.to_string(), mark);
            }
        }
    }

    /// resolve every mark against the new tree
    fn settle(self) -> Result<RebuildSet> {
        let mut actions = BTreeMap::new();

        for (path, mark) in self.marks {
            let action = match self.new.resolve(self.store, &path)? {
                Some(kind) => Action::Generate(kind),
                None => {
                    if mark == Mark::Generate {
                        tracing::debug!(path = %path, "planned page no longer exists, deleting");
                    }
                    Action::Delete
                }
            };
            actions.insert(path, action);
        }

        Ok(RebuildSet { actions })
    }

    fn old_dir_exists(&self, path: &str) -> Result<bool> {
        Ok(matches!(
            self.store.find_entry(&self.old_root, path)?,
            Some(EntryKind::Directory { .. })
        ))
    }

    fn new_exists(&self, path: &str) -> Result<bool> {
        Ok(self.new.resolve(self.store, path)?.is_some())
    }
}
