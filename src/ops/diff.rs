use crate::error::Result;
use crate::hash::Hash;
use crate::object::{read_commit, read_tree};
use crate::refs::resolve_ref;
use crate::repo::Repo;
use crate::types::{DiffEntry, EntryKind, EntryRef, Tree};

/// compare the trees of two refs (or commit hashes)
pub fn diff(repo: &Repo, ref1: &str, ref2: &str) -> Result<Vec<DiffEntry>> {
    let commit1 = resolve_ref(repo, ref1)?;
    let commit2 = resolve_ref(repo, ref2)?;

    let tree1 = read_commit(repo, &commit1)?.tree;
    let tree2 = read_commit(repo, &commit2)?.tree;

    diff_trees(repo, Some(&tree1), &tree2)
}

/// leaf diff of two root trees, sorted by path
///
/// leaves are files, symlinks, submodules and empty directories. a missing
/// old tree diffs against the empty tree.
pub fn diff_trees(repo: &Repo, old: Option<&Hash>, new: &Hash) -> Result<Vec<DiffEntry>> {
    if old == Some(new) {
        return Ok(vec![]);
    }

    let t1 = match old {
        Some(hash) => read_tree(repo, hash)?,
        None => Tree::empty(),
    };
    let t2 = read_tree(repo, new)?;

    let mut changes = Vec::new();
    diff_tree_contents(repo, &t1, &t2, "", &mut changes)?;
    changes.sort_by(|a, b| a.path().cmp(b.path()));

    Ok(changes)
}

fn diff_tree_contents(
    repo: &Repo,
    t1: &Tree,
    t2: &Tree,
    prefix: &str,
    changes: &mut Vec<DiffEntry>,
) -> Result<()> {
    let mut all_names: Vec<&str> = t1
        .entries()
        .iter()
        .chain(t2.entries())
        .map(|e| e.name.as_str())
        .collect();
    all_names.sort_unstable();
    all_names.dedup();

    for name in all_names {
        let path = join_path(prefix, name);

        match (t1.get(name), t2.get(name)) {
            (None, Some(entry)) => {
                for leaf in leaves(repo, &entry.kind, &path)? {
                    changes.push(DiffEntry::added(leaf));
                }
            }

            (Some(entry), None) => {
                for leaf in leaves(repo, &entry.kind, &path)? {
                    changes.push(DiffEntry::deleted(leaf));
                }
            }

            (Some(e1), Some(e2)) => match (&e1.kind, &e2.kind) {
                (EntryKind::Directory { hash: h1 }, EntryKind::Directory { hash: h2 }) => {
                    if h1 != h2 {
                        let sub1 = read_tree(repo, h1)?;
                        let sub2 = read_tree(repo, h2)?;
                        diff_tree_contents(repo, &sub1, &sub2, &path, changes)?;
                    }
                }

                (k1, k2) if k1.is_directory() || k2.is_directory() => {
                    let old_leaves = leaves(repo, k1, &path)?;
                    let new_leaves = leaves(repo, k2, &path)?;

                    // an empty directory swapped for a non-directory stays one leaf
                    if let ([old], [new]) = (old_leaves.as_slice(), new_leaves.as_slice()) {
                        if old.path == new.path {
                            changes.push(DiffEntry::modified(old.clone(), new.clone()));
                            continue;
                        }
                    }

                    changes.extend(old_leaves.into_iter().map(DiffEntry::deleted));
                    changes.extend(new_leaves.into_iter().map(DiffEntry::added));
                }

                (k1, k2) => {
                    if k1 != k2 {
                        changes.push(DiffEntry::modified(
                            EntryRef::new(path.clone(), k1.clone()),
                            EntryRef::new(path, k2.clone()),
                        ));
                    }
                }
            },

            (None, None) => unreachable!(),
        }
    }

    Ok(())
}

/// collect the leaves at and below an entry
fn leaves(repo: &Repo, kind: &EntryKind, path: &str) -> Result<Vec<EntryRef>> {
    let mut out = Vec::new();
    collect_leaves(repo, kind, path, &mut out)?;
    Ok(out)
}

fn collect_leaves(repo: &Repo, kind: &EntryKind, path: &str, out: &mut Vec<EntryRef>) -> Result<()> {
    if let EntryKind::Directory { hash } = kind {
        let subtree = read_tree(repo, hash)?;
        if !subtree.is_empty() {
            for entry in subtree.entries() {
                collect_leaves(repo, &entry.kind, &join_path(path, &entry.name), out)?;
            }
            return Ok(());
        }
    }

    out.push(EntryRef::new(path, kind.clone()));
    Ok(())
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}
