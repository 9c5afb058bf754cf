use std::collections::HashSet;
use std::fmt;

use crate::error::Result;
use crate::hash::Hash;
use crate::object::{read_commit, read_tree};
use crate::repo::Repo;
use crate::types::{Commit, EntryKind};

/// one line of history
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: Hash,
    pub author: String,
    pub timestamp: i64,
    /// first line of the commit message
    pub summary: String,
}

impl CommitSummary {
    fn new(id: Hash, commit: &Commit) -> Self {
        Self {
            id,
            author: commit.author.clone(),
            timestamp: commit.timestamp,
            summary: commit.summary().to_string(),
        }
    }
}

/// bounded history plus the number of matching commits
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitLog {
    pub commits: Vec<CommitSummary>,
    pub total: usize,
}

/// history reachable from `start`, newest first
///
/// with a path, only commits that changed the entry at that path (compared
/// with the first parent) are counted. at most `limit` summaries are kept.
pub fn log(repo: &Repo, start: &Hash, path: Option<&str>, limit: usize) -> Result<CommitLog> {
    let path = path.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());

    let mut reachable = Vec::new();
    let mut to_visit = vec![*start];
    let mut visited = HashSet::new();

    while let Some(hash) = to_visit.pop() {
        if !visited.insert(hash) {
            continue;
        }

        let commit = read_commit(repo, &hash)?;
        for parent in commit.parents.iter().rev() {
            to_visit.push(*parent);
        }
        reachable.push((hash, commit));
    }

    reachable.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));

    let mut log = CommitLog::default();
    for (hash, commit) in &reachable {
        if let Some(path) = path {
            if !touches(repo, commit, path)? {
                continue;
            }
        }

        log.total += 1;
        if log.commits.len() < limit {
            log.commits.push(CommitSummary::new(*hash, commit));
        }
    }

    Ok(log)
}

/// did this commit change the entry at `path` relative to its first parent
fn touches(repo: &Repo, commit: &Commit, path: &str) -> Result<bool> {
    let new = entry_at(repo, &commit.tree, path)?;
    let old = match commit.first_parent() {
        Some(parent) => entry_at(repo, &read_commit(repo, parent)?.tree, path)?,
        None => None,
    };
    Ok(new != old)
}

/// find the entry at a slash-separated path below a root tree
///
/// the empty path is the root directory itself.
pub fn entry_at(repo: &Repo, root: &Hash, path: &str) -> Result<Option<EntryKind>> {
    let mut current = EntryKind::directory(*root);

    for component in path.split('/').filter(|s| !s.is_empty()) {
        let EntryKind::Directory { hash } = &current else {
            return Ok(None);
        };
        match read_tree(repo, hash)?.get(component) {
            Some(entry) => current = entry.kind.clone(),
            None => return Ok(None),
        }
    }

    Ok(Some(current))
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "commit {}", self.id)?;
        writeln!(f, "Author: {}", self.author)?;
        writeln!(f, "Date:   {}", format_timestamp(self.timestamp))?;
        writeln!(f)?;
        writeln!(f, "    {}", self.summary)
    }
}

impl fmt::Display for CommitLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, commit) in self.commits.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", commit)?;
        }
        if self.total > self.commits.len() {
            writeln!(f)?;
            writeln!(f, "({} of {} commits shown)", self.commits.len(), self.total)?;
        }
        Ok(())
    }
}

/// format a unix timestamp as `YYYY-MM-DD HH:MM:SS` (UTC)
pub fn format_timestamp(timestamp: i64) -> String {
    let days = timestamp.div_euclid(86400);
    let secs = timestamp.rem_euclid(86400);

    // civil date from days since 1970-01-01
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year,
        month,
        day,
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}
