//! high-level operations on zub repositories

mod commit;
mod diff;
mod log;

pub use commit::{commit, commit_tree, import_dir};
pub use diff::{diff, diff_trees};
pub use log::{entry_at, format_timestamp, log, CommitLog, CommitSummary};
