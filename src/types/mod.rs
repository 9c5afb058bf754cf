mod commit;
mod diff;
mod tree;

pub use commit::Commit;
pub use diff::{ChangeKind, DiffEntry, EntryRef};
pub use tree::{EntryKind, FileKind, Tree, TreeEntry};
