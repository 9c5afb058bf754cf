//! static pages for a repository, rebuilt incrementally
//!
//! a first build walks the whole tip tree. later builds diff the tree of the
//! last completed build against the tip and only touch the pages that changed,
//! including directories that appeared or emptied out along the way.
//!
//! several published repositories can share one landing page, see
//! [`build_index`].

mod build;
mod index;
mod output;
mod page;
mod path;
mod plan;
mod render;
mod snapshot;
mod state;
mod store;
mod walk;

pub use build::{build, build_site, BuildMode, BuildOptions, BuildReport, Outcome};
pub use index::{build_index, RepoEntry, RepoIndex, DEFAULT_INDEX_TITLE};
pub use output::{OutputDir, STATE_FILE};
pub use page::{Content, Page};
pub use path::{is_readme, PathFile};
pub use plan::{Action, RebuildPlanner, RebuildSet};
pub use render::{HtmlRenderer, Render, SiteInfo};
pub use snapshot::Snapshot;
pub use state::BuildState;
pub use store::{RepoStore, VersionedStore};
pub use walk::FullWalker;
