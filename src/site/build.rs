use std::fmt;
use std::path::Path;

use crate::config::DEFAULT_MAX_COMMITS;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::site::output::OutputDir;
use crate::site::page::Page;
use crate::site::plan::{Action, RebuildPlanner};
use crate::site::render::{Render, SiteInfo};
use crate::site::snapshot::Snapshot;
use crate::site::state::BuildState;
use crate::site::store::VersionedStore;
use crate::site::walk::FullWalker;

/// options for a build
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// commits listed per page
    pub max_commits: usize,
    /// ignore the previous build and regenerate everything
    pub force: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_commits: DEFAULT_MAX_COMMITS,
            force: false,
        }
    }
}

/// what the caller should do with one path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Generate(Page),
    Delete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
    /// every page was generated
    Full,
    /// only pages affected since the last build were touched
    Incremental,
    /// the tip tree was already built
    UpToDate,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Full => write!(f, "full"),
            BuildMode::Incremental => write!(f, "incremental"),
            BuildMode::UpToDate => write!(f, "up to date"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildReport {
    pub mode: BuildMode,
    pub generated: usize,
    pub deleted: usize,
    /// root tree that was built
    pub tree: Hash,
}

/// run one build, handing each affected path to `visit` in order
///
/// the state file is only rewritten once every outcome was accepted by
/// `visit`; any error leaves the previous state in place.
pub fn build<S, F>(
    store: &S,
    options: &BuildOptions,
    state_path: &Path,
    mut visit: F,
) -> Result<BuildReport>
where
    S: VersionedStore + ?Sized,
    F: FnMut(&str, Outcome) -> Result<()>,
{
    let previous = if options.force {
        None
    } else {
        previous_tree(store, state_path)?
    };

    let snapshot = Snapshot::open(store, options.max_commits)?;
    let tree = *snapshot.root_tree();

    let mut report = BuildReport {
        mode: BuildMode::Full,
        generated: 0,
        deleted: 0,
        tree,
    };

    match previous {
        None => {
            tracing::info!(tree = %tree.short(), "full build");
            report.generated = FullWalker::new(store, &snapshot).walk(|path, page| {
                tracing::debug!(path, "generate");
                visit(path, Outcome::Generate(page))
            })?;
        }
        Some(old) if old == tree => {
            tracing::info!(tree = %tree.short(), "already built");
            report.mode = BuildMode::UpToDate;
            return Ok(report);
        }
        Some(old) => {
            tracing::info!(from = %old.short(), to = %tree.short(), "incremental build");
            report.mode = BuildMode::Incremental;

            let diff = store.diff_trees(Some(&old), &tree)?;
            let plan = RebuildPlanner::new(store, old, &snapshot).plan(&diff)?;
            tracing::debug!(changes = diff.len(), pages = plan.len(), "planned rebuild");

            for (path, action) in plan {
                match action {
                    Action::Generate(kind) => {
                        tracing::debug!(path = %path, "generate");
                        let page = snapshot.page(store, &path, &kind)?;
                        visit(&path, Outcome::Generate(page))?;
                        report.generated += 1;
                    }
                    Action::Delete => {
                        tracing::debug!(path = %path, "delete");
                        visit(&path, Outcome::Delete)?;
                        report.deleted += 1;
                    }
                }
            }
        }
    }

    BuildState::new(tree).save(state_path)?;
    tracing::info!(
        generated = report.generated,
        deleted = report.deleted,
        "build complete"
    );
    Ok(report)
}

/// tree of the last build, if it can be trusted
///
/// an unreadable state file, or one naming a tree the store does not have,
/// is logged and ignored so the build starts over.
fn previous_tree<S: VersionedStore + ?Sized>(store: &S, state_path: &Path) -> Result<Option<Hash>> {
    let state = match BuildState::load(state_path) {
        Ok(Some(state)) => state,
        Ok(None) => {
            tracing::debug!(path = %state_path.display(), "no previous build");
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!(error = %e, "discarding build state");
            return Ok(None);
        }
    };

    match store.lookup_tree(state.tree()) {
        Ok(_) => Ok(Some(*state.tree())),
        Err(e @ (Error::ObjectNotFound(_) | Error::CorruptObject(_))) => {
            tracing::warn!(error = %e, "previous tree unavailable, discarding build state");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// build into an output directory, rendering and deleting pages
///
/// holds the output directory's lock for the whole build.
pub fn build_site<S, R>(
    store: &S,
    out: &OutputDir,
    renderer: &R,
    site: &SiteInfo,
    options: &BuildOptions,
) -> Result<BuildReport>
where
    S: VersionedStore + ?Sized,
    R: Render + ?Sized,
{
    let _lock = out.lock()?;

    let report = build(store, options, &out.state_path(), |path, outcome| match outcome {
        Outcome::Generate(page) => out.write(path, &renderer.render(&page, site)?),
        Outcome::Delete => out.remove(path),
    })?;

    if out.write_stylesheet(options.force)? {
        tracing::debug!("wrote stylesheet");
    }

    Ok(report)
}
