use std::path::{Path, PathBuf};

use crate::config::store_name;
use crate::error::Result;
use crate::object::read_commit;
use crate::refs::resolve_ref;
use crate::repo::Repo;
use crate::site::output::OutputDir;
use crate::site::render::HtmlRenderer;

/// default heading of the repository index
pub const DEFAULT_INDEX_TITLE: &str = "zub-pages";

/// one published repository on the index page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoEntry {
    /// shown name, the repository's site title
    pub name: String,
    /// directory its pages are published under, relative to the index
    pub dir: String,
    pub description: Option<String>,
    /// timestamp of the tip commit
    pub modified: i64,
}

impl RepoEntry {
    /// summarize the repository at `path` from its config and tip commit
    pub fn load(path: &Path) -> Result<Self> {
        let repo = Repo::open(path)?;
        let site = &repo.config().site;

        let tip = resolve_ref(&repo, &site.tip)?;
        let commit = read_commit(&repo, &tip)?;

        Ok(Self {
            name: site.title_for(path),
            dir: store_name(path),
            description: site.description.clone(),
            modified: commit.timestamp,
        })
    }
}

/// a landing page over several repositories
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepoIndex {
    pub title: String,
    pub description: Option<String>,
    /// HTML placed above the list
    pub readme: Option<String>,
    /// most recently modified first
    pub repos: Vec<RepoEntry>,
}

impl RepoIndex {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_readme(mut self, readme: Option<String>) -> Self {
        self.readme = readme;
        self
    }

    /// load every repository, keeping the list ordered by last modification
    ///
    /// the first repository that cannot be opened or has no tip fails the load.
    pub fn load_repos(mut self, paths: &[PathBuf]) -> Result<Self> {
        for path in paths {
            self.repos.push(RepoEntry::load(path)?);
        }
        self.repos.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(self)
    }
}

/// write `index.html` and the stylesheet into the output directory
pub fn build_index(index: &RepoIndex, out: &OutputDir, renderer: &HtmlRenderer) -> Result<()> {
    let _lock = out.lock()?;

    out.write("", &renderer.render_index(index))?;
    out.write_stylesheet(true)?;

    tracing::info!(repos = index.repos.len(), dest = %out.root().display(), "wrote index");
    Ok(())
}
