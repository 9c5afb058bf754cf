//! zub-pages - incremental static pages for a content-addressed tree store
//!
//! directories are committed into a small git-like store, and the tree at the
//! tip of a ref is published as plain HTML. a build remembers which tree it
//! produced, so the next build only regenerates the pages that changed.
//!
//! # Core concepts
//!
//! - **Blob**: content-addressed file data (compressed with zstd)
//! - **Tree**: a serialized directory structure (CBOR + zstd)
//! - **Commit**: a snapshot of a tree with metadata (CBOR + zstd)
//! - **Ref**: a named pointer to a commit (hierarchical, like git branches)
//! - **Page**: one output file per path in the tip tree, `index.html` for the root
//!
//! # Example usage
//!
//! ```no_run
//! use zubpages::site::{build_site, BuildOptions, HtmlRenderer, OutputDir, RepoStore, SiteInfo};
//! use zubpages::{ops, Repo};
//! use std::path::Path;
//!
//! let repo = Repo::init(Path::new("/path/to/repo")).unwrap();
//! ops::commit(&repo, Path::new("/source"), "main", Some("initial"), None).unwrap();
//!
//! let store = RepoStore::new(&repo, "main");
//! let out = OutputDir::create(Path::new("/srv/www")).unwrap();
//! let site = SiteInfo::from_config(&repo.config().site, repo.path());
//! let report = build_site(&store, &out, &HtmlRenderer::new(), &site, &BuildOptions::default()).unwrap();
//! println!("{} build, {} pages", report.mode, report.generated);
//! ```

mod config;
mod error;
mod hash;
mod object;
mod refs;
mod repo;

pub mod ops;
pub mod site;
pub mod types;

pub use config::{Config, SiteConfig, DEFAULT_MAX_COMMITS, DEFAULT_TIP};
pub use error::{Error, Result};
pub use hash::{compute_blob_hash, Hash};
pub use object::{read_blob, read_commit, read_tree, write_blob, write_commit, write_tree};
pub use refs::{list_refs, read_ref, ref_exists, resolve_ref, try_read_ref, write_ref};
pub use repo::{FileLock, Repo};
pub use types::{
    ChangeKind, Commit, DiffEntry, EntryKind, EntryRef, FileKind, Tree, TreeEntry,
};
