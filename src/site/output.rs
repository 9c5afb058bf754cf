use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{IoResultExt, Result};
use crate::repo::FileLock;
use crate::site::path::ancestors;

/// name of the build state file inside the output directory
pub const STATE_FILE: &str = ".tree";

const LOCK_FILE: &str = ".lock";
const STYLESHEET: &str = "style.css";

const STYLE: &str = include_str!("style.css");

/// the directory pages are written to
///
/// the root page is `index.html`, every other path `p` is `p.html`.
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// open the output directory, creating it if needed
    pub fn create(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).with_path(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    /// exclusive lock against concurrent builds into this directory
    pub fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(&self.root.join(LOCK_FILE))
    }

    /// output file for a repository path
    pub fn page_path(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.join("index.html")
        } else {
            self.root.join(format!("{}.html", path))
        }
    }

    /// write a page, creating parent directories
    pub fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let dest = self.page_path(path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }

        let mut file = File::create(&dest).with_path(&dest)?;
        file.write_all(bytes).with_path(&dest)?;
        Ok(())
    }

    /// remove a page and any output directories it leaves empty
    pub fn remove(&self, path: &str) -> Result<()> {
        let dest = self.page_path(path);
        match fs::remove_file(&dest) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_path(&dest),
        }

        // a removed directory's own output directory, then its parents
        let own = std::iter::once(path).filter(|p| !p.is_empty());
        for dir in own.chain(ancestors(path).filter(|p| !p.is_empty())) {
            if !self.remove_dir_if_empty(&self.root.join(dir))? {
                break;
            }
        }
        Ok(())
    }

    /// write the stylesheet if it is missing, or always when forced
    ///
    /// returns whether it was written.
    pub fn write_stylesheet(&self, force: bool) -> Result<bool> {
        let dest = self.root.join(STYLESHEET);
        if !force && dest.exists() {
            return Ok(false);
        }
        fs::write(&dest, STYLE).with_path(&dest)?;
        Ok(true)
    }

    /// true if the directory is gone afterwards
    fn remove_dir_if_empty(&self, dir: &Path) -> Result<bool> {
        match fs::remove_dir(dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e)
                if matches!(
                    e.raw_os_error(),
                    Some(nix::libc::ENOTEMPTY | nix::libc::EEXIST | nix::libc::ENOTDIR)
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(e).with_path(dir),
        }
    }
}
