use std::fs::{self, File};
use std::path::{Path, PathBuf};

use nix::fcntl::{Flock, FlockArg};

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};

const CONFIG_FILE: &str = "config.toml";
const BLOBS_DIR: &str = "objects/blobs";
const TREES_DIR: &str = "objects/trees";
const COMMITS_DIR: &str = "objects/commits";
const REFS_DIR: &str = "refs/heads";
const TMP_DIR: &str = "tmp";

/// a store holding the trees pages are built from
pub struct Repo {
    path: PathBuf,
    config: Config,
}

impl Repo {
    /// create the store layout and a default config at `path`
    pub fn init(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(Error::RepoExists(path.to_path_buf()));
        }

        for dir in [BLOBS_DIR, TREES_DIR, COMMITS_DIR, REFS_DIR, TMP_DIR] {
            let dir = path.join(dir);
            fs::create_dir_all(&dir).with_path(&dir)?;
        }

        let config = Config::default();
        config.save(&config_path)?;

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// open an existing store, reading its config
    pub fn open(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(Error::NoRepo(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            config: Config::load(&config_path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn blobs_path(&self) -> PathBuf {
        self.path.join(BLOBS_DIR)
    }

    pub fn trees_path(&self) -> PathBuf {
        self.path.join(TREES_DIR)
    }

    pub fn commits_path(&self) -> PathBuf {
        self.path.join(COMMITS_DIR)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join(REFS_DIR)
    }

    /// staging area for atomic writes
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join(TMP_DIR)
    }

    /// serializes ref updates; released when the guard drops
    pub fn lock(&self) -> Result<FileLock> {
        FileLock::acquire(&self.path.join(".lock"))
    }
}

/// guard holding an exclusive flock until dropped
pub struct FileLock {
    _flock: Flock<File>,
}

impl FileLock {
    /// take an exclusive, non-blocking lock on `path`, creating it if needed
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = File::create(path).with_path(path)?;

        let flock = Flock::lock(file, FlockArg::LockExclusiveNonblock)
            .map_err(|_| Error::LockContention(path.to_path_buf()))?;

        Ok(Self { _flock: flock })
    }
}
