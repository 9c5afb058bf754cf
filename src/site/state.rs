use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;

/// the root tree of the last completed build
///
/// stored as a single line of hex in the output directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildState {
    tree: Hash,
}

impl BuildState {
    pub fn new(tree: Hash) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &Hash {
        &self.tree
    }

    /// read the state file
    ///
    /// `Ok(None)` if there is no file. a file that cannot be read or does not
    /// hold exactly one tree id is `InvalidBuildState`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(invalid(path, e.to_string())),
        };

        let token = std::str::from_utf8(&content)
            .map_err(|_| invalid(path, "not utf-8".to_string()))?;
        let token = token.strip_suffix('\n').unwrap_or(token);

        if token.len() != Hash::HEX_LEN {
            return Err(invalid(
                path,
                format!("expected {} hex characters, found {}", Hash::HEX_LEN, token.len()),
            ));
        }

        let tree = Hash::from_hex(token).map_err(|e| invalid(path, e.to_string()))?;
        Ok(Some(Self { tree }))
    }

    /// replace the state file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp_path = dir.join(format!(".tree.{}", uuid::Uuid::new_v4()));

        {
            let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
            writeln!(tmp_file, "{}", self.tree.to_hex()).with_path(&tmp_path)?;
            tmp_file.sync_all().with_path(&tmp_path)?;
        }

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }

        let dir_file = File::open(dir).with_path(dir)?;
        dir_file.sync_all().with_path(dir)?;

        Ok(())
    }
}

fn invalid(path: &Path, message: String) -> Error {
    Error::InvalidBuildState {
        path: path.to_path_buf(),
        message,
    }
}
