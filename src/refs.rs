use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::repo::Repo;

/// write a ref (create or update)
///
/// ref names may be hierarchical, like "release/1.x"
pub fn write_ref(repo: &Repo, ref_name: &str, hash: &Hash) -> Result<()> {
    validate_ref_name(ref_name)?;

    let ref_path = ref_path(repo, ref_name);
    let parent = ref_path.parent().unwrap_or(&ref_path).to_path_buf();
    fs::create_dir_all(&parent).with_path(&parent)?;

    // atomic replace: temp -> fsync -> rename
    let tmp_path = repo.tmp_path().join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        writeln!(tmp_file, "{}", hash.to_hex()).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }
    fs::rename(&tmp_path, &ref_path).with_path(&ref_path)?;

    let dir = File::open(&parent).with_path(&parent)?;
    dir.sync_all().with_path(&parent)?;

    Ok(())
}

/// read a ref
pub fn read_ref(repo: &Repo, ref_name: &str) -> Result<Hash> {
    validate_ref_name(ref_name)?;
    let ref_path = ref_path(repo, ref_name);

    let content = fs::read_to_string(&ref_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::RefNotFound(ref_name.to_string())
        } else {
            Error::Io {
                path: ref_path.clone(),
                source: e,
            }
        }
    })?;

    Hash::from_hex(content.trim())
}

/// resolve a ref or hash string to a hash
///
/// 64 hex chars are taken as a hash, anything else is looked up as a ref.
pub fn resolve_ref(repo: &Repo, ref_or_hash: &str) -> Result<Hash> {
    if ref_or_hash.len() == Hash::HEX_LEN && ref_or_hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Hash::from_hex(ref_or_hash);
    }

    read_ref(repo, ref_or_hash)
}

/// read a ref, treating a missing ref as `None`
pub fn try_read_ref(repo: &Repo, ref_name: &str) -> Result<Option<Hash>> {
    match read_ref(repo, ref_name) {
        Ok(hash) => Ok(Some(hash)),
        Err(Error::RefNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// list all refs, sorted
pub fn list_refs(repo: &Repo) -> Result<Vec<String>> {
    let refs_dir = repo.refs_path();
    let mut refs = Vec::new();

    for entry in WalkDir::new(&refs_dir).min_depth(1) {
        let entry = entry.map_err(|e| Error::Io {
            path: refs_dir.clone(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(&refs_dir) {
            refs.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    refs.sort();
    Ok(refs)
}

/// check if a ref exists
pub fn ref_exists(repo: &Repo, ref_name: &str) -> bool {
    validate_ref_name(ref_name).is_ok() && ref_path(repo, ref_name).is_file()
}

/// get filesystem path for a ref
fn ref_path(repo: &Repo, ref_name: &str) -> PathBuf {
    repo.refs_path().join(ref_name)
}

/// validate ref name
fn validate_ref_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("empty ref name")
    } else if name.starts_with('/') || name.ends_with('/') {
        Some("ref name cannot start or end with '/'")
    } else if name.contains("//") {
        Some("ref name cannot contain '//'")
    } else if name.contains('\0') {
        Some("ref name cannot contain null byte")
    } else if name.split('/').any(|c| c == "." || c == "..") {
        Some("ref name cannot contain '.' or '..'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidRef(format!("{}: {:?}", reason, name))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("repo");
        let repo = Repo::init(&repo_path).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_write_and_read_ref() {
        let (_dir, repo) = test_repo();

        let hash = Hash::from_hex(&"ab".repeat(32)).unwrap();

        write_ref(&repo, "main", &hash).unwrap();
        assert_eq!(read_ref(&repo, "main").unwrap(), hash);
    }

    #[test]
    fn test_hierarchical_ref() {
        let (_dir, repo) = test_repo();

        write_ref(&repo, "release/1.x", &Hash::ZERO).unwrap();
        assert_eq!(read_ref(&repo, "release/1.x").unwrap(), Hash::ZERO);
    }

    #[test]
    fn test_read_nonexistent_ref() {
        let (_dir, repo) = test_repo();

        let result = read_ref(&repo, "nonexistent");
        assert!(matches!(result, Err(Error::RefNotFound(_))));
        assert!(try_read_ref(&repo, "nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_list_refs() {
        let (_dir, repo) = test_repo();

        write_ref(&repo, "a/b/c", &Hash::ZERO).unwrap();
        write_ref(&repo, "x/y", &Hash::ZERO).unwrap();
        write_ref(&repo, "main", &Hash::ZERO).unwrap();

        assert_eq!(list_refs(&repo).unwrap(), vec!["a/b/c", "main", "x/y"]);
    }

    #[test]
    fn test_resolve_ref_hash() {
        let (_dir, repo) = test_repo();

        let hex = "abcdef0123456789abcdef0123456789abcdef0123456789abcdef0123456789";
        assert_eq!(resolve_ref(&repo, hex).unwrap().to_hex(), hex);
    }

    #[test]
    fn test_resolve_ref_name() {
        let (_dir, repo) = test_repo();

        let hash = Hash::from_hex(&"1".repeat(64)).unwrap();
        write_ref(&repo, "main", &hash).unwrap();

        assert_eq!(resolve_ref(&repo, "main").unwrap(), hash);
        assert!(ref_exists(&repo, "main"));
        assert!(!ref_exists(&repo, "other"));
    }

    #[test]
    fn test_invalid_ref_names() {
        for name in ["", "/start", "end/", "double//slash", "with/./dot", "with/../up", "nul\0"] {
            assert!(validate_ref_name(name).is_err(), "accepted {:?}", name);
        }

        for name in ["simple", "with/slash", "deep/nested/path/ref"] {
            assert!(validate_ref_name(name).is_ok(), "rejected {:?}", name);
        }
    }

    #[test]
    fn test_overwrite_ref() {
        let (_dir, repo) = test_repo();

        let hash1 = Hash::from_hex(&"1".repeat(64)).unwrap();
        let hash2 = Hash::from_hex(&"2".repeat(64)).unwrap();

        write_ref(&repo, "main", &hash1).unwrap();
        write_ref(&repo, "main", &hash2).unwrap();

        assert_eq!(read_ref(&repo, "main").unwrap(), hash2);
    }
}
