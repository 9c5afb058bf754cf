use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::hash::{compute_blob_hash, Hash};
use crate::object::{compress, decompress, object_path, read_raw, write_atomic};
use crate::repo::Repo;

/// write a blob to the object store
///
/// the hash is computed over the uncompressed content; the stored
/// object is zstd compressed.
pub fn write_blob(repo: &Repo, content: &[u8]) -> Result<Hash> {
    let hash = compute_blob_hash(content);

    let path = blob_path(repo, &hash);
    if path.exists() {
        return Ok(hash);
    }

    write_atomic(repo, &path, &compress(content)?)?;
    Ok(hash)
}

/// read blob content, verifying it against its hash
pub fn read_blob(repo: &Repo, hash: &Hash) -> Result<Vec<u8>> {
    let path = blob_path(repo, hash);
    let compressed = read_raw(&path, hash)?;

    let content = decompress(&compressed, &path).map_err(|_| Error::CorruptObject(*hash))?;
    if compute_blob_hash(&content) != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    Ok(content)
}

fn blob_path(repo: &Repo, hash: &Hash) -> PathBuf {
    object_path(repo.blobs_path(), hash)
}
