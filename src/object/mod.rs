mod blob;
mod record;

pub use blob::{read_blob, write_blob};
pub use record::{read_commit, read_tree, write_commit, write_tree};

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::{compute_compressed_hash, Hash};
use crate::repo::Repo;

/// zstd level for all objects (fast, reasonable ratio)
const ZSTD_LEVEL: i32 = 3;

/// store `bytes` at `dest` unless it already exists
///
/// atomic write: temp -> fsync -> rename -> fsync parent
pub(crate) fn write_atomic(repo: &Repo, dest: &Path, bytes: &[u8]) -> Result<()> {
    // dedup: content-addressed, same name means same bytes
    if dest.exists() {
        return Ok(());
    }

    let dir = dest.parent().unwrap_or(dest);
    fs::create_dir_all(dir).with_path(dir)?;

    let tmp_path = repo.tmp_path().join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(bytes).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }

    fs::rename(&tmp_path, dest).with_path(dest)?;

    let dir_file = File::open(dir).with_path(dir)?;
    dir_file.sync_all().with_path(dir)?;

    Ok(())
}

/// read raw object bytes, mapping a missing file to `ObjectNotFound`
pub(crate) fn read_raw(path: &Path, hash: &Hash) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ObjectNotFound(*hash)
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

pub(crate) fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    zstd::encode_all(bytes, ZSTD_LEVEL).with_path("<zstd>")
}

pub(crate) fn decompress(bytes: &[u8], path: &Path) -> Result<Vec<u8>> {
    zstd::decode_all(bytes).with_path(path)
}

/// serialize as CBOR, compress, and store under the hash of the compressed bytes
pub(crate) fn write_cbor_object<T: Serialize>(
    repo: &Repo,
    value: &T,
    path_for: impl Fn(&Repo, &Hash) -> PathBuf,
) -> Result<Hash> {
    let mut cbor_bytes = Vec::new();
    ciborium::into_writer(value, &mut cbor_bytes)?;

    let compressed = compress(&cbor_bytes)?;
    let hash = compute_compressed_hash(&compressed);

    write_atomic(repo, &path_for(repo, &hash), &compressed)?;
    Ok(hash)
}

/// load, verify and decode an object written by `write_cbor_object`
pub(crate) fn read_cbor_object<T: DeserializeOwned>(path: &Path, hash: &Hash) -> Result<T> {
    let compressed = read_raw(path, hash)?;

    if compute_compressed_hash(&compressed) != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    let cbor_bytes = decompress(&compressed, path)?;
    Ok(ciborium::from_reader(&cbor_bytes[..])?)
}

/// `<base>/XX/<rest>` for a hash
pub(crate) fn object_path(base: PathBuf, hash: &Hash) -> PathBuf {
    let (dir, file) = hash.to_path_components();
    base.join(dir).join(file)
}
