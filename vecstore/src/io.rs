use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::VecError;
use crate::flat::FlatIndex;

/// Binary format magic and version for the vectors file.
const FLAT_MAGIC: [u8; 4] = [b'A', b'M', b'K', b'V'];
const FLAT_VERSION: u32 = 1;

/// Save serializes the index as two independent artifacts: a compact
/// binary vectors file and a JSON array ordering artifact (one key per
/// vector id, in id order).
///
/// Vectors file layout, all multi-byte values little-endian:
///
/// ```text
/// [4B magic "AMKV"] [4B version=1]
/// [4B dim] [4B count]
/// [count x dim x 4B float32]
/// ```
pub fn save(index: &FlatIndex, vectors_path: &Path, keys_path: &Path) -> Result<(), VecError> {
    let write_err = |e: std::io::Error| VecError::Io(e.to_string());

    if let Some(parent) = vectors_path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let f = File::create(vectors_path).map_err(write_err)?;
    let mut bw = BufWriter::new(f);

    bw.write_all(&FLAT_MAGIC).map_err(write_err)?;
    bw.write_all(&FLAT_VERSION.to_le_bytes()).map_err(write_err)?;
    bw.write_all(&(index.dimension() as u32).to_le_bytes()).map_err(write_err)?;
    bw.write_all(&(index.len() as u32).to_le_bytes()).map_err(write_err)?;
    for &v in index.vectors() {
        bw.write_all(&v.to_le_bytes()).map_err(write_err)?;
    }
    bw.flush().map_err(write_err)?;

    let f = File::create(keys_path).map_err(write_err)?;
    let mut bw = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut bw, index.keys())
        .map_err(|e| VecError::Io(e.to_string()))?;
    bw.flush().map_err(write_err)?;

    Ok(())
}

/// Load the vectors file. The returned index has an empty key list; the
/// caller pairs it with `load_keys` and `FlatIndex::set_keys` (or a
/// catalog rebuild when the artifact is missing or stale).
pub fn load_vectors(path: &Path) -> Result<FlatIndex, VecError> {
    let read_err = |e: std::io::Error| VecError::Io(e.to_string());

    let f = File::open(path).map_err(read_err)?;
    let mut br = BufReader::new(f);

    let mut buf4 = [0u8; 4];
    br.read_exact(&mut buf4).map_err(read_err)?;
    if buf4 != FLAT_MAGIC {
        return Err(VecError::InvalidFormat(format!("invalid magic {buf4:?}")));
    }

    br.read_exact(&mut buf4).map_err(read_err)?;
    let version = u32::from_le_bytes(buf4);
    if version != FLAT_VERSION {
        return Err(VecError::InvalidFormat(format!(
            "unsupported version {version}"
        )));
    }

    br.read_exact(&mut buf4).map_err(read_err)?;
    let dim = u32::from_le_bytes(buf4) as usize;
    if dim == 0 {
        return Err(VecError::InvalidFormat("zero dimension".into()));
    }

    br.read_exact(&mut buf4).map_err(read_err)?;
    let count = u32::from_le_bytes(buf4) as usize;

    let mut data = Vec::with_capacity(count * dim);
    for _ in 0..count * dim {
        br.read_exact(&mut buf4).map_err(read_err)?;
        data.push(f32::from_le_bytes(buf4));
    }

    Ok(FlatIndex::from_raw(dim, data))
}

/// Load the ordering artifact. Returns `Ok(None)` when the file does not
/// exist; a present-but-unparseable file is an error.
pub fn load_keys(path: &Path) -> Result<Option<Vec<String>>, VecError> {
    if !path.exists() {
        return Ok(None);
    }
    let f = File::open(path).map_err(|e| VecError::Io(e.to_string()))?;
    let keys: Vec<String> = serde_json::from_reader(BufReader::new(f))
        .map_err(|e| VecError::InvalidFormat(e.to_string()))?;
    Ok(Some(keys))
}
