//! On-disk snapshot layout:
//!
//! ```text
//! <index_dir>/manifest.json   human-readable summary, written last
//! <index_dir>/chunks.bin      zstd(MessagePack(Vec<Chunk>))
//! <index_dir>/vectors.bin     zstd(MessagePack(VectorFile))
//! ```
//!
//! The lexical index is rebuilt from the chunks on load. A save writes into a
//! sibling staging directory and renames it into place, so a crash mid-save
//! leaves the previous snapshot readable.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use airman_core::{AirmanError, AirmanResult, Chunk, ChunkId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::lexical::{Bm25Params, LexicalIndex};
use crate::snapshot::IndexSnapshot;
use crate::store::ChunkStore;
use crate::vector::VectorIndex;

pub const FORMAT_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";
const CHUNKS_FILE: &str = "chunks.bin";
const VECTORS_FILE: &str = "vectors.bin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub source_id: String,
    /// Hex SHA-256 of the source bytes.
    pub fingerprint: String,
    pub page_count: usize,
    pub chunk_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    pub version: u32,
    pub built_at: DateTime<Utc>,
    pub embedder: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub documents: Vec<DocumentEntry>,
}

impl IndexManifest {
    pub fn new(dimensions: usize, embedder: &str) -> Self {
        Self {
            version: FORMAT_VERSION,
            built_at: Utc::now(),
            embedder: embedder.to_string(),
            dimensions,
            chunk_count: 0,
            documents: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct VectorFile {
    dims: usize,
    ids: Vec<ChunkId>,
    data: Vec<f32>,
}

fn ser_err(e: impl ToString) -> AirmanError {
    AirmanError::Serialize(e.to_string())
}

fn write_packed<T: Serialize>(path: &Path, value: &T) -> AirmanResult<u64> {
    let encoded = rmp_serde::to_vec(value).map_err(ser_err)?;
    let file = fs::File::create(path)?;
    let mut encoder = zstd::Encoder::new(BufWriter::new(file), 3)?;
    encoder.write_all(&encoded)?;
    let mut inner = encoder.finish()?;
    inner.flush()?;
    Ok(encoded.len() as u64)
}

fn read_packed<T: DeserializeOwned>(path: &Path) -> AirmanResult<T> {
    let compressed = fs::read(path)?;
    let raw = zstd::decode_all(compressed.as_slice())?;
    rmp_serde::from_slice(&raw).map_err(ser_err)
}

fn staging_dir(dir: &Path, suffix: &str) -> PathBuf {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    dir.with_file_name(format!(".{name}.{suffix}"))
}

/// Write `snapshot` to `dir`, replacing whatever was there.
pub fn save_snapshot(snapshot: &IndexSnapshot, dir: &Path) -> AirmanResult<()> {
    if let Some(parent) = dir.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let staging = staging_dir(dir, "staging");
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    let chunk_bytes = write_packed(&staging.join(CHUNKS_FILE), &snapshot.store.chunks())?;
    let vectors = VectorFile {
        dims: snapshot.vector.dims(),
        ids: snapshot.vector.ids().to_vec(),
        data: snapshot.vector.data().to_vec(),
    };
    let vector_bytes = write_packed(&staging.join(VECTORS_FILE), &vectors)?;
    let manifest = serde_json::to_string_pretty(&snapshot.manifest).map_err(ser_err)?;
    fs::write(staging.join(MANIFEST_FILE), manifest)?;

    let retired = staging_dir(dir, "retired");
    if retired.exists() {
        fs::remove_dir_all(&retired)?;
    }
    if dir.exists() {
        fs::rename(dir, &retired)?;
    }
    fs::rename(&staging, dir)?;
    if retired.exists() {
        fs::remove_dir_all(&retired)?;
    }

    info!(
        dir = %dir.display(),
        chunks = snapshot.chunk_count(),
        documents = snapshot.manifest.documents.len(),
        raw_bytes = chunk_bytes + vector_bytes,
        "Index snapshot saved"
    );
    Ok(())
}

/// Load the snapshot in `dir`. `Ok(None)` when nothing has been saved yet.
///
/// A snapshot built with a different embedding size than `expected_dims`
/// is rejected with [`AirmanError::DimensionMismatch`].
pub fn load_snapshot(
    dir: &Path,
    expected_dims: usize,
    params: Bm25Params,
) -> AirmanResult<Option<IndexSnapshot>> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Ok(None);
    }

    let manifest: IndexManifest =
        serde_json::from_str(&fs::read_to_string(&manifest_path)?).map_err(ser_err)?;
    if manifest.version != FORMAT_VERSION {
        return Err(AirmanError::Serialize(format!(
            "index format version {} is not supported (expected {FORMAT_VERSION})",
            manifest.version
        )));
    }
    if manifest.dimensions != expected_dims {
        return Err(AirmanError::DimensionMismatch {
            expected: expected_dims,
            actual: manifest.dimensions,
        });
    }

    let chunks: Vec<Chunk> = read_packed(&dir.join(CHUNKS_FILE))?;
    let vectors: VectorFile = read_packed(&dir.join(VECTORS_FILE))?;
    if vectors.dims != manifest.dimensions || vectors.ids.len() != chunks.len() {
        return Err(AirmanError::Serialize(format!(
            "vector file holds {} x {} but manifest lists {} chunks of {} dims",
            vectors.ids.len(),
            vectors.dims,
            chunks.len(),
            manifest.dimensions
        )));
    }

    let store = ChunkStore::from_chunks(chunks)?;
    let lexical = LexicalIndex::build(params, store.chunks());
    let vector = VectorIndex::from_parts(vectors.dims, vectors.ids, vectors.data)?;

    info!(
        dir = %dir.display(),
        chunks = store.len(),
        documents = manifest.documents.len(),
        built_at = %manifest.built_at,
        "Index snapshot loaded"
    );

    Ok(Some(IndexSnapshot {
        store,
        lexical,
        vector,
        manifest,
    }))
}
