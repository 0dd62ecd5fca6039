use std::sync::Arc;

use airman_core::config::RetrievalConfig;
use airman_core::{AirmanError, AirmanResult, DocumentBatch, RetrievalResult, ScoredChunk};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::hybrid::{fuse, FusionWeights};
use crate::lexical::{Bm25Params, LexicalIndex};
use crate::persist::{DocumentEntry, IndexManifest};
use crate::store::ChunkStore;
use crate::vector::VectorIndex;

/// A complete, immutable index generation. Queries only ever see one
/// snapshot, so chunk store, lexical index and vector index always agree.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    pub(crate) store: ChunkStore,
    pub(crate) lexical: LexicalIndex,
    pub(crate) vector: VectorIndex,
    pub(crate) manifest: IndexManifest,
}

impl IndexSnapshot {
    pub fn empty(dims: usize, params: Bm25Params) -> Self {
        Self {
            store: ChunkStore::new(),
            lexical: LexicalIndex::new(params),
            vector: VectorIndex::new(dims),
            manifest: IndexManifest::new(dims, ""),
        }
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn dims(&self) -> usize {
        self.vector.dims()
    }

    pub fn chunk_count(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Hybrid top-k retrieval for one query.
    ///
    /// Each index contributes `cfg.candidate_width(top_k)` candidates; the
    /// fused list is ordered by descending score, ties by ascending id.
    pub fn retrieve(
        &self,
        query: &str,
        query_vector: &[f32],
        top_k: usize,
        cfg: &RetrievalConfig,
    ) -> AirmanResult<RetrievalResult> {
        if top_k == 0 {
            return Err(AirmanError::InvalidQuery("top_k must be positive".into()));
        }
        if self.is_empty() {
            return Err(AirmanError::IndexNotBuilt);
        }

        let width = cfg.candidate_width(top_k);
        let vector_hits = self.vector.search(query_vector, width)?;
        let lexical_hits = self.lexical.search(query, width);
        debug!(
            vector_candidates = vector_hits.len(),
            lexical_candidates = lexical_hits.len(),
            width,
            "Candidates gathered"
        );

        fuse(&vector_hits, &lexical_hits, FusionWeights::from(cfg), top_k)
            .into_iter()
            .map(|hit| {
                Ok(ScoredChunk {
                    chunk: self.store.get(hit.id)?.clone(),
                    fused_score: hit.fused,
                    vector: hit.vector,
                    lexical: hit.lexical,
                })
            })
            .collect()
    }
}

/// Accumulates documents into a fresh snapshot.
pub struct IndexBuilder {
    snapshot: IndexSnapshot,
}

impl IndexBuilder {
    pub fn new(dims: usize, params: Bm25Params, embedder: &str) -> Self {
        let mut snapshot = IndexSnapshot::empty(dims, params);
        snapshot.manifest = IndexManifest::new(dims, embedder);
        Self { snapshot }
    }

    /// Add one document's chunks to all indexes, or nothing at all.
    ///
    /// Everything is validated before the first chunk is stored, so a bad
    /// batch leaves the builder as it was.
    pub fn add_document(&mut self, batch: &DocumentBatch) -> AirmanResult<usize> {
        if batch.embeddings.len() != batch.chunks.len() {
            return Err(AirmanError::ingestion(
                &batch.source_id,
                format!(
                    "{} embeddings for {} chunks",
                    batch.embeddings.len(),
                    batch.chunks.len()
                ),
            ));
        }
        for embedding in &batch.embeddings {
            self.snapshot.vector.check_dims(embedding.len())?;
        }

        let snap = &mut self.snapshot;
        let added = snap.store.commit(batch);
        for (chunk, embedding) in added.iter().zip(&batch.embeddings) {
            snap.lexical.insert(chunk);
            snap.vector.insert(chunk.id, embedding)?;
        }

        snap.manifest.documents.push(DocumentEntry {
            source_id: batch.source_id.clone(),
            fingerprint: batch.fingerprint.clone(),
            page_count: batch.page_count,
            chunk_count: batch.chunk_count(),
        });
        Ok(batch.chunk_count())
    }

    pub fn chunk_count(&self) -> usize {
        self.snapshot.chunk_count()
    }

    pub fn finish(mut self) -> IndexSnapshot {
        self.snapshot.manifest.chunk_count = self.snapshot.store.len();
        self.snapshot.manifest.built_at = Utc::now();
        self.snapshot
    }
}

/// The live snapshot behind a lock. Readers clone the `Arc` and release the
/// lock immediately; a rebuild replaces the whole snapshot in one write.
#[derive(Debug)]
pub struct SharedIndex {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl SharedIndex {
    pub fn new(snapshot: IndexSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub async fn current(&self) -> Arc<IndexSnapshot> {
        self.current.read().await.clone()
    }

    /// Install `snapshot`, returning the one it replaced.
    pub async fn swap(&self, snapshot: IndexSnapshot) -> Arc<IndexSnapshot> {
        let mut guard = self.current.write().await;
        std::mem::replace(&mut *guard, Arc::new(snapshot))
    }
}
