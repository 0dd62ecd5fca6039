use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use airman_core::{AirmanError, AirmanResult, Config};
use airman_index::{load_snapshot, save_snapshot, Bm25Params, IndexBuilder, IndexSnapshot, SharedIndex};
use airman_ingest::embedding::Embedder;
use airman_ingest::{discover_documents, DocumentPreparer};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestFailure {
    pub document: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub documents_found: usize,
    pub documents_indexed: usize,
    pub chunks_indexed: usize,
    pub failures: Vec<IngestFailure>,
    pub elapsed_ms: u64,
}

/// Load the persisted snapshot, or an empty one if nothing was saved yet.
pub fn open_index(config: &Config) -> AirmanResult<IndexSnapshot> {
    let params = Bm25Params::from(&config.retrieval);
    let dims = config.embedding.dimensions;
    Ok(load_snapshot(&config.storage.index_dir, dims, params)?
        .unwrap_or_else(|| IndexSnapshot::empty(dims, params)))
}

/// Full re-ingestion of a source directory into a fresh snapshot.
///
/// Documents that fail extraction or embedding are skipped and reported.
/// The new snapshot is persisted before it replaces the live one. Only one
/// run may be in flight; a second caller gets
/// [`AirmanError::IngestionInProgress`] instead of waiting.
pub struct Ingestor {
    preparer: Arc<DocumentPreparer>,
    index: Arc<SharedIndex>,
    data_dir: PathBuf,
    index_dir: PathBuf,
    dims: usize,
    params: Bm25Params,
    running: Mutex<()>,
}

impl Ingestor {
    pub fn new(config: &Config, embedder: Arc<dyn Embedder>, index: Arc<SharedIndex>) -> Self {
        Self {
            preparer: Arc::new(DocumentPreparer::new(config, embedder)),
            index,
            data_dir: config.storage.data_dir.clone(),
            index_dir: config.storage.index_dir.clone(),
            dims: config.embedding.dimensions,
            params: Bm25Params::from(&config.retrieval),
            running: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Re-ingest the configured data directory.
    pub async fn ingest(&self) -> AirmanResult<IngestReport> {
        self.ingest_directory(&self.data_dir).await
    }

    pub async fn ingest_directory(&self, dir: &Path) -> AirmanResult<IngestReport> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| AirmanError::IngestionInProgress)?;
        let started = Instant::now();

        let paths = discover_documents(dir)?;
        info!(dir = %dir.display(), documents = paths.len(), "Ingestion started");

        let preparer = self.preparer.clone();
        let chunk_paths = paths.clone();
        let chunked = tokio::task::spawn_blocking(move || preparer.chunk_all(&chunk_paths))
            .await
            .map_err(|e| AirmanError::Other(format!("chunking task failed: {e}")))?;

        let mut builder = IndexBuilder::new(self.dims, self.params, self.preparer.embedder().name());
        let mut failures = Vec::new();
        let mut indexed = 0;

        for result in chunked {
            let outcome = match result {
                Ok(doc) => match self.preparer.embed(doc).await {
                    Ok(batch) => builder.add_document(&batch).map(|chunks| (batch.source_id, chunks)),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };
            match outcome {
                Ok((document, chunks)) => {
                    indexed += 1;
                    info!(document = %document, chunks, "Document committed");
                }
                Err(AirmanError::Ingestion { document, reason }) => {
                    warn!(document = %document, reason = %reason, "Document skipped");
                    failures.push(IngestFailure { document, reason });
                }
                // Wrong vector size means every document would fail the same way.
                Err(e) => return Err(e),
            }
        }

        let snapshot = builder.finish();
        let chunks_indexed = snapshot.chunk_count();
        let index_dir = self.index_dir.clone();
        let snapshot = tokio::task::spawn_blocking(move || {
            save_snapshot(&snapshot, &index_dir).map(|_| snapshot)
        })
        .await
        .map_err(|e| AirmanError::Other(format!("persist task failed: {e}")))??;
        self.index.swap(snapshot).await;

        let report = IngestReport {
            documents_found: paths.len(),
            documents_indexed: indexed,
            chunks_indexed,
            failures,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            documents = report.documents_indexed,
            skipped = report.failures.len(),
            chunks = report.chunks_indexed,
            elapsed_ms = report.elapsed_ms,
            "Ingestion finished"
        );
        Ok(report)
    }
}
