//! Turns source files into [`DocumentBatch`]es ready for the index.
//!
//! Extraction and chunking are CPU-bound and run across documents on the
//! rayon pool. Embedding is async and runs per document, so one slow or
//! failing document never holds another's chunks hostage.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use airman_core::config::ChunkingConfig;
use airman_core::{AirmanError, AirmanResult, Config, DocumentBatch, PageChunk};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::document::chunker::chunk_document;
use crate::document::{extract, DocumentKind};
use crate::embedding::{Embedder, EmbeddingBatcher, EmbeddingError};

/// A document that has been extracted and chunked but not yet embedded.
#[derive(Debug, Clone)]
pub struct ChunkedDocument {
    pub source_id: String,
    pub fingerprint: String,
    pub page_count: usize,
    pub chunks: Vec<PageChunk>,
}

/// Supported files directly inside `dir`, sorted by file name.
pub fn discover_documents(dir: &Path) -> AirmanResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AirmanError::InvalidConfig(format!(
            "data directory {} does not exist",
            dir.display()
        )));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| DocumentKind::of(&source_id_of(path)).is_some())
        .collect();
    paths.sort_by_key(|p| source_id_of(p));
    Ok(paths)
}

/// File name used as the citation source.
pub fn source_id_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub struct DocumentPreparer {
    chunking: ChunkingConfig,
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
    timeout: Duration,
}

impl DocumentPreparer {
    pub fn new(config: &Config, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            chunking: config.chunking.clone(),
            embedder,
            batch_size: config.embedding.batch_size,
            timeout: config.embedding.timeout(),
        }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Extract and chunk in-memory document bytes.
    pub fn chunk_bytes(&self, bytes: &[u8], source_id: &str) -> AirmanResult<ChunkedDocument> {
        let doc = extract(bytes, source_id).map_err(|e| AirmanError::ingestion(source_id, e))?;
        let chunks = chunk_document(&doc, &self.chunking);
        if chunks.is_empty() {
            return Err(AirmanError::ingestion(source_id, "document produced no chunks"));
        }

        let page_count = doc.pages.iter().map(|p| p.page_number as usize).max().unwrap_or(0);
        debug!(
            document = source_id,
            pages = page_count,
            kind = doc.kind.as_str(),
            chars = doc.char_count(),
            chunks = chunks.len(),
            "Document chunked"
        );

        Ok(ChunkedDocument {
            source_id: source_id.to_string(),
            fingerprint: fingerprint(bytes),
            page_count,
            chunks,
        })
    }

    pub fn chunk_file(&self, path: &Path) -> AirmanResult<ChunkedDocument> {
        let source_id = source_id_of(path);
        let bytes = std::fs::read(path).map_err(|e| AirmanError::ingestion(&source_id, e))?;
        self.chunk_bytes(&bytes, &source_id)
    }

    /// Extract and chunk every file in parallel. Results keep input order.
    pub fn chunk_all(&self, paths: &[PathBuf]) -> Vec<AirmanResult<ChunkedDocument>> {
        paths.par_iter().map(|path| self.chunk_file(path)).collect()
    }

    /// Embed every chunk of a document.
    ///
    /// A backend returning vectors of the wrong size is a configuration fault
    /// and surfaces as [`AirmanError::DimensionMismatch`]; any other embedding
    /// failure only fails this document.
    pub async fn embed(&self, doc: ChunkedDocument) -> AirmanResult<DocumentBatch> {
        let batcher = EmbeddingBatcher::new(self.embedder.as_ref(), self.batch_size, self.timeout);
        let items = doc.chunks.iter().enumerate().map(|(i, c)| (i, c.text.clone()));

        let embedded = batcher.embed_all(items).await.map_err(|e| match e {
            EmbeddingError::DimensionMismatch { expected, actual } => {
                AirmanError::DimensionMismatch { expected, actual }
            }
            other => AirmanError::ingestion(&doc.source_id, other),
        })?;
        let embeddings: Vec<Vec<f32>> = embedded.into_iter().map(|(_, v)| v).collect();

        info!(
            document = %doc.source_id,
            chunks = doc.chunks.len(),
            "Document embedded"
        );

        Ok(DocumentBatch {
            source_id: doc.source_id,
            fingerprint: doc.fingerprint,
            page_count: doc.page_count,
            chunks: doc.chunks,
            embeddings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use async_trait::async_trait;

    fn preparer(chunk_size: usize, overlap: usize) -> DocumentPreparer {
        let mut config = Config::default();
        config.chunking = ChunkingConfig { chunk_size, overlap };
        config.embedding.dimensions = 64;
        DocumentPreparer::new(&config, Arc::new(HashingEmbedder::new(64, true)))
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed_batch(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Api {
                backend: "failing",
                status: 503,
                body: "model loading".into(),
            })
        }

        fn dimensions(&self) -> usize {
            64
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn discovers_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.md", "image.png", "c.pdf"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("d.txt"), "x").unwrap();

        let names: Vec<String> = discover_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| source_id_of(p))
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt", "c.pdf"]);
    }

    #[test]
    fn missing_data_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            discover_documents(&missing),
            Err(AirmanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn text_file_becomes_batch_with_one_vector_per_chunk() {
        let p = preparer(40, 10);
        let text = "Indicated airspeed is read from the airspeed indicator. True airspeed corrects for altitude.";
        let chunked = p.chunk_bytes(text.as_bytes(), "glossary.txt").unwrap();
        assert_eq!(chunked.page_count, 1);
        assert!(chunked.chunks.len() > 1);

        let batch = p.embed(chunked).await.unwrap();
        assert_eq!(batch.source_id, "glossary.txt");
        assert_eq!(batch.embeddings.len(), batch.chunks.len());
        assert!(batch.embeddings.iter().all(|v| v.len() == 64));
    }

    #[test]
    fn unreadable_document_is_ingestion_error() {
        let p = preparer(500, 50);
        let err = p.chunk_bytes(b"%PDF-1.4 truncated", "broken.pdf").unwrap_err();
        assert!(matches!(err, AirmanError::Ingestion { document, .. } if document == "broken.pdf"));
    }

    #[tokio::test]
    async fn embedding_failure_names_the_document() {
        let mut config = Config::default();
        config.embedding.dimensions = 64;
        let p = DocumentPreparer::new(&config, Arc::new(FailingEmbedder));
        let chunked = p.chunk_bytes(b"Carburetor icing can occur at 20C.", "ice.txt").unwrap();
        let err = p.embed(chunked).await.unwrap_err();
        assert!(matches!(err, AirmanError::Ingestion { document, .. } if document == "ice.txt"));
    }

    #[test]
    fn chunk_all_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        let c = dir.path().join("c.txt");
        std::fs::write(&a, "Alpha page.").unwrap();
        std::fs::write(&b, "   ").unwrap();
        std::fs::write(&c, "Charlie page.").unwrap();

        let results = preparer(500, 50).chunk_all(&[a, b, c]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().source_id, "a.txt");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().source_id, "c.txt");
    }
}
