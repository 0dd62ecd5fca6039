use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{backend} returned {status}: {body}")]
    Api {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedder returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Embedding timed out after {0:?}")]
    Timeout(Duration),

    #[error("Embedder misconfigured: {0}")]
    Config(String),
}

/// Trait for embedding backends (OpenAI, Ollama, feature hashing).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;

    /// Short backend label for logs and the index manifest.
    fn name(&self) -> &str;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.embed_batch(&[text]).await?;
        check_batch(&vectors, 1, self.dimensions())?;
        Ok(vectors.swap_remove(0))
    }
}

/// Verify a backend response: one vector per input, each of `dims` length.
pub fn check_batch(
    vectors: &[Vec<f32>],
    expected_count: usize,
    dims: usize,
) -> Result<(), EmbeddingError> {
    if vectors.len() != expected_count {
        return Err(EmbeddingError::CountMismatch {
            expected: expected_count,
            actual: vectors.len(),
        });
    }
    match vectors.iter().find(|v| v.len() != dims) {
        Some(bad) => Err(EmbeddingError::DimensionMismatch {
            expected: dims,
            actual: bad.len(),
        }),
        None => Ok(()),
    }
}

/// `embed_batch` bounded by `timeout`, with the response checked.
pub async fn embed_with_timeout(
    embedder: &dyn Embedder,
    texts: &[&str],
    timeout: Duration,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let vectors = tokio::time::timeout(timeout, embedder.embed_batch(texts))
        .await
        .map_err(|_| EmbeddingError::Timeout(timeout))??;
    check_batch(&vectors, texts.len(), embedder.dimensions())?;
    Ok(vectors)
}
