pub mod batcher;
pub mod cache;
pub mod hashing;
pub mod ollama;
pub mod openai;
pub mod traits;

use std::sync::Arc;

use airman_core::Config;

pub use batcher::EmbeddingBatcher;
pub use cache::CachedEmbedder;
pub use hashing::HashingEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use traits::{check_batch, embed_with_timeout, Embedder, EmbeddingError};

/// Fail with the response body on any non-2xx status.
pub(crate) async fn ensure_success(
    backend: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, EmbeddingError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(EmbeddingError::Api {
        backend,
        status: status.as_u16(),
        body: response.text().await.unwrap_or_default(),
    })
}

/// Build the embedding backend named by `EMBEDDING_PROVIDER`.
pub fn create_embedder(config: &Config) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    let dims = config.embedding.dimensions;
    if dims == 0 {
        return Err(EmbeddingError::Config("EMBEDDING_DIMENSIONS must be greater than zero".into()));
    }

    let embedder: Arc<dyn Embedder> = match config.embedding.provider.as_str() {
        "hash" => Arc::new(HashingEmbedder::new(dims, config.retrieval.remove_stopwords)),
        "ollama" => Arc::new(OllamaEmbedder::new(
            config.ollama.url.clone(),
            config.ollama.embedding_model.clone(),
            dims,
        )),
        "openai" => {
            let key = config.llm.openai_api_key.clone().ok_or_else(|| {
                EmbeddingError::Config("OPENAI_API_KEY is required for openai embeddings".into())
            })?;
            Arc::new(OpenAiEmbedder::new(
                key,
                config.embedding.openai_model.clone(),
                config.llm.openai_base_url.clone(),
                dims,
            ))
        }
        other => {
            return Err(EmbeddingError::Config(format!(
                "unknown embedding provider '{other}' (expected hash, ollama or openai)"
            )))
        }
    };

    tracing::info!(provider = embedder.name(), dimensions = dims, "Embedder ready");
    Ok(embedder)
}
