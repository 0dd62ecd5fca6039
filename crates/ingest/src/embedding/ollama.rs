use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ensure_success;
use super::traits::{Embedder, EmbeddingError};

const NAME: &str = "ollama";

/// Embedder backed by a local Ollama instance (`/api/embed`, batched input).
pub struct OllamaEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    pub fn new(url: String, model: String, dimensions: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!("{}/api/embed", url.trim_end_matches('/')),
            model,
            dimensions,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    /// Long chunks are cut to the model context instead of failing the batch.
    truncate: bool,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            truncate: true,
        };
        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let parsed: EmbedResponse = ensure_success(NAME, response).await?.json().await?;
        tracing::trace!(model = %self.model, count = parsed.embeddings.len(), "Ollama embeddings received");
        Ok(parsed.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_batches_input() {
        let body = serde_json::to_value(EmbedRequest {
            model: "nomic-embed-text",
            input: &["a", "b"],
            truncate: true,
        })
        .unwrap();
        assert_eq!(body, json!({ "model": "nomic-embed-text", "input": ["a", "b"], "truncate": true }));
    }

    #[test]
    fn missing_embeddings_decode_as_empty() {
        let resp: EmbedResponse = serde_json::from_value(json!({ "model": "m" })).unwrap();
        assert!(resp.embeddings.is_empty());
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let e = OllamaEmbedder::new("http://localhost:11434/".into(), "m".into(), 768);
        assert_eq!(e.endpoint, "http://localhost:11434/api/embed");
        assert_eq!(e.dimensions(), 768);
    }
}
