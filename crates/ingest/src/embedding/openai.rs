use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ensure_success;
use super::traits::{Embedder, EmbeddingError};

const NAME: &str = "openai";

/// OpenAI-compatible `/v1/embeddings` backend.
pub struct OpenAiEmbedder {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, model: String, base_url: Option<String>, dimensions: usize) -> Self {
        let base = base_url.unwrap_or_else(|| "https://api.openai.com".to_string());
        Self {
            client: Client::new(),
            api_key,
            model,
            endpoint: format!("{}/v1/embeddings", base.trim_end_matches('/')),
            dimensions,
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    /// text-embedding-3 models truncate to this size server-side.
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
}

#[derive(Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
    index: usize,
}

/// Vectors in input order. The API may return items out of order; a
/// duplicated or missing index is left for `check_batch` to reject.
fn in_input_order(mut data: Vec<EmbedItem>) -> Vec<Vec<f32>> {
    data.sort_by_key(|item| item.index);
    data.dedup_by_key(|item| item.index);
    data.into_iter().map(|item| item.embedding).collect()
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            dimensions: self.dimensions,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let resp: EmbedResponse = ensure_success(NAME, response).await?.json().await?;
        Ok(in_input_order(resp.data))
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
    fn reorders_by_index() {
        let resp: EmbedResponse = serde_json::from_value(json!({
            "data": [
                { "index": 1, "embedding": [0.0, 1.0] },
                { "index": 0, "embedding": [1.0, 0.0] }
            ]
        }))
        .unwrap();
        assert_eq!(in_input_order(resp.data), vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn duplicate_index_shortens_batch() {
        let data = vec![
            EmbedItem { embedding: vec![1.0], index: 0 },
            EmbedItem { embedding: vec![2.0], index: 0 },
        ];
        assert_eq!(in_input_order(data).len(), 1);
    }

    #[test]
    fn request_asks_for_configured_dimensions() {
        let body = serde_json::to_value(EmbedRequest {
            model: "text-embedding-3-small",
            input: &["q"],
            dimensions: 384,
        })
        .unwrap();
        assert_eq!(body["dimensions"], 384);

        let e = OpenAiEmbedder::new("k".into(), "m".into(), None, 384);
        assert_eq!(e.endpoint, "https://api.openai.com/v1/embeddings");
    }
}
