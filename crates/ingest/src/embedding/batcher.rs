use std::time::Duration;

use super::traits::{embed_with_timeout, Embedder, EmbeddingError};

/// Embeds keyed texts in batches of at most `batch_size`.
///
/// Every backend call is bounded by `timeout` and its response is checked
/// for count and dimension before keys are paired back up. The first failing
/// batch fails the whole call.
pub struct EmbeddingBatcher<'a> {
    embedder: &'a dyn Embedder,
    batch_size: usize,
    timeout: Duration,
}

impl<'a> EmbeddingBatcher<'a> {
    pub fn new(embedder: &'a dyn Embedder, batch_size: usize, timeout: Duration) -> Self {
        Self {
            embedder,
            batch_size: batch_size.max(1),
            timeout,
        }
    }

    /// Backend calls needed for `items` texts.
    pub fn batch_count(&self, items: usize) -> usize {
        items.div_ceil(self.batch_size)
    }

    /// Embed every text, preserving input order.
    pub async fn embed_all<K, I>(&self, items: I) -> Result<Vec<(K, Vec<f32>)>, EmbeddingError>
    where
        I: IntoIterator<Item = (K, String)>,
    {
        let items: Vec<(K, String)> = items.into_iter().collect();
        let batches = self.batch_count(items.len());
        let mut vectors = Vec::with_capacity(items.len());

        for (n, batch) in items.chunks(self.batch_size).enumerate() {
            let texts: Vec<&str> = batch.iter().map(|(_, text)| text.as_str()).collect();
            tracing::trace!(
                backend = self.embedder.name(),
                batch = n + 1,
                batches,
                size = texts.len(),
                "Embedding batch"
            );
            vectors.extend(embed_with_timeout(self.embedder, &texts, self.timeout).await?);
        }

        Ok(items
            .into_iter()
            .map(|(key, _)| key)
            .zip(vectors)
            .collect())
    }
}
