use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lru::LruCache;

use super::traits::{check_batch, Embedder, EmbeddingError};

/// Embedder wrapper that memoizes vectors by exact input text.
///
/// Sits in front of the query path, where the same question is often asked
/// repeatedly. Only cache misses reach the inner backend, in one batch.
pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn lookup(&self, text: &str) -> Option<Vec<f32>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(text).cloned()
    }

    fn store(&self, text: &str, vector: Vec<f32>) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.put(text.to_string(), vector);
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out: Vec<Option<Vec<f32>>> = texts.iter().map(|t| self.lookup(t)).collect();
        let missing: Vec<usize> = (0..texts.len()).filter(|&i| out[i].is_none()).collect();

        self.hits
            .fetch_add((texts.len() - missing.len()) as u64, Ordering::Relaxed);
        self.misses.fetch_add(missing.len() as u64, Ordering::Relaxed);

        if !missing.is_empty() {
            let miss_texts: Vec<&str> = missing.iter().map(|&i| texts[i]).collect();
            let vectors = self.inner.embed_batch(&miss_texts).await?;
            check_batch(&vectors, miss_texts.len(), self.inner.dimensions())?;
            for (i, vector) in missing.into_iter().zip(vectors) {
                self.store(texts[i], vector.clone());
                out[i] = Some(vector);
            }
        }

        Ok(out.into_iter().flatten().collect())
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingEmbedder {
        calls: AtomicUsize,
        texts_seen: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.texts_seen.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting() -> Arc<CountingEmbedder> {
        Arc::new(CountingEmbedder {
            calls: AtomicUsize::new(0),
            texts_seen: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn repeated_query_hits_cache() {
        let inner = counting();
        let cached = CachedEmbedder::new(inner.clone(), 16);

        let first = cached.embed_one("What is Vne?").await.unwrap();
        let second = cached.embed_one("What is Vne?").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.hits(), 1);
        assert_eq!(cached.misses(), 1);
    }

    #[tokio::test]
    async fn only_misses_reach_backend_in_order() {
        let inner = counting();
        let cached = CachedEmbedder::new(inner.clone(), 16);
        cached.embed_one("bb").await.unwrap();

        let out = cached.embed_batch(&["a", "bb", "cccc"]).await.unwrap();
        assert_eq!(out, vec![vec![1.0, 1.0], vec![2.0, 1.0], vec![4.0, 1.0]]);
        assert_eq!(inner.texts_seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let inner = counting();
        let cached = CachedEmbedder::new(inner.clone(), 2);
        cached.embed_one("a").await.unwrap();
        cached.embed_one("b").await.unwrap();
        cached.embed_one("c").await.unwrap();
        cached.embed_one("a").await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 4);
    }
}
