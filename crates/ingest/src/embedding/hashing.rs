//! Feature-hashing embedder.
//!
//! Builds fixed-dimension vectors by hashing terms into signed buckets and
//! weighting by sublinear term frequency. Needs no network or model files, so
//! the full pipeline runs offline and in tests.

use std::collections::BTreeMap;

use airman_core::text::tokenize;
use async_trait::async_trait;

use super::traits::{Embedder, EmbeddingError};

pub struct HashingEmbedder {
    dimensions: usize,
    remove_stopwords: bool,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize, remove_stopwords: bool) -> Self {
        Self {
            dimensions,
            remove_stopwords,
        }
    }

    /// FNV-1a over the term bytes.
    fn hash_term(term: &str) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return vec;
        }

        // Sorted terms fix the order of float additions within a bucket.
        let mut tf: BTreeMap<String, u32> = BTreeMap::new();
        for term in tokenize(text, self.remove_stopwords) {
            *tf.entry(term).or_default() += 1;
        }

        for (term, count) in &tf {
            let h = Self::hash_term(term);
            let bucket = (h % self.dimensions as u64) as usize;
            // High bit picks the sign so unrelated collisions tend to cancel.
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign * (1.0 + (*count as f32).ln());
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn stopword_only_text_is_zero_vector() {
        let e = HashingEmbedder::new(64, true);
        let v = e.embed_one("what is the").await.unwrap();
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn output_is_unit_length() {
        let e = HashingEmbedder::new(384, true);
        let v = e.embed_one("indicated airspeed shown on the airspeed indicator").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
    }

    #[tokio::test]
    async fn shared_terms_score_higher() {
        let e = HashingEmbedder::new(384, true);
        let batch = e
            .embed_batch(&[
                "What is indicated airspeed?",
                "Indicated airspeed (IAS) is read directly from the airspeed indicator.",
                "Density altitude is pressure altitude corrected for temperature.",
            ])
            .await
            .unwrap();
        assert!(cosine(&batch[0], &batch[1]) > 0.5);
        assert!(cosine(&batch[0], &batch[1]) > cosine(&batch[0], &batch[2]));
    }

    #[tokio::test]
    async fn deterministic_across_instances() {
        let a = HashingEmbedder::new(128, true).embed_one("crosswind component").await.unwrap();
        let b = HashingEmbedder::new(128, true).embed_one("crosswind component").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn colliding_terms_sum_in_a_fixed_order() {
        // Three buckets for many terms forces multi-way collisions.
        let e = HashingEmbedder::new(3, false);
        let forward = "pitot static vacuum gyro magneto carburetor mixture throttle propeller";
        let reversed: Vec<&str> = forward.split(' ').rev().collect();
        let a = e.embed_one(forward).await.unwrap();
        let b = e.embed_one(&reversed.join(" ")).await.unwrap();
        assert_eq!(
            a.iter().map(|x| x.to_bits()).collect::<Vec<_>>(),
            b.iter().map(|x| x.to_bits()).collect::<Vec<_>>()
        );
    }
}
