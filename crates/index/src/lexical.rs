//! Okapi BM25 over an in-memory inverted index.
//!
//! score(q, d) = Σ_t idf(t) · tf·(k1+1) / (tf + k1·(1 − b + b·|d|/avgdl))
//! with idf(t) = ln(1 + (N − n_t + 0.5) / (n_t + 0.5)), which stays positive
//! even for terms present in every chunk. Repeated query terms count once.

use std::collections::{HashMap, HashSet};

use airman_core::config::RetrievalConfig;
use airman_core::text::tokenize;
use airman_core::{Chunk, ChunkId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
    pub remove_stopwords: bool,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            remove_stopwords: true,
        }
    }
}

impl From<&RetrievalConfig> for Bm25Params {
    fn from(cfg: &RetrievalConfig) -> Self {
        Self {
            k1: cfg.bm25_k1,
            b: cfg.bm25_b,
            remove_stopwords: cfg.remove_stopwords,
        }
    }
}

#[derive(Debug, Clone)]
struct Posting {
    chunk: ChunkId,
    tf: u32,
}

#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    params: Bm25Params,
    /// term -> chunks containing it, in insertion order.
    postings: HashMap<String, Vec<Posting>>,
    doc_lens: HashMap<ChunkId, u32>,
    total_len: u64,
}

impl LexicalIndex {
    pub fn new(params: Bm25Params) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn build<'a>(params: Bm25Params, chunks: impl IntoIterator<Item = &'a Chunk>) -> Self {
        let mut index = Self::new(params);
        for chunk in chunks {
            index.insert(chunk);
        }
        index
    }

    pub fn insert(&mut self, chunk: &Chunk) {
        let terms = tokenize(&chunk.text, self.params.remove_stopwords);
        let mut tf: HashMap<String, u32> = HashMap::new();
        for term in &terms {
            *tf.entry(term.clone()).or_default() += 1;
        }
        for (term, count) in tf {
            self.postings.entry(term).or_default().push(Posting {
                chunk: chunk.id,
                tf: count,
            });
        }
        self.doc_lens.insert(chunk.id, terms.len() as u32);
        self.total_len += terms.len() as u64;
    }

    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    fn avg_len(&self) -> f32 {
        if self.doc_lens.is_empty() {
            0.0
        } else {
            self.total_len as f32 / self.doc_lens.len() as f32
        }
    }

    pub fn idf(&self, term: &str) -> f32 {
        let n = self.doc_lens.len() as f32;
        let df = self.postings.get(term).map_or(0, |p| p.len()) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Up to `k` chunks with a positive score, best first, ties by ascending id.
    pub fn search(&self, query: &str, k: usize) -> Vec<(ChunkId, f32)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let terms: Vec<String> = tokenize(query, self.params.remove_stopwords)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        let Bm25Params { k1, b, .. } = self.params;
        let avgdl = self.avg_len().max(f32::EPSILON);
        let mut scores: HashMap<ChunkId, f32> = HashMap::new();

        for term in &terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let idf = self.idf(term);
            for posting in postings {
                let dl = self.doc_lens.get(&posting.chunk).copied().unwrap_or(0) as f32;
                let tf = posting.tf as f32;
                let norm = k1 * (1.0 - b + b * dl / avgdl);
                *scores.entry(posting.chunk).or_default() += idf * tf * (k1 + 1.0) / (tf + norm);
            }
        }

        let mut hits: Vec<(ChunkId, f32)> = scores.into_iter().filter(|(_, s)| *s > 0.0).collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        hits
    }
}
