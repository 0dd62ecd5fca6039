//! Weighted fusion of vector and lexical candidate lists.
//!
//! Cosine similarity is clamped into [0, 1] and used as-is; BM25 has no
//! fixed scale, so lexical scores are divided by the best lexical score in
//! the candidate set. A chunk missing from one list gets 0 for that signal.
//! Both normalizations keep the fused score comparable to an absolute
//! relevance threshold.

use std::collections::BTreeMap;

use airman_core::config::RetrievalConfig;
use airman_core::{ChunkId, SignalScore};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub vector: f32,
    pub lexical: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            vector: 0.5,
            lexical: 0.5,
        }
    }
}

impl From<&RetrievalConfig> for FusionWeights {
    fn from(cfg: &RetrievalConfig) -> Self {
        Self {
            vector: cfg.vector_weight,
            lexical: cfg.lexical_weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusedHit {
    pub id: ChunkId,
    pub fused: f32,
    pub vector: Option<SignalScore>,
    pub lexical: Option<SignalScore>,
}

/// Merge both candidate lists, best first, ties by ascending id, cut to `top_k`.
pub fn fuse(
    vector_hits: &[(ChunkId, f32)],
    lexical_hits: &[(ChunkId, f32)],
    weights: FusionWeights,
    top_k: usize,
) -> Vec<FusedHit> {
    let max_lexical = lexical_hits
        .iter()
        .map(|(_, s)| *s)
        .fold(0.0f32, f32::max);

    let mut merged: BTreeMap<ChunkId, FusedHit> = BTreeMap::new();

    for &(id, raw) in vector_hits {
        let entry = merged.entry(id).or_insert_with(|| FusedHit {
            id,
            fused: 0.0,
            vector: None,
            lexical: None,
        });
        entry.vector = Some(SignalScore {
            raw,
            normalized: raw.clamp(0.0, 1.0),
        });
    }

    for &(id, raw) in lexical_hits {
        let entry = merged.entry(id).or_insert_with(|| FusedHit {
            id,
            fused: 0.0,
            vector: None,
            lexical: None,
        });
        let normalized = if max_lexical > 0.0 {
            (raw / max_lexical).clamp(0.0, 1.0)
        } else {
            0.0
        };
        entry.lexical = Some(SignalScore { raw, normalized });
    }

    let mut hits: Vec<FusedHit> = merged
        .into_values()
        .map(|mut hit| {
            let nv = hit.vector.map_or(0.0, |s| s.normalized);
            let nl = hit.lexical.map_or(0.0, |s| s.normalized);
            hit.fused = weights.vector * nv + weights.lexical * nl;
            hit
        })
        .collect();

    hits.sort_by(|a, b| b.fused.total_cmp(&a.fused).then(a.id.cmp(&b.id)));
    hits.truncate(top_k);
    hits
}
