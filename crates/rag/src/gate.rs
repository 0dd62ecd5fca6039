//! Retrieval-side half of the two-layer refusal.
//!
//! The gate refuses before generation whenever retrieval produced nothing
//! usable. The model-side half lives in the answer assembler.

use std::fmt;

use airman_core::{RetrievalResult, ScoredChunk};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    IndexNotBuilt,
    EmptyResult,
    BelowThreshold,
    ModelRefused,
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefusalReason::IndexNotBuilt => "index not built",
            RefusalReason::EmptyResult => "empty retrieval result",
            RefusalReason::BelowThreshold => "all scores below threshold",
            RefusalReason::ModelRefused => "model declined",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Chunks at or above the threshold, in retrieval order.
    Answer(Vec<ScoredChunk>),
    Refuse(RefusalReason),
}

#[derive(Debug, Clone, Copy)]
pub struct GroundingGate {
    min_relevance: f32,
}

impl GroundingGate {
    pub fn new(min_relevance: f32) -> Self {
        Self { min_relevance }
    }

    pub fn decide(&self, result: &RetrievalResult) -> GateDecision {
        if result.is_empty() {
            return GateDecision::Refuse(RefusalReason::EmptyResult);
        }
        let evidence: Vec<ScoredChunk> = result
            .iter()
            .filter(|sc| sc.fused_score >= self.min_relevance)
            .cloned()
            .collect();
        if evidence.is_empty() {
            GateDecision::Refuse(RefusalReason::BelowThreshold)
        } else {
            GateDecision::Answer(evidence)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airman_core::{Chunk, ChunkId};

    fn scored(id: u64, fused: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: ChunkId(id),
                text: format!("chunk {id}"),
                source_id: "poh.pdf".into(),
                page_number: id as u32 + 1,
                sequence_index: 0,
                char_offset: 0,
            },
            fused_score: fused,
            vector: None,
            lexical: None,
        }
    }

    #[test]
    fn empty_result_refuses() {
        let gate = GroundingGate::new(0.25);
        assert_eq!(gate.decide(&vec![]), GateDecision::Refuse(RefusalReason::EmptyResult));
    }

    #[test]
    fn all_below_threshold_refuses() {
        let gate = GroundingGate::new(0.25);
        let result = vec![scored(0, 0.24), scored(1, 0.1)];
        assert_eq!(gate.decide(&result), GateDecision::Refuse(RefusalReason::BelowThreshold));
    }

    #[test]
    fn keeps_only_chunks_at_or_above_threshold() {
        let gate = GroundingGate::new(0.25);
        let result = vec![scored(3, 0.9), scored(1, 0.25), scored(2, 0.2)];
        match gate.decide(&result) {
            GateDecision::Answer(evidence) => {
                let ids: Vec<u64> = evidence.iter().map(|s| s.chunk.id.0).collect();
                assert_eq!(ids, vec![3, 1]);
            }
            other => panic!("expected answer, got {other:?}"),
        }
    }
}
