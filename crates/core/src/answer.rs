use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;

/// Fixed refusal text. Matched byte-for-byte by callers and the evaluation harness.
pub const REFUSAL: &str = "This information is not available in the provided document(s).";

/// One signal's contribution to a fused score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalScore {
    /// Score as reported by the index (cosine similarity or BM25).
    pub raw: f32,
    /// Score mapped into [0, 1] before fusion.
    pub normalized: f32,
}

/// A chunk with the scores that placed it in a Retrieval Result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub fused_score: f32,
    /// `None` when the chunk was not among the vector candidates.
    pub vector: Option<SignalScore>,
    /// `None` when the chunk was not among the lexical candidates.
    pub lexical: Option<SignalScore>,
}

/// Ordered by descending fused score, ties by ascending chunk id.
pub type RetrievalResult = Vec<ScoredChunk>;

/// Citations for a ranked chunk list: deduplicated, first-appearance order.
pub fn citations_for(chunks: &[ScoredChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .map(|sc| sc.chunk.citation())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Final result of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    #[serde(rename = "answer")]
    pub answer_text: String,
    pub citations: Vec<String>,
    /// Evidence handed to generation; populated only for debug requests.
    #[serde(default)]
    pub chunks: Vec<ScoredChunk>,
}

impl AnswerRecord {
    pub fn refusal() -> Self {
        Self {
            answer_text: REFUSAL.to_string(),
            citations: Vec::new(),
            chunks: Vec::new(),
        }
    }

    pub fn is_refusal(&self) -> bool {
        self.answer_text == REFUSAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkId;

    fn scored(id: u64, source: &str, page: u32) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: ChunkId(id),
                text: format!("chunk {id}"),
                source_id: source.to_string(),
                page_number: page,
                sequence_index: 0,
                char_offset: 0,
            },
            fused_score: 1.0,
            vector: None,
            lexical: None,
        }
    }

    #[test]
    fn citations_dedupe_in_first_appearance_order() {
        let chunks = vec![
            scored(4, "b.pdf", 9),
            scored(1, "a.pdf", 2),
            scored(5, "b.pdf", 9),
            scored(2, "a.pdf", 10),
        ];
        assert_eq!(
            citations_for(&chunks),
            vec!["b.pdf page 9", "a.pdf page 2", "a.pdf page 10"]
        );
    }

    #[test]
    fn refusal_record_is_empty() {
        let r = AnswerRecord::refusal();
        assert!(r.is_refusal());
        assert!(r.citations.is_empty());
        assert!(r.chunks.is_empty());
    }

    #[test]
    fn answer_serializes_under_answer_key() {
        let json = serde_json::to_value(AnswerRecord::refusal()).unwrap();
        assert_eq!(json["answer"], REFUSAL);
        assert_eq!(json["chunks"], serde_json::json!([]));
    }
}
