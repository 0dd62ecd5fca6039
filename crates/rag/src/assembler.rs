use airman_core::{citations_for, AnswerRecord, ScoredChunk, REFUSAL};

/// Generation context: each evidence chunk labelled with its citation.
pub fn build_context(evidence: &[ScoredChunk]) -> String {
    evidence
        .iter()
        .map(|sc| format!("[{}]\n{}", sc.chunk.citation(), sc.chunk.text.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// True when the model declined: an empty answer or one carrying the refusal text.
pub fn is_model_refusal(answer: &str) -> bool {
    let answer = answer.trim();
    answer.is_empty() || answer.contains(REFUSAL)
}

/// Package a generated answer with citations to the evidence it was given.
///
/// A model-level refusal yields the plain refusal record, so a refusal
/// never carries citations.
pub fn assemble(answer: &str, evidence: Vec<ScoredChunk>, debug: bool) -> AnswerRecord {
    if is_model_refusal(answer) {
        return AnswerRecord::refusal();
    }
    AnswerRecord {
        answer_text: answer.trim().to_string(),
        citations: citations_for(&evidence),
        chunks: if debug { evidence } else { Vec::new() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airman_core::{Chunk, ChunkId};

    fn scored(id: u64, page: u32, text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk {
                id: ChunkId(id),
                text: text.into(),
                source_id: "PHAK.pdf".into(),
                page_number: page,
                sequence_index: 0,
                char_offset: 0,
            },
            fused_score: 0.8,
            vector: None,
            lexical: None,
        }
    }

    #[test]
    fn context_labels_chunks_with_citations() {
        let ctx = build_context(&[scored(0, 3, " Vne is never exceed. "), scored(1, 4, "Vno.")]);
        assert_eq!(ctx, "[PHAK.pdf page 3]\nVne is never exceed.\n\n[PHAK.pdf page 4]\nVno.");
    }

    #[test]
    fn debug_controls_chunks() {
        let ev = vec![scored(0, 3, "a"), scored(1, 3, "b")];
        let quiet = assemble("Answer.", ev.clone(), false);
        assert_eq!(quiet.citations, vec!["PHAK.pdf page 3"]);
        assert!(quiet.chunks.is_empty());

        let loud = assemble("Answer.", ev, true);
        assert_eq!(loud.chunks.len(), 2);
    }

    #[test]
    fn model_refusal_drops_citations() {
        let ev = vec![scored(0, 3, "a")];
        let wrapped = format!("Sorry. {REFUSAL}");
        for answer in ["", "   ", REFUSAL, wrapped.as_str()] {
            let record = assemble(answer, ev.clone(), true);
            assert!(record.is_refusal(), "{answer:?}");
            assert!(record.citations.is_empty());
            assert!(record.chunks.is_empty());
        }
    }
}
