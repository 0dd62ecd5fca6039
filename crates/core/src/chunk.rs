use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable chunk identifier, assigned in ingestion order (document, page, sequence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub u64);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable unit of retrieval and citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    /// Originating document (its file name).
    pub source_id: String,
    /// 1-based page number within the source document.
    pub page_number: u32,
    /// 0-based position of this chunk within its page.
    pub sequence_index: u32,
    /// Character offset of the chunk start within the page text.
    pub char_offset: usize,
}

impl Chunk {
    /// Citation string, exactly `"<source_filename> page <page_number>"`.
    pub fn citation(&self) -> String {
        format!("{} page {}", self.source_id, self.page_number)
    }
}

/// A chunk cut from a page, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageChunk {
    pub page_number: u32,
    pub sequence_index: u32,
    pub char_offset: usize,
    pub text: String,
}

/// Everything one document contributes to the index. Committed whole or not at all.
#[derive(Debug, Clone)]
pub struct DocumentBatch {
    pub source_id: String,
    /// Hex SHA-256 of the raw document bytes.
    pub fingerprint: String,
    pub page_count: usize,
    pub chunks: Vec<PageChunk>,
    /// One embedding per entry in `chunks`, same order.
    pub embeddings: Vec<Vec<f32>>,
}

impl DocumentBatch {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_format_is_exact() {
        let chunk = Chunk {
            id: ChunkId(7),
            text: "Indicated airspeed is...".into(),
            source_id: "PHAK.pdf".into(),
            page_number: 12,
            sequence_index: 0,
            char_offset: 0,
        };
        assert_eq!(chunk.citation(), "PHAK.pdf page 12");
    }

    #[test]
    fn chunk_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&ChunkId(42)).unwrap();
        assert_eq!(json, "42");
    }
}
