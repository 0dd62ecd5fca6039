use airman_core::{AirmanError, AirmanResult, Chunk, ChunkId, DocumentBatch};

/// Append-only chunk storage. Ids are dense and equal to insertion position.
#[derive(Debug, Clone, Default)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted chunks, which must carry ids `0..n` in order.
    pub fn from_chunks(chunks: Vec<Chunk>) -> AirmanResult<Self> {
        if let Some((pos, chunk)) = chunks
            .iter()
            .enumerate()
            .find(|(pos, c)| c.id.0 != *pos as u64)
        {
            return Err(AirmanError::Serialize(format!(
                "chunk at position {pos} has id {}",
                chunk.id
            )));
        }
        Ok(Self { chunks })
    }

    pub fn next_id(&self) -> ChunkId {
        ChunkId(self.chunks.len() as u64)
    }

    /// Assign ids to a document's chunks and append them.
    /// Returns the range of newly stored chunks.
    pub fn commit(&mut self, batch: &DocumentBatch) -> &[Chunk] {
        let start = self.chunks.len();
        for pc in &batch.chunks {
            let id = self.next_id();
            self.chunks.push(Chunk {
                id,
                text: pc.text.clone(),
                source_id: batch.source_id.clone(),
                page_number: pc.page_number,
                sequence_index: pc.sequence_index,
                char_offset: pc.char_offset,
            });
        }
        &self.chunks[start..]
    }

    pub fn get(&self, id: ChunkId) -> AirmanResult<&Chunk> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.chunks.get(i))
            .ok_or(AirmanError::ChunkNotFound(id))
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
