//! Fixed-size character window chunking.
//!
//! Each page is cut independently into windows of `chunk_size` characters
//! whose consecutive starts are `chunk_size - overlap` apart. Chunks never
//! span pages, so every chunk carries exactly one page number.

mod window;

use airman_core::config::ChunkingConfig;
use airman_core::PageChunk;

use crate::document::ExtractedDocument;

pub use window::window_spans;

/// Chunk one page's text. Blank text yields no chunks.
pub fn chunk_page(text: &str, page_number: u32, config: &ChunkingConfig) -> Vec<PageChunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    // Char index -> byte index, with a trailing entry for the end of text.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    window_spans(char_len, config.chunk_size, config.stride())
        .into_iter()
        .enumerate()
        .map(|(seq, (start, end))| PageChunk {
            page_number,
            sequence_index: seq as u32,
            char_offset: start,
            text: text[boundaries[start]..boundaries[end]].to_string(),
        })
        .collect()
}

/// Chunk every page of a document, in page order.
pub fn chunk_document(doc: &ExtractedDocument, config: &ChunkingConfig) -> Vec<PageChunk> {
    doc.pages
        .iter()
        .flat_map(|page| chunk_page(&page.text, page.page_number, config))
        .collect()
}

#[cfg(test)]
mod tests;
