//! Tests for the character window chunker.

use airman_core::config::ChunkingConfig;
use proptest::prelude::*;

use super::{chunk_document, chunk_page, window_spans};
use crate::document::{DocumentKind, ExtractedDocument, PageContent};

fn cfg(chunk_size: usize, overlap: usize) -> ChunkingConfig {
    ChunkingConfig { chunk_size, overlap }
}

fn make_pdf_doc(pages: Vec<(u32, &str)>) -> ExtractedDocument {
    ExtractedDocument {
        name: "manual.pdf".to_string(),
        kind: DocumentKind::Pdf,
        pages: pages
            .into_iter()
            .map(|(num, text)| PageContent {
                page_number: num,
                text: text.to_string(),
            })
            .collect(),
    }
}

/// Undo the overlap: first chunk whole, then each later chunk minus its
/// first `overlap` characters.
fn reconstruct(chunks: &[airman_core::PageChunk], overlap: usize) -> String {
    let mut out = String::new();
    for (i, c) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(&c.text);
        } else {
            out.extend(c.text.chars().skip(overlap));
        }
    }
    out
}

// ── Window arithmetic ───────────────────────────────────────────────

#[test]
fn spans_for_1200_chars() {
    assert_eq!(
        window_spans(1200, 500, 450),
        vec![(0, 500), (450, 950), (900, 1200)]
    );
}

#[test]
fn shorter_than_chunk_size_is_one_span() {
    assert_eq!(window_spans(10, 500, 450), vec![(0, 10)]);
    assert_eq!(window_spans(499, 500, 450), vec![(0, 499)]);
}

#[test]
fn full_window_remaining_is_taken_before_the_remainder() {
    assert_eq!(window_spans(500, 500, 450), vec![(0, 500), (450, 500)]);
    assert_eq!(
        window_spans(950, 500, 450),
        vec![(0, 500), (450, 950), (900, 950)]
    );
}

#[test]
fn no_empty_remainder_without_overlap() {
    assert_eq!(window_spans(900, 450, 450), vec![(0, 450), (450, 900)]);
}

#[test]
fn empty_input_has_no_spans() {
    assert!(window_spans(0, 500, 450).is_empty());
    assert!(window_spans(10, 500, 0).is_empty());
}

// ── Pages ───────────────────────────────────────────────────────────

#[test]
fn blank_page_yields_nothing() {
    assert!(chunk_page("", 3, &cfg(500, 50)).is_empty());
    assert!(chunk_page(" \n\t ", 3, &cfg(500, 50)).is_empty());
}

#[test]
fn short_page_is_single_chunk_with_full_text() {
    let chunks = chunk_page("Vso: stall speed in landing configuration.", 4, &cfg(500, 50));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].page_number, 4);
    assert_eq!(chunks[0].sequence_index, 0);
    assert_eq!(chunks[0].char_offset, 0);
    assert_eq!(chunks[0].text, "Vso: stall speed in landing configuration.");
}

#[test]
fn long_page_overlaps_consecutive_chunks() {
    let text: String = (0..1200).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let chunks = chunk_page(&text, 1, &cfg(500, 50));
    assert_eq!(chunks.len(), 3);
    let offsets: Vec<usize> = chunks.iter().map(|c| c.char_offset).collect();
    assert_eq!(offsets, vec![0, 450, 900]);
    assert_eq!(chunks[2].text.chars().count(), 300);
    let tail: String = chunks[0].text.chars().skip(450).collect();
    let head: String = chunks[1].text.chars().take(50).collect();
    assert_eq!(tail, head);
    assert_eq!(reconstruct(&chunks, 50), text);
}

#[test]
fn multibyte_text_is_cut_on_char_boundaries() {
    let text = "ü".repeat(30) + &"ß".repeat(30);
    let chunks = chunk_page(&text, 1, &cfg(25, 5));
    assert!(chunks.iter().all(|c| c.text.chars().count() <= 25));
    assert_eq!(reconstruct(&chunks, 5), text);
}

#[test]
fn chunks_never_cross_pages() {
    let doc = make_pdf_doc(vec![(1, "Page one text."), (2, ""), (5, "Page five text.")]);
    let chunks = chunk_document(&doc, &cfg(500, 50));
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].page_number, 1);
    assert_eq!(chunks[1].page_number, 5);
    assert_eq!(chunks[1].sequence_index, 0);
}

proptest! {
    #[test]
    fn page_is_recoverable_from_its_chunks(
        text in "[a-zA-Z0-9 .,éü]{1,400}",
        chunk_size in 2usize..60,
        overlap_frac in 0.0f64..0.9,
    ) {
        prop_assume!(!text.trim().is_empty());
        let overlap = ((chunk_size as f64) * overlap_frac) as usize;
        let config = cfg(chunk_size, overlap);
        let chunks = chunk_page(&text, 7, &config);

        prop_assert!(!chunks.is_empty());
        for (i, c) in chunks.iter().enumerate() {
            prop_assert_eq!(c.page_number, 7);
            prop_assert_eq!(c.sequence_index as usize, i);
            prop_assert!(c.text.chars().count() <= chunk_size);
        }
        prop_assert_eq!(reconstruct(&chunks, overlap), text);
    }
}
