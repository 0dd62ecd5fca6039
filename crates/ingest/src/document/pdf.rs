use super::{number_pages, ExtractionError, PageContent};

/// One entry per PDF page, numbered by position in the page tree.
pub fn extract_pdf(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    // pdf-extract panics on some malformed inputs; keep that local to this document.
    let texts = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ExtractionError::Pdf("parser panicked on malformed PDF".into()))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

    let total = texts.len();
    let pages = number_pages(texts);
    if pages.is_empty() {
        // Scanned or image-only PDF.
        return Err(ExtractionError::NoText);
    }

    tracing::debug!(pages = total, with_text = pages.len(), "PDF text extracted");
    Ok(pages)
}
