use super::{split_pages, ExtractionError, PageContent};

/// Plain text, lossily decoded. Form feeds split pages the way a
/// `pdftotext` export does; without them the file is page 1.
pub fn extract_txt(bytes: &[u8]) -> Result<Vec<PageContent>, ExtractionError> {
    Ok(split_pages(&String::from_utf8_lossy(bytes)))
}
